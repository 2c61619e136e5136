use std::sync::Arc;

use crate::models::Upload;
use crate::sync::{PollPolicy, Poller};

use super::ViewContext;

/// Dashboard list of the account's uploads
pub struct UploadsView {
    ctx: ViewContext,
}

impl UploadsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.ctx.state.uploads.snapshot()
    }

    /// Keep the upload store in sync with the server for as long as the
    /// returned poller lives
    pub fn start_polling(&self) -> Poller {
        Poller::spawn(
            Arc::new(self.ctx.client.clone()),
            Arc::clone(&self.ctx.state.uploads),
            Arc::clone(&self.ctx.notifier),
            PollPolicy::from_config("uploads", &self.ctx.polling),
        )
    }

    /// Delete an upload by file name, removing it locally right away on success
    pub async fn delete(&self, file_name: &str) -> bool {
        match self.ctx.client.delete_upload(file_name).await {
            Ok(()) => {
                self.ctx.state.uploads.remove(file_name);
                self.ctx.success("File deleted successfully!");
                true
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error deleting file", "Failed to delete file");
                false
            }
        }
    }
}
