use chrono::Utc;
use std::path::Path;

use crate::api::ApiError;
use crate::models::{Upload, UploadMetadata};

use super::ViewContext;

/// File upload form
pub struct UploadView {
    ctx: ViewContext,
}

impl UploadView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    /// Upload the file at `path`. On success the new entry is added to the
    /// upload store without waiting for the next poll
    pub async fn upload_file(&self, path: &Path) -> Option<Upload> {
        match self.ctx.client.upload_file(path).await {
            Ok(receipt) => {
                let file_name = match receipt.file_name() {
                    Some(name) => name.to_string(),
                    None => path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                };
                let credential = self.ctx.state.credentials.credential();
                let upload = Upload {
                    id: String::new(),
                    ip: String::new(),
                    key: credential.token,
                    display_name: credential.display_name,
                    metadata: UploadMetadata {
                        file_type: mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .essence_str()
                            .to_string(),
                        file_size: receipt.size,
                        upload_date: Some(Utc::now()),
                        views: 0,
                    },
                    file_name,
                };
                self.ctx.state.uploads.add(upload.clone());
                self.ctx.success("File uploaded successfully!");
                Some(upload)
            }
            Err(ApiError::Io(e)) => {
                self.ctx
                    .error(format!("Could not read {}: {e}", path.display()));
                None
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error uploading file", "Error uploading file");
                None
            }
        }
    }
}
