use crate::models::ImageInfo;

use super::ViewContext;

pub const NOT_FOUND: &str = "The file you requested could not be found.";

/// Public file details page
pub struct ImageView {
    ctx: ViewContext,
}

impl ImageView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub async fn lookup(&self, slug: &str) -> Option<ImageInfo> {
        match self.ctx.client.image(slug).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                self.ctx.error(NOT_FOUND);
                None
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error loading file details", "Failed to load file details");
                None
            }
        }
    }
}
