use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::ConfigKind;

use super::ViewContext;

/// ShareX config download
pub struct ConfigView {
    ctx: ViewContext,
}

impl ConfigView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    /// Generate a config of `kind` and save it under `dir` with its
    /// conventional file name. Returns the written path
    pub async fn generate(&self, kind: ConfigKind, dir: &Path) -> Option<PathBuf> {
        let config = match self.ctx.client.generate_config(kind).await {
            Ok(config) => config,
            Err(e) => {
                self.ctx.report(
                    &e,
                    "Error generating ShareX config",
                    "Failed to generate ShareX config",
                );
                return None;
            }
        };

        let path = dir.join(config.file_name());
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, config.contents.as_bytes()).await
        };
        match written.await {
            Ok(()) => {
                info!("Wrote {} config to {}", kind, path.display());
                self.ctx.success("Config generated successfully!");
                Some(path)
            }
            Err(e) => {
                self.ctx
                    .error(format!("Could not save {}: {e}", path.display()));
                None
            }
        }
    }
}
