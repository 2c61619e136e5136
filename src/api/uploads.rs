use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use tracing::info;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{file_stem, Upload, UploadList, UploadReceipt};

/// Multipart field the backend reads the file from
pub const UPLOAD_FIELD: &str = "sharex";

impl ApiClient {
    pub async fn uploads(&self) -> ApiResult<Vec<Upload>> {
        let url = self.endpoint(&["api", "uploads"]);
        let list: UploadList = self.dispatch_json(self.authed(Method::GET, url)?).await?;
        Ok(list.uploads)
    }

    /// Delete an upload. The backend addresses it by stem
    pub async fn delete_upload(&self, file_name: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "delete-upload", file_stem(file_name)]);
        self.dispatch(self.authed(Method::DELETE, url)?).await?;
        Ok(())
    }

    pub async fn upload_file(&self, path: &Path) -> ApiResult<UploadReceipt> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.upload_bytes(&file_name, bytes).await
    }

    pub async fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let size = bytes.len() as u64;
        let part = with_mime(
            Part::bytes(bytes).file_name(file_name.to_string()),
            mime.essence_str(),
        )?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = self.endpoint(&["api", "upload"]);
        let mut receipt: UploadReceipt = self
            .dispatch_json(self.authed(Method::POST, url)?.multipart(form))
            .await?;
        receipt.size = size;
        info!("Uploaded '{}' ({} bytes) to {}", file_name, size, receipt.url);
        Ok(receipt)
    }
}

fn with_mime(part: Part, mime: &str) -> ApiResult<Part> {
    part.mime_str(mime).map_err(ApiError::Request)
}
