use reqwest::{Method, StatusCode};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::ImageInfo;

impl ApiClient {
    /// Public metadata lookup for a hosted file. `None` when it does not exist
    pub async fn image(&self, slug: &str) -> ApiResult<Option<ImageInfo>> {
        let url = self.endpoint(&["api", "image", slug]);
        match self.dispatch_json::<ImageInfo>(self.public(Method::GET, url)).await {
            Ok(info) if info.is_found() => Ok(Some(info)),
            Ok(_) => Ok(None),
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }
}
