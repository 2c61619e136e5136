use reqwest::Method;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{ConfigKind, GeneratedConfig};

impl ApiClient {
    /// Ask the backend for a ShareX config bound to the stored key
    pub async fn generate_config(&self, kind: ConfigKind) -> ApiResult<GeneratedConfig> {
        let mut url = self.endpoint(&["api", "config"]);
        url.query_pairs_mut().append_pair("type", kind.as_str());

        let body = self
            .dispatch(self.authed(Method::POST, url)?)
            .await?
            .text()
            .await
            .map_err(ApiError::Decode)?;
        Ok(GeneratedConfig::from_body(kind, &body))
    }
}
