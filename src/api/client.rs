use anyhow::{bail, Context};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::models::StatusMessage;
use crate::storage::CredentialStore;

/// Header the backend reads the API key from
pub const API_KEY_HEADER: &str = "key";

/// Authenticated HTTP client for the backend API.
///
/// All calls go through here so the API key header is attached the same way
/// everywhere and a rejected key is handled in one place.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    credentials: Arc<CredentialStore>,
    clear_on_unauthorized: bool,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> anyhow::Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid API base URL '{}'", config.base_url))?;
        if base.cannot_be_a_base() {
            bail!("API base URL '{}' cannot carry a path", config.base_url);
        }

        let http = Client::builder()
            .user_agent(concat!("lazyup/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base,
            credentials,
            clear_on_unauthorized: config.clear_credentials_on_unauthorized,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Issue a request against a host-relative `path`.
    ///
    /// Returns `None` when the request never completed. Any HTTP response,
    /// successful or not, is handed back as-is; the caller checks the status.
    pub async fn request(&self, path: &str, method: Method, body: Option<&Value>) -> Option<Response> {
        let Some(url) = self.resolve(path) else {
            warn!("Refusing to request malformed path '{}'", path);
            return None;
        };

        let mut builder = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, self.credentials.token());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        match builder.send().await {
            Ok(response) => {
                if response.status() == StatusCode::UNAUTHORIZED {
                    self.handle_unauthorized();
                }
                Some(response)
            }
            Err(e) => {
                debug!("Request to {} failed: {}", path, e);
                None
            }
        }
    }

    /// Resolve a host-relative `path` (optionally with a query) under the
    /// base, keeping any path prefix the base carries
    fn resolve(&self, path: &str) -> Option<Url> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        base.join(path.trim_start_matches('/')).ok()
    }

    /// URL for `segments` under the base, each segment percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request carrying the stored API key. Fails fast without one
    pub(crate) fn authed(&self, method: Method, url: Url) -> ApiResult<RequestBuilder> {
        let token = self.credentials.token();
        if token.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        Ok(self.http.request(method, url).header(API_KEY_HEADER, token))
    }

    /// Request for endpoints that need no API key
    pub(crate) fn public(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send and classify the response status
    pub(crate) async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        debug!("Backend answered {}: {}", status, message);

        match status {
            StatusCode::UNAUTHORIZED => {
                self.handle_unauthorized();
                Err(ApiError::Unauthorized)
            }
            StatusCode::CONFLICT => Err(ApiError::Conflict { message }),
            _ => Err(ApiError::Status { status, message }),
        }
    }

    pub(crate) async fn dispatch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        self.dispatch(builder)
            .await?
            .json::<T>()
            .await
            .map_err(ApiError::Decode)
    }

    fn handle_unauthorized(&self) {
        if !self.clear_on_unauthorized || !self.credentials.is_authenticated() {
            return;
        }
        warn!("Backend rejected the stored API key, signing out");
        if let Err(e) = self.credentials.clear() {
            warn!("Failed to clear rejected credential: {}", e);
        }
    }
}

/// Best-effort extraction of the backend's `{status, message}` error body
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<StatusMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}
