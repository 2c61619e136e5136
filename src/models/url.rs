use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Identified;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShortUrl {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "IP", default)]
    pub ip: String,
    pub slug: String,
    #[serde(default)]
    pub clicks: u64,
}

impl ShortUrl {
    /// Public redirect link for this entry on the given domain
    pub fn public_link(&self, domain: &str) -> String {
        format!("{}/u/{}", domain.trim_end_matches('/'), self.slug)
    }
}

impl Identified for ShortUrl {
    fn identity(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Deserialize)]
pub struct UrlList {
    #[serde(default)]
    pub urls: Vec<ShortUrl>,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUrl {
    pub url: String,
    pub slug: String,
    #[serde(rename = "fullUrl", default)]
    pub full_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenameSlugRequest<'a> {
    pub new_slug: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlValidationError {
    #[error("URL cannot be empty.")]
    Empty,
    #[error("URL must start with http:// or https://")]
    MissingScheme,
}

/// Check a shortening target before it is sent to the backend
pub fn validate_target(url: &str) -> Result<(), UrlValidationError> {
    if url.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(UrlValidationError::MissingScheme);
    }
    Ok(())
}
