use serde::{Deserialize, Serialize};

/// Locally persisted session material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub display_name: String,
    pub domain: String,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Account record as returned by `GET /api/account` and `POST /api/account`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    #[serde(alias = "key", alias = "api_key")]
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DisplayNameRequest<'a> {
    pub display_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "Key")]
    pub key: String,
}

/// Generic `{status, message}` envelope the backend uses for errors and acks
#[derive(Debug, Default, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}
