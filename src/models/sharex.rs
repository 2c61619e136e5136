use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    Upload,
    Url,
    Text,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 3] = [ConfigKind::Upload, ConfigKind::Url, ConfigKind::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKind::Upload => "upload",
            ConfigKind::Url => "url",
            ConfigKind::Text => "text",
        }
    }

    /// Name the generated `.sxcu` file is saved under
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigKind::Upload => "sharex-img-config.sxcu",
            ConfigKind::Url => "sharex-shortener-config.sxcu",
            ConfigKind::Text => "sharex-text-config.sxcu",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upload" => Ok(ConfigKind::Upload),
            "url" => Ok(ConfigKind::Url),
            "text" => Ok(ConfigKind::Text),
            other => Err(format!(
                "unknown config type '{other}'. Supported values: upload, url, text"
            )),
        }
    }
}

/// ShareX custom uploader definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharexConfig {
    pub version: String,
    pub name: String,
    pub destination_type: String,
    pub request_method: String,
    #[serde(rename = "RequestURL")]
    pub request_url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<BTreeMap<String, String>>,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_form_name: Option<String>,
}

/// A config document ready to be written to disk
#[derive(Debug, Clone)]
pub struct GeneratedConfig {
    pub kind: ConfigKind,
    pub contents: String,
}

impl GeneratedConfig {
    /// Pretty-print JSON bodies; anything else is kept verbatim
    pub fn from_body(kind: ConfigKind, body: &str) -> Self {
        let contents = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value @ serde_json::Value::Object(_)) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string())
            }
            _ => body.to_string(),
        };
        Self { kind, contents }
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    /// Parsed view of the document, when it is a ShareX uploader definition
    pub fn parsed(&self) -> Option<SharexConfig> {
        serde_json::from_str(&self.contents).ok()
    }
}
