use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Upload {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    pub file_name: String,
    #[serde(default)]
    pub metadata: UploadMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadMetadata {
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub views: u64,
}

impl Upload {
    /// File name without its last extension.
    ///
    /// The backend addresses uploads by stem on deletion and on the public
    /// `/i/` page.
    pub fn stem(&self) -> &str {
        file_stem(&self.file_name)
    }

    pub fn human_size(&self) -> String {
        format_file_size(self.metadata.file_size)
    }
}

impl Identified for Upload {
    fn identity(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadList {
    #[serde(default)]
    pub uploads: Vec<Upload>,
}

/// Body returned by `POST /api/upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    pub url: String,
    /// Bytes sent, filled in locally
    #[serde(skip)]
    pub size: u64,
}

impl UploadReceipt {
    /// Stored file name, taken from the last path segment of the returned URL
    pub fn file_name(&self) -> Option<&str> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }
}

pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

/// Render a byte count with decimal units, two fractional digits
pub fn format_file_size(size: u64) -> String {
    let size = size as f64;
    if size >= 1e9 {
        format!("{:.2} GB", size / 1e9)
    } else if size >= 1e6 {
        format!("{:.2} MB", size / 1e6)
    } else {
        format!("{:.2} KB", size / 1e3)
    }
}
