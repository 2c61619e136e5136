use serde::{Deserialize, Serialize};

use super::upload::UploadMetadata;

/// Public metadata of a hosted file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInfo {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub metadata: UploadMetadata,
}

impl ImageInfo {
    /// The backend answers unknown slugs with an empty record
    pub fn is_found(&self) -> bool {
        !self.file_name.is_empty()
    }
}
