use crate::models::Upload;

use super::Collection;

/// Local mirror of the account's uploads, keyed by file name
pub type UploadStore = Collection<Upload>;
