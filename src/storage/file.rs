use base64::prelude::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageResult};

/// JSON file backed store.
///
/// Keys and values are base64 encoded on disk. This only keeps the token out
/// of casual view, it is not encryption. Entries expire `ttl` after their last
/// write.
pub struct FileStore {
    path: PathBuf,
    ttl: Duration,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: i64,
}

impl StoredEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> StorageResult<StoreFile> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(StoreFile::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &StoreFile) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(file)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, contents)?;
        restrict_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote credential file {}", self.path.display());
        Ok(())
    }

    fn expiry_from_now(&self) -> i64 {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        Utc::now().timestamp().saturating_add(ttl)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let file = self.read_file()?;
        let now = Utc::now().timestamp();

        Ok(file
            .entries
            .get(&encode(key))
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| decode(&entry.value)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.read_file()?;
        let now = Utc::now().timestamp();

        file.entries.retain(|_, entry| !entry.is_expired(now));
        file.entries.insert(
            encode(key),
            StoredEntry {
                value: encode(value),
                expires_at: self.expiry_from_now(),
            },
        );

        self.write_file(&file)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.read_file()?;

        if file.entries.remove(&encode(key)).is_none() {
            return Ok(());
        }

        self.write_file(&file)
    }
}

fn encode(value: &str) -> String {
    BASE64_STANDARD.encode(value)
}

/// Undecodable values read as empty rather than failing the whole load
fn decode(value: &str) -> String {
    match BASE64_STANDARD
        .decode(value)
        .map(String::from_utf8)
    {
        Ok(Ok(decoded)) => decoded,
        Ok(Err(e)) => {
            warn!("Stored credential value is not valid UTF-8: {}", e);
            String::new()
        }
        Err(e) => {
            warn!("Failed to decode stored credential value: {}", e);
            String::new()
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
