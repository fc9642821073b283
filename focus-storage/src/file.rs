//! Preference store backed by a single JSON document on disk.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageResult;
use crate::prefs::PrefsStore;

/// Stores every key as a string field of one JSON object.
///
/// The whole document is rewritten on each `set`/`remove`, through a sibling
/// temporary file and a rename, so a crash leaves either the old or the new
/// document in place.
#[derive(Debug)]
pub struct JsonFilePrefsStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePrefsStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// An unreadable or malformed document is logged and treated as empty; it
    /// is replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error only for IO failures other than a missing file.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring malformed prefs file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened prefs file {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PrefsStore for JsonFilePrefsStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }
}
