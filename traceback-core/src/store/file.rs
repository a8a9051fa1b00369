//! File-backed KeyValueStore

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use super::KeyValueStore;
use crate::error::StoreError;

/// State file name
const STATE_FILE: &str = "traceback_state.json";

/// Key-value store persisted as a single JSON document
///
/// Every mutation rewrites the whole document. Writes go to a sibling
/// temp file first and are renamed into place.
pub struct FileStore {
    values: RwLock<BTreeMap<String, Value>>,
    file_path: PathBuf,
}

impl FileStore {
    /// Load the store from `data_dir`, or start empty if no state file exists.
    pub async fn load(data_dir: &Path) -> Result<Self, StoreError> {
        let file_path = data_dir.join(STATE_FILE);

        let values = if fs::try_exists(&file_path).await? {
            let content = fs::read_to_string(&file_path).await?;
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "Discarding unreadable state file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            values: RwLock::new(values),
            file_path,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn persist(&self, values: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(values)?;
        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.file_path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        // Held across the write so concurrent mutations persist in order.
        // Memory only changes once the file does.
        let mut values = self.values.write().await;
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        self.persist(&updated).await?;
        *values = updated;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().await;
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut updated = values.clone();
        updated.remove(key);
        self.persist(&updated).await?;
        *values = updated;
        Ok(())
    }
}
