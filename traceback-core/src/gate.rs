//! Persisted one-shot flag gating the post-install search

use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreError;
use crate::store::{INSTALL_GATE_KEY, KeyValueStore};

/// Records that a post-install search has completed.
///
/// Set exactly once, after a successful round trip with the backend,
/// whether or not a link was matched. Absence reads as `false`.
#[derive(Clone)]
pub struct InstallGate {
    store: Arc<dyn KeyValueStore>,
}

impl InstallGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Whether a post-install search has already completed.
    pub async fn get(&self) -> Result<bool, StoreError> {
        Ok(matches!(
            self.store.get(INSTALL_GATE_KEY).await?,
            Some(Value::Bool(true))
        ))
    }

    /// Durably mark the post-install search as completed.
    pub async fn set(&self) -> Result<(), StoreError> {
        self.store.set(INSTALL_GATE_KEY, Value::Bool(true)).await
    }

    /// Forget that a search completed.
    #[cfg(any(test, feature = "testing"))]
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.remove(INSTALL_GATE_KEY).await
    }
}
