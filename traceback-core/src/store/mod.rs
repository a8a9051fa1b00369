//! Durable key-value persistence
//!
//! The engine keeps two pieces of state across launches: the install gate
//! flag and the set of seen campaigns. Hosts supply the backing store.
//!
//! - [`KeyValueStore`] - Trait the engine persists through
//! - [`FileStore`] - JSON document on disk
//! - [`MemoryStore`] - In-process store for tests and ephemeral hosts

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the install gate flag.
pub const INSTALL_GATE_KEY: &str = "traceback.existing_run";

/// Key holding the list of seen campaign identifiers.
pub const SEEN_CAMPAIGNS_KEY: &str = "traceback.seen_campaigns";

/// Trait for durable key-value storage.
///
/// A missing key reads as `None`; callers decide what absence means.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
