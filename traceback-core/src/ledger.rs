//! Persisted set of campaign identifiers already seen on this install

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{KeyValueStore, SEEN_CAMPAIGNS_KEY};

/// Deduplicates campaign opens across launches.
///
/// Membership only grows. Assumes one process writes at a time.
#[derive(Clone)]
pub struct CampaignLedger {
    store: Arc<dyn KeyValueStore>,
}

impl CampaignLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All campaigns seen so far.
    pub async fn seen(&self) -> Result<BTreeSet<String>, StoreError> {
        match self.store.get(SEEN_CAMPAIGNS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn save(&self, campaigns: &BTreeSet<String>) -> Result<(), StoreError> {
        self.store
            .set(SEEN_CAMPAIGNS_KEY, serde_json::to_value(campaigns)?)
            .await
    }

    pub async fn contains(&self, campaign: &str) -> Result<bool, StoreError> {
        Ok(self.seen().await?.contains(campaign))
    }

    pub async fn mark_seen(&self, campaign: &str) -> Result<(), StoreError> {
        let mut campaigns = self.seen().await?;
        if campaigns.insert(campaign.to_string()) {
            self.save(&campaigns).await?;
        }
        Ok(())
    }

    /// Mark `campaign` as seen, returning whether this was its first observation.
    pub async fn first_time_seen(&self, campaign: &str) -> Result<bool, StoreError> {
        let mut campaigns = self.seen().await?;
        let first = campaigns.insert(campaign.to_string());
        if first {
            self.save(&campaigns).await?;
        }
        Ok(first)
    }

    /// Forget every seen campaign.
    #[cfg(any(test, feature = "testing"))]
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(SEEN_CAMPAIGNS_KEY).await
    }
}
