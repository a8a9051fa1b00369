//! Mock match client for testing
//!
//! MockMatchClient replays scripted backend replies and records every
//! request, enabling fast, deterministic tests of the attribution engine.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{CampaignResponse, MatchClient, MatchResponse};
use crate::error::NetworkError;
use crate::fingerprint::DeviceFingerprint;

/// A request received by [`MockMatchClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    SendFingerprint(DeviceFingerprint),
    ResolveCampaign { link: Url, first_campaign_open: bool },
}

#[derive(Default)]
struct Script {
    search: VecDeque<Result<MatchResponse, NetworkError>>,
    campaign: VecDeque<Result<CampaignResponse, NetworkError>>,
    calls: Vec<MockCall>,
}

/// Mock implementation of MatchClient
///
/// Queue replies before driving the engine. Each request consumes one
/// queued reply of its kind; an empty queue answers with
/// `NetworkError::Unknown`.
#[derive(Default)]
pub struct MockMatchClient {
    script: Mutex<Script>,
    latency: Duration,
}

impl MockMatchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a reply for the next post-install search.
    pub fn queue_search(&self, reply: Result<MatchResponse, NetworkError>) {
        self.script().search.push_back(reply);
    }

    /// Queue a successful search reply (convenience method).
    pub fn queue_match(&self, deep_link: Option<&str>, match_type: &str, campaign: Option<&str>) {
        self.queue_search(Ok(MatchResponse {
            deep_link_id: deep_link.and_then(|s| Url::parse(s).ok()),
            match_message: format!("{} match", match_type),
            match_type: match_type.to_string(),
            request_ip_version: "ipv4".to_string(),
            utm_medium: None,
            utm_source: None,
            match_campaign: campaign.map(str::to_string),
        }));
    }

    /// Queue a reply for the next campaign resolution.
    pub fn queue_campaign(&self, reply: Result<CampaignResponse, NetworkError>) {
        self.script().campaign.push_back(reply);
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.script().calls.clone()
    }

    /// Fingerprints received so far.
    pub fn fingerprints(&self) -> Vec<DeviceFingerprint> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::SendFingerprint(fingerprint) => Some(fingerprint),
                MockCall::ResolveCampaign { .. } => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }
}

#[async_trait]
impl MatchClient for MockMatchClient {
    async fn send_fingerprint(
        &self,
        fingerprint: &DeviceFingerprint,
    ) -> Result<MatchResponse, NetworkError> {
        let reply = {
            let mut script = self.script();
            script.calls.push(MockCall::SendFingerprint(fingerprint.clone()));
            script.search.pop_front()
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        reply.unwrap_or_else(|| Err(NetworkError::Unknown("no queued search reply".into())))
    }

    async fn resolve_campaign(
        &self,
        link: &Url,
        first_campaign_open: bool,
    ) -> Result<CampaignResponse, NetworkError> {
        let reply = {
            let mut script = self.script();
            script.calls.push(MockCall::ResolveCampaign {
                link: link.clone(),
                first_campaign_open,
            });
            script.campaign.pop_front()
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        reply.unwrap_or_else(|| Err(NetworkError::Unknown("no queued campaign reply".into())))
    }
}
