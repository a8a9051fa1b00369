//! Match backend client
//!
//! The backend's matching is opaque; this module only models the wire
//! contract. [`MatchClient`] is the seam the engine calls through,
//! [`HttpMatchClient`] talks to the real backend, and [`MockMatchClient`]
//! replays scripted responses.

mod http;
mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::NetworkError;
use crate::fingerprint::DeviceFingerprint;
use crate::types::MatchType;

pub use http::HttpMatchClient;
pub(crate) use http::{SEARCH_PATH, endpoint_url};
pub use mock::{MockCall, MockMatchClient};

/// Reply to a post-install search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchResponse {
    #[serde(default, deserialize_with = "lenient_url")]
    pub deep_link_id: Option<Url>,
    #[serde(default)]
    pub match_message: String,
    pub match_type: String,
    #[serde(default)]
    pub request_ip_version: String,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub match_campaign: Option<String>,
}

impl MatchResponse {
    pub fn match_type(&self) -> MatchType {
        MatchType::from_server(&self.match_type)
    }
}

/// Reply to a campaign resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CampaignResponse {
    #[serde(default, deserialize_with = "lenient_url")]
    pub result: Option<Url>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Accepts null, empty, or unparsable URL strings as absent.
fn lenient_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| Url::parse(&s).ok()))
}

/// Request/response contract with the match backend
///
/// Timeouts and cancellation of the underlying request belong to the
/// implementation.
#[async_trait]
pub trait MatchClient: Send + Sync {
    /// Submit a fingerprint for heuristic matching.
    async fn send_fingerprint(
        &self,
        fingerprint: &DeviceFingerprint,
    ) -> Result<MatchResponse, NetworkError>;

    /// Resolve the content behind a campaign link.
    async fn resolve_campaign(
        &self,
        link: &Url,
        first_campaign_open: bool,
    ) -> Result<CampaignResponse, NetworkError>;
}
