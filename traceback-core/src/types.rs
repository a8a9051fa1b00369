//! Result and analytics types returned to the host

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TracebackError;

/// How a link was attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Exact match, usually from a clipboard link
    Unique,
    /// Fingerprint heuristics matched a single click
    Heuristics,
    /// Fingerprint heuristics matched, but not unambiguously
    Ambiguous,
    /// No match found
    None,
    /// Link delivered directly by the OS on open
    Intent,
    /// Classification the server sent that this version does not know
    Unknown,
}

impl MatchType {
    /// Parse a server `match_type` string; unrecognized values map to `Unknown`.
    pub fn from_server(value: &str) -> Self {
        match value {
            "unique" => Self::Unique,
            "heuristics" => Self::Heuristics,
            "ambiguous" => Self::Ambiguous,
            "none" => Self::None,
            "intent" => Self::Intent,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Heuristics => "heuristics",
            Self::Ambiguous => "ambiguous",
            Self::None => "none",
            Self::Intent => "intent",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events for the host to forward to its analytics platform
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    /// A post-install search returned a deep link
    PostInstallDetected(Url),
    /// A post-install search failed and will be retried on a later launch
    PostInstallError(TracebackError),
    /// A campaign link was resolved by the backend
    CampaignResolved(Url),
    /// A campaign link carried its target in the `link` query parameter
    CampaignResolvedLocally(Url),
    /// A campaign link could not be resolved
    CampaignError(TracebackError),
}

impl fmt::Display for AnalyticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostInstallDetected(url) => write!(f, "Post-install detected: {}", url),
            Self::PostInstallError(err) => write!(f, "Post-install error: {}", err),
            Self::CampaignResolved(url) => write!(f, "Campaign resolved: {}", url),
            Self::CampaignResolvedLocally(url) => {
                write!(f, "Campaign resolved locally: {}", url)
            }
            Self::CampaignError(err) => write!(f, "Campaign error: {}", err),
        }
    }
}

/// Outcome of either public entry point
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionResult {
    /// Content the host should open, if any
    pub url: Option<Url>,
    /// Campaign the link belongs to, if known
    pub campaign: Option<String>,
    pub match_type: MatchType,
    /// Events in the order they happened
    pub analytics: Vec<AnalyticsEvent>,
}

impl AttributionResult {
    /// The canonical "nothing to do" result.
    pub fn empty() -> Self {
        Self {
            url: None,
            campaign: None,
            match_type: MatchType::None,
            analytics: Vec::new(),
        }
    }

    /// An empty-shaped result carrying a single event.
    pub fn failure(event: AnalyticsEvent) -> Self {
        Self {
            analytics: vec![event],
            ..Self::empty()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

impl Default for AttributionResult {
    fn default() -> Self {
        Self::empty()
    }
}
