//! HTTP match client.
//!
//! Talks to the traceback backend hosted on the main associated host.
//!
//! # Example
//!
//! ```ignore
//! use traceback_core::{HttpMatchClient, TracebackConfig};
//!
//! let config = TracebackConfig::new("https://example.web.app".parse()?);
//! let client = HttpMatchClient::new(&config)?;
//! ```

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{CampaignResponse, MatchClient, MatchResponse};
use crate::config::TracebackConfig;
use crate::error::{NetworkError, TracebackError};
use crate::fingerprint::DeviceFingerprint;

/// Path of the post-install search endpoint.
pub(crate) const SEARCH_PATH: &str = "v1_postinstall_search_link";

/// Path of the campaign resolution endpoint.
const CAMPAIGN_PATH: &str = "v1_get_campaign";

/// Append `name` as a path segment of `base`, keeping its query.
pub(crate) fn endpoint_url(base: &Url, name: &str) -> Result<Url, NetworkError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| NetworkError::Unknown(format!("cannot append path to {}", base)))?
        .pop_if_empty()
        .push(name);
    Ok(url)
}

/// MatchClient backed by `reqwest`
pub struct HttpMatchClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpMatchClient {
    /// Create a client for the configured main host.
    pub fn new(config: &TracebackConfig) -> Result<Self, TracebackError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TracebackError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config.main_associated_host.clone(), client))
    }

    /// Create a client with a preconfigured `reqwest::Client`.
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, NetworkError> {
        endpoint_url(&self.base_url, name)
    }

    /// Send a request, check its status, then decode the body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NetworkError> {
        let response = request.send().await?;

        let status = response.status().as_u16();
        if let Some(err) = NetworkError::from_status(status) {
            return Err(err);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| NetworkError::Decoding(e.to_string()))
    }
}

#[async_trait]
impl MatchClient for HttpMatchClient {
    async fn send_fingerprint(
        &self,
        fingerprint: &DeviceFingerprint,
    ) -> Result<MatchResponse, NetworkError> {
        let url = self.endpoint(SEARCH_PATH)?;
        debug!(%url, "Sending fingerprint");
        self.fetch(self.client.post(url).json(fingerprint)).await
    }

    async fn resolve_campaign(
        &self,
        link: &Url,
        first_campaign_open: bool,
    ) -> Result<CampaignResponse, NetworkError> {
        let mut url = self.endpoint(CAMPAIGN_PATH)?;
        url.query_pairs_mut()
            .append_pair("link", link.as_str())
            .append_pair("first_campaign_open", &first_campaign_open.to_string());
        debug!(%url, "Resolving campaign");
        self.fetch(self.client.get(url)).await
    }
}
