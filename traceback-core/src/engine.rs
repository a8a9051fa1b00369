//! Attribution engine
//!
//! Owns the two public flows:
//!
//! - [`AttributionEngine::post_install_search`] runs once per install and
//!   asks the backend to match this device against a recent link click.
//! - [`AttributionEngine::campaign_link`] handles links opened by the OS.
//!   Until a search has succeeded they are handed to the search and never
//!   hit the network themselves; afterwards they are resolved as campaigns.
//!
//! Neither flow returns an error. Recoverable failures come back as an
//! empty-shaped [`AttributionResult`] carrying an analytics event.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::client::{CampaignResponse, HttpMatchClient, MatchClient, MatchResponse};
use crate::config::TracebackConfig;
use crate::diagnostics::{self, DiagnosticsReport};
use crate::error::TracebackError;
use crate::fingerprint::build_fingerprint;
use crate::gate::InstallGate;
use crate::ledger::CampaignLedger;
use crate::links;
use crate::rendezvous::Rendezvous;
use crate::signals::{
    ClipboardReader, NoClipboard, NoWebView, SystemInfoProvider, WebViewInfoReader,
};
use crate::store::{KeyValueStore, MemoryStore};
use crate::types::{AnalyticsEvent, AttributionResult, MatchType};

/// Progress of the post-install search on this engine instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No search has completed yet; a failed search returns here
    NeverSearched,
    /// A search is in flight
    Searching,
    /// A search completed against the backend
    Resolved,
}

/// Clears the in-flight flag when a search ends or is cancelled.
struct SearchGuard<'a>(&'a AtomicBool);

impl<'a> SearchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Resolves deferred deep links and campaign links for one app install.
pub struct AttributionEngine {
    config: TracebackConfig,
    gate: InstallGate,
    ledger: CampaignLedger,
    client: Arc<dyn MatchClient>,
    system: Arc<dyn SystemInfoProvider>,
    clipboard: Arc<dyn ClipboardReader>,
    webview: Arc<dyn WebViewInfoReader>,
    intent: Rendezvous<Url>,
    /// Serializes gate, ledger and rendezvous mutations
    serial: Mutex<()>,
    searching: AtomicBool,
    resolved: AtomicBool,
}

impl AttributionEngine {
    pub fn builder(config: TracebackConfig) -> AttributionEngineBuilder {
        AttributionEngineBuilder::new(config)
    }

    pub fn config(&self) -> &TracebackConfig {
        &self.config
    }

    pub fn phase(&self) -> SearchPhase {
        if self.resolved.load(Ordering::Acquire) {
            SearchPhase::Resolved
        } else if self.searching.load(Ordering::Acquire) {
            SearchPhase::Searching
        } else {
            SearchPhase::NeverSearched
        }
    }

    /// Whether `url` belongs to one of the configured hosts.
    pub fn is_traceback_url(&self, url: &Url) -> bool {
        links::is_associated_host(&self.config, url)
    }

    /// Check the engine's configuration for common mistakes.
    pub fn diagnostics(&self) -> DiagnosticsReport {
        diagnostics::check_configuration(&self.config)
    }

    /// Look up the link that led to this install.
    ///
    /// Performs at most one successful backend round trip per install. Once
    /// that has happened, every call returns an empty result without side
    /// effects. A failed attempt leaves the install gate unset so the host
    /// can retry on a later launch.
    pub async fn post_install_search(&self) -> AttributionResult {
        let Some(_guard) = SearchGuard::acquire(&self.searching) else {
            warn!("Post-install search already in progress");
            return AttributionResult::empty();
        };
        if self.resolved.load(Ordering::Acquire) {
            debug!("Post-install search already resolved on this instance");
            return AttributionResult::empty();
        }
        match self.gate.get().await {
            Ok(true) => {
                debug!("Post-install search already completed, skipping");
                return AttributionResult::empty();
            }
            Ok(false) => {}
            Err(e) => {
                error!("Failed to read install gate: {}", e);
                return AttributionResult::failure(AnalyticsEvent::PostInstallError(e.into()));
            }
        }

        info!("Starting post-install search");

        // Only the first attempt on an instance gets the grace window
        let intent_link = if self.intent.has_waited() {
            None
        } else {
            self.intent.wait(self.config.intent_grace_period).await
        };
        if let Some(link) = &intent_link {
            info!("Using launch link {} as intent link", link);
        }

        let webview = bounded("webview", self.config.signal_timeout, self.webview.read()).await;
        let clipboard_link = self.read_clipboard().await;
        let system = self.system.system_info().await;

        let fingerprint = build_fingerprint(&system, clipboard_link, intent_link, webview);
        debug!("Sending fingerprint: {:?}", fingerprint);

        match self.client.send_fingerprint(&fingerprint).await {
            Ok(response) => self.complete_search(response).await,
            Err(e) => {
                error!("Post-install search failed: {}", e);
                AttributionResult::failure(AnalyticsEvent::PostInstallError(e.into()))
            }
        }
    }

    async fn read_clipboard(&self) -> Option<Url> {
        if !self.config.use_clipboard {
            return None;
        }
        let link = bounded("clipboard", self.config.signal_timeout, self.clipboard.read_url()).await;
        if link.is_some() {
            let cleared = bounded("clipboard clear", self.config.signal_timeout, async {
                self.clipboard.clear().await;
                Some(())
            })
            .await;
            if cleared.is_none() {
                warn!("Clipboard could not be cleared");
            }
        }
        link
    }

    async fn complete_search(&self, response: MatchResponse) -> AttributionResult {
        let _serial = self.serial.lock().await;

        if let Err(e) = self.gate.set().await {
            error!("Failed to persist install gate: {}", e);
        }
        self.resolved.store(true, Ordering::Release);

        if let Some(campaign) = &response.match_campaign
            && let Err(e) = self.ledger.mark_seen(campaign).await
        {
            error!("Failed to record campaign {}: {}", campaign, e);
        }

        let match_type = response.match_type();
        info!(
            match_type = %match_type,
            url = ?response.deep_link_id.as_ref().map(Url::as_str),
            campaign = ?response.match_campaign,
            "Post-install search resolved"
        );

        let analytics = response
            .deep_link_id
            .iter()
            .cloned()
            .map(AnalyticsEvent::PostInstallDetected)
            .collect();

        AttributionResult {
            url: response.deep_link_id,
            campaign: response.match_campaign,
            match_type,
            analytics,
        }
    }

    /// Handle a link the OS delivered to the app.
    ///
    /// Links for other hosts are ignored. On first run the link is handed to
    /// the post-install search, which sends it as the intent link, and an
    /// empty result is returned even when no search is waiting any more.
    /// Otherwise the link is resolved as a campaign.
    pub async fn campaign_link(&self, url: &Url) -> AttributionResult {
        if !self.is_traceback_url(url) {
            debug!(host = ?url.host_str(), "Ignoring link for unrelated host");
            return AttributionResult::empty();
        }

        {
            let _serial = self.serial.lock().await;
            let first_run = if self.resolved.load(Ordering::Acquire) {
                false
            } else {
                match self.gate.get().await {
                    Ok(done) => !done,
                    Err(e) => {
                        error!("Failed to read install gate: {}", e);
                        return AttributionResult::failure(AnalyticsEvent::CampaignError(e.into()));
                    }
                }
            };

            if first_run {
                if self.intent.provide(url.clone()) {
                    info!("Deferring {} to the post-install search", url);
                } else {
                    debug!("Post-install search no longer waiting, dropping {}", url);
                }
                return AttributionResult::empty();
            }
        }

        self.resolve_campaign(url).await
    }

    async fn resolve_campaign(&self, url: &Url) -> AttributionResult {
        let Some(campaign) = links::campaign_id(url) else {
            return match links::link_parameter(url) {
                Some(link) => {
                    info!("Campaign link carries its target: {}", link);
                    AttributionResult {
                        url: Some(link.clone()),
                        campaign: None,
                        match_type: MatchType::Intent,
                        analytics: vec![AnalyticsEvent::CampaignResolvedLocally(link)],
                    }
                }
                None => {
                    debug!("Link has neither campaign nor target: {}", url);
                    AttributionResult::empty()
                }
            };
        };

        let first_open = {
            let _serial = self.serial.lock().await;
            match self.ledger.first_time_seen(&campaign).await {
                Ok(first) => first,
                Err(e) => {
                    error!("Failed to read campaign ledger: {}", e);
                    return AttributionResult::failure(AnalyticsEvent::CampaignError(e.into()));
                }
            }
        };

        match self.client.resolve_campaign(url, first_open).await {
            Ok(CampaignResponse {
                result: Some(link), ..
            }) => {
                info!(campaign = %campaign, url = %link, "Campaign resolved");
                AttributionResult {
                    url: Some(link.clone()),
                    campaign: Some(campaign),
                    match_type: MatchType::Intent,
                    analytics: vec![AnalyticsEvent::CampaignResolved(link)],
                }
            }
            Ok(CampaignResponse {
                result: None,
                error: Some(message),
            }) => {
                warn!(campaign = %campaign, error = %message, "Campaign rejected by server");
                AttributionResult::failure(AnalyticsEvent::CampaignError(TracebackError::Server(
                    message,
                )))
            }
            Ok(_) => {
                debug!("Campaign {} has no content", campaign);
                AttributionResult::empty()
            }
            Err(e) => {
                error!(campaign = %campaign, error = %e, "Failed to resolve campaign");
                AttributionResult::failure(AnalyticsEvent::CampaignError(e.into()))
            }
        }
    }
}

/// Run a best-effort collector, treating a timeout as an absent signal.
async fn bounded<T, F>(what: &str, timeout: Duration, collect: F) -> Option<T>
where
    F: Future<Output = Option<T>>,
{
    match tokio::time::timeout(timeout, collect).await {
        Ok(value) => value,
        Err(_) => {
            warn!("Timed out reading {}", what);
            None
        }
    }
}

/// Builder for [`AttributionEngine`]
pub struct AttributionEngineBuilder {
    config: TracebackConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    client: Option<Arc<dyn MatchClient>>,
    system: Option<Arc<dyn SystemInfoProvider>>,
    clipboard: Option<Arc<dyn ClipboardReader>>,
    webview: Option<Arc<dyn WebViewInfoReader>>,
}

impl AttributionEngineBuilder {
    pub fn new(config: TracebackConfig) -> Self {
        Self {
            config,
            store: None,
            client: None,
            system: None,
            clipboard: None,
            webview: None,
        }
    }

    /// Durable storage for the install gate and campaign ledger.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn client(mut self, client: Arc<dyn MatchClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn system_info(mut self, system: Arc<dyn SystemInfoProvider>) -> Self {
        self.system = Some(system);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn ClipboardReader>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn webview(mut self, webview: Arc<dyn WebViewInfoReader>) -> Self {
        self.webview = Some(webview);
        self
    }

    pub fn build(self) -> Result<AttributionEngine, TracebackError> {
        let system = self
            .system
            .ok_or_else(|| TracebackError::Config("a system info provider is required".into()))?;

        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => {
                warn!("No store configured, attribution state will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        let client: Arc<dyn MatchClient> = match self.client {
            Some(client) => client,
            None => Arc::new(HttpMatchClient::new(&self.config)?),
        };

        Ok(AttributionEngine {
            gate: InstallGate::new(Arc::clone(&store)),
            ledger: CampaignLedger::new(store),
            client,
            system,
            clipboard: self.clipboard.unwrap_or_else(|| Arc::new(NoClipboard)),
            webview: self.webview.unwrap_or_else(|| Arc::new(NoWebView)),
            intent: Rendezvous::new(),
            serial: Mutex::new(()),
            searching: AtomicBool::new(false),
            resolved: AtomicBool::new(false),
            config: self.config,
        })
    }
}
