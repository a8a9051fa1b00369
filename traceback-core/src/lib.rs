//! traceback-core: Deferred deep link attribution
//!
//! This crate decides which content an app should open after it is
//! installed from a link, and which content a campaign link points to once
//! the app is installed:
//!
//! - **Engine** - [`AttributionEngine`] with the post-install search and campaign link flows
//! - **Persistence** - [`InstallGate`] and [`CampaignLedger`] over a [`KeyValueStore`]
//! - **Signals** - [`DeviceFingerprint`] assembled from host-supplied collectors
//! - **Backend** - [`MatchClient`] trait with [`HttpMatchClient`] and [`MockMatchClient`]
//! - **Diagnostics** - [`diagnostics::check_configuration`] for configuration mistakes
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use traceback_core::{AttributionEngine, FileStore, TracebackConfig};
//! # use traceback_core::{SDK_VERSION, ScreenInfo, StaticSystemInfo, SystemInfo};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let system = StaticSystemInfo(SystemInfo {
//! #     installation_time: chrono::Utc::now(),
//! #     bundle_id: "com.example.app".into(),
//! #     os_version: "18.0".into(),
//! #     sdk_version: SDK_VERSION.into(),
//! #     device_model_name: "iPhone15,2".into(),
//! #     locale_identifier: "en_US".into(),
//! #     timezone: "UTC".into(),
//! #     screen: ScreenInfo::default(),
//! # });
//! let config = TracebackConfig::new("https://example.web.app".parse()?);
//! let engine = AttributionEngine::builder(config)
//!     .store(Arc::new(FileStore::load(std::path::Path::new("/tmp/traceback")).await?))
//!     .system_info(Arc::new(system))
//!     .build()?;
//!
//! let result = engine.post_install_search().await;
//! if let Some(url) = result.url {
//!     println!("Open {}", url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//!   launch URL                      first launch
//!       │                                │
//!       ▼                                ▼
//! ┌──────────────┐  first run   ┌─────────────────────┐
//! │ campaign_link├─────────────►│     Rendezvous      │
//! └──────┬───────┘   provide    └──────────┬──────────┘
//!        │ later runs                      │ wait (grace period)
//!        ▼                                 ▼
//! ┌──────────────┐              ┌─────────────────────┐
//! │CampaignLedger│              │ post_install_search │
//! └──────┬───────┘              └──────────┬──────────┘
//!        │  v1_get_campaign                │ v1_postinstall_search_link
//!        └───────────────┐   ┌─────────────┘
//!                        ▼   ▼
//!                    ┌───────────┐
//!                    │MatchClient│──► InstallGate
//!                    └───────────┘
//! ```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod ledger;
pub mod links;
pub mod rendezvous;
pub mod signals;
pub mod store;
pub mod types;

// Re-export key types for convenience
pub use client::{
    CampaignResponse, HttpMatchClient, MatchClient, MatchResponse, MockCall, MockMatchClient,
};
pub use config::{LogLevel, TracebackConfig};
pub use diagnostics::{DiagnosticsReport, DiagnosticsStatus};
pub use engine::{AttributionEngine, AttributionEngineBuilder, SearchPhase};
pub use error::{NetworkError, Result, StoreError, TracebackError};
pub use fingerprint::{DeviceFingerprint, DeviceInfo};
pub use gate::InstallGate;
pub use ledger::CampaignLedger;
pub use rendezvous::Rendezvous;
pub use signals::{
    ClipboardReader, MemoryClipboard, NoClipboard, NoWebView, SDK_VERSION, ScreenInfo,
    StaticSystemInfo, SystemInfo, SystemInfoProvider, WebViewInfo, WebViewInfoReader,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{AnalyticsEvent, AttributionResult, MatchType};
