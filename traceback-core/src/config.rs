//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default window a post-install search waits for an OS-delivered link.
pub const DEFAULT_INTENT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Default timeout applied to each best-effort signal collector.
pub const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Default timeout handed to the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verbosity of engine logging
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Progress of each attribution step
    #[default]
    Info,
    /// Everything, including the outbound fingerprint
    Debug,
}

impl LogLevel {
    /// `tracing` filter directive for this level.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Configuration for an [`AttributionEngine`](crate::AttributionEngine)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TracebackConfig {
    /// Primary associated host; also the base URL of the match backend
    pub main_associated_host: Url,

    /// Other hosts whose links belong to this app
    #[serde(default)]
    pub associated_hosts: Vec<Url>,

    /// Read a link from the clipboard during post-install search
    #[serde(default = "default_use_clipboard")]
    pub use_clipboard: bool,

    #[serde(default)]
    pub log_level: LogLevel,

    /// How long a post-install search waits for a launch URL
    #[serde(default = "default_intent_grace_period", with = "humantime_serde")]
    pub intent_grace_period: Duration,

    /// Per-collector timeout for clipboard and webview reads
    #[serde(default = "default_signal_timeout", with = "humantime_serde")]
    pub signal_timeout: Duration,

    /// Timeout for each backend request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_use_clipboard() -> bool {
    true
}

fn default_intent_grace_period() -> Duration {
    DEFAULT_INTENT_GRACE_PERIOD
}

fn default_signal_timeout() -> Duration {
    DEFAULT_SIGNAL_TIMEOUT
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl TracebackConfig {
    /// Create a configuration with defaults for everything but the main host.
    pub fn new(main_associated_host: Url) -> Self {
        Self {
            main_associated_host,
            associated_hosts: Vec::new(),
            use_clipboard: default_use_clipboard(),
            log_level: LogLevel::default(),
            intent_grace_period: DEFAULT_INTENT_GRACE_PERIOD,
            signal_timeout: DEFAULT_SIGNAL_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_associated_hosts(mut self, hosts: Vec<Url>) -> Self {
        self.associated_hosts = hosts;
        self
    }

    pub fn with_clipboard(mut self, enabled: bool) -> Self {
        self.use_clipboard = enabled;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_intent_grace_period(mut self, period: Duration) -> Self {
        self.intent_grace_period = period;
        self
    }

    pub fn with_signal_timeout(mut self, timeout: Duration) -> Self {
        self.signal_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// All configured hosts, main host first.
    pub fn hosts(&self) -> impl Iterator<Item = &Url> {
        std::iter::once(&self.main_associated_host).chain(self.associated_hosts.iter())
    }
}
