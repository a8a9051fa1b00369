use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use traceback_core::{LogLevel, TracebackConfig};
use url::Url;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCliConfig {
    #[serde(default)]
    pub traceback: RawTracebackSection,

    #[serde(default)]
    pub app: RawAppSection,
}

/// Engine settings as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTracebackSection {
    pub main_associated_host: Option<Url>,
    pub associated_hosts: Option<Vec<Url>>,
    pub use_clipboard: Option<bool>,
    pub log_level: Option<LogLevel>,
    #[serde(default, with = "humantime_serde")]
    pub intent_grace_period: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub signal_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

/// Simulated app as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAppSection {
    pub bundle_id: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub traceback: TracebackConfig,
    pub app: AppConfig,
}

/// The app install the CLI pretends to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Reported to the backend as the bundle id
    pub bundle_id: String,

    /// Where the install gate and seen campaigns are kept
    pub data_dir: PathBuf,
}

/// Bundle id reported when none is configured
pub const DEFAULT_BUNDLE_ID: &str = "dev.traceback.cli";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_config_parses_sections() {
        let toml_str = r#"
[traceback]
main_associated_host = "https://example.web.app"
associated_hosts = ["https://links.example.com"]
use_clipboard = false
log_level = "debug"
intent_grace_period = "750ms"

[app]
bundle_id = "com.example.app"
"#;
        let raw: RawCliConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(
            raw.traceback.main_associated_host,
            Some(Url::parse("https://example.web.app").unwrap())
        );
        assert_eq!(raw.traceback.associated_hosts.unwrap().len(), 1);
        assert_eq!(raw.traceback.use_clipboard, Some(false));
        assert_eq!(raw.traceback.log_level, Some(LogLevel::Debug));
        assert_eq!(
            raw.traceback.intent_grace_period,
            Some(Duration::from_millis(750))
        );
        assert_eq!(raw.traceback.signal_timeout, None);
        assert_eq!(raw.app.bundle_id.as_deref(), Some("com.example.app"));
    }

    #[test]
    fn test_empty_config_parses() {
        let raw: RawCliConfig = toml::from_str("").unwrap();
        assert!(raw.traceback.main_associated_host.is_none());
        assert!(raw.app.data_dir.is_none());
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let toml_str = r#"
[traceback]
main_associated_host = "not a url"
"#;
        assert!(toml::from_str::<RawCliConfig>(toml_str).is_err());
    }
}
