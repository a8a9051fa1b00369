use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use traceback_core::TracebackConfig;
use url::Url;

use super::types::{
    AppConfig, CliConfig, DEFAULT_BUNDLE_ID, RawAppSection, RawCliConfig, RawTracebackSection,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged raw configuration (user + project + explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<RawCliConfig> {
        let mut raw = RawCliConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::load_from_path(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::load_from_path(&project_path)?);
        }

        // Layer 3: File passed on the command line, which must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::load_from_path(path)?);
        }

        Ok(raw)
    }

    /// Get user config path (`$XDG_CONFIG_HOME/traceback/config.toml`)
    pub fn user_config_path() -> PathBuf {
        traceback_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with TRACEBACK_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        match std::env::var_os("TRACEBACK_PROJECT_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir).join("config.toml"),
            None => traceback_paths::project_dir(Path::new(".")).join("config.toml"),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<RawCliConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCliConfig, overlay: RawCliConfig) -> RawCliConfig {
        RawCliConfig {
            traceback: RawTracebackSection {
                main_associated_host: overlay
                    .traceback
                    .main_associated_host
                    .or(base.traceback.main_associated_host),
                associated_hosts: overlay
                    .traceback
                    .associated_hosts
                    .or(base.traceback.associated_hosts),
                use_clipboard: overlay
                    .traceback
                    .use_clipboard
                    .or(base.traceback.use_clipboard),
                log_level: overlay.traceback.log_level.or(base.traceback.log_level),
                intent_grace_period: overlay
                    .traceback
                    .intent_grace_period
                    .or(base.traceback.intent_grace_period),
                signal_timeout: overlay
                    .traceback
                    .signal_timeout
                    .or(base.traceback.signal_timeout),
                request_timeout: overlay
                    .traceback
                    .request_timeout
                    .or(base.traceback.request_timeout),
            },
            app: RawAppSection {
                bundle_id: overlay.app.bundle_id.or(base.app.bundle_id),
                data_dir: overlay.app.data_dir.or(base.app.data_dir),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    ///
    /// `host` from the command line takes precedence over any file.
    pub fn finalize(raw: RawCliConfig, host: Option<Url>) -> Result<CliConfig> {
        let section = raw.traceback;
        let main_host = host.or(section.main_associated_host).context(
            "No main associated host configured. \
             Set traceback.main_associated_host in config.toml or pass --host",
        )?;

        let mut traceback = TracebackConfig::new(main_host)
            .with_associated_hosts(section.associated_hosts.unwrap_or_default());
        if let Some(enabled) = section.use_clipboard {
            traceback = traceback.with_clipboard(enabled);
        }
        if let Some(level) = section.log_level {
            traceback = traceback.with_log_level(level);
        }
        if let Some(period) = section.intent_grace_period {
            traceback = traceback.with_intent_grace_period(period);
        }
        if let Some(timeout) = section.signal_timeout {
            traceback = traceback.with_signal_timeout(timeout);
        }
        if let Some(timeout) = section.request_timeout {
            traceback = traceback.with_request_timeout(timeout);
        }

        Ok(CliConfig {
            traceback,
            app: AppConfig {
                bundle_id: raw
                    .app
                    .bundle_id
                    .unwrap_or_else(|| DEFAULT_BUNDLE_ID.to_string()),
                data_dir: raw.app.data_dir.unwrap_or_else(traceback_paths::data_dir),
            },
        })
    }
}
