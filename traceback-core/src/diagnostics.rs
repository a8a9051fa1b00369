//! Configuration diagnostics
//!
//! Catches the mistakes that silently break attribution: a non-HTTPS host,
//! a host URL without a hostname, or clipboard matching turned off.

use std::fmt;

use url::Url;

use crate::client::{SEARCH_PATH, endpoint_url};
use crate::config::TracebackConfig;

/// Overall outcome of a diagnostics run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticsStatus {
    Success,
    WarningsOnly,
    HasErrors,
}

/// Result of checking one configured host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCheck {
    pub url: Url,
    pub uses_https: bool,
    pub hostname: Option<String>,
}

impl HostCheck {
    fn new(url: &Url) -> Self {
        Self {
            url: url.clone(),
            uses_https: url.scheme() == "https",
            hostname: url.host_str().filter(|h| !h.is_empty()).map(str::to_string),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.uses_https && self.hostname.is_some()
    }
}

/// Findings for a [`TracebackConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub main_host: HostCheck,
    pub additional_hosts: Vec<HostCheck>,
    /// Clipboard matching is disabled, which lowers match accuracy
    pub clipboard_warning: bool,
    /// Endpoint post-install searches will be sent to, if the main host can
    /// carry a path
    pub search_endpoint: Option<Url>,
}

impl DiagnosticsReport {
    pub fn error_count(&self) -> usize {
        let scheme = usize::from(!self.main_host.uses_https);
        let hostname = usize::from(self.main_host.hostname.is_none());
        let additional = self.additional_hosts.iter().filter(|h| !h.is_valid()).count();
        scheme + hostname + additional
    }

    pub fn warning_count(&self) -> usize {
        usize::from(self.clipboard_warning)
    }

    pub fn status(&self) -> DiagnosticsStatus {
        match (self.error_count(), self.warning_count()) {
            (0, 0) => DiagnosticsStatus::Success,
            (0, _) => DiagnosticsStatus::WarningsOnly,
            _ => DiagnosticsStatus::HasErrors,
        }
    }
}

/// Check `config` without touching the network.
pub fn check_configuration(config: &TracebackConfig) -> DiagnosticsReport {
    let main = &config.main_associated_host;
    DiagnosticsReport {
        main_host: HostCheck::new(main),
        additional_hosts: config.associated_hosts.iter().map(HostCheck::new).collect(),
        clipboard_warning: !config.use_clipboard,
        search_endpoint: endpoint_url(main, SEARCH_PATH).ok(),
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Traceback configuration")?;
        writeln!(f, "  Main host: {}", self.main_host.url)?;
        writeln!(
            f,
            "  Search endpoint: {}",
            self.search_endpoint.as_ref().map_or("(none)", Url::as_str)
        )?;
        writeln!(f)?;

        if self.main_host.uses_https {
            writeln!(f, "[ok]    Main host uses HTTPS")?;
        } else {
            writeln!(
                f,
                "[error] Main host must use HTTPS, found: {}",
                self.main_host.url.scheme()
            )?;
        }
        match &self.main_host.hostname {
            Some(host) => writeln!(f, "[ok]    Main host has hostname: {}", host)?,
            None => writeln!(f, "[error] Main host has no hostname")?,
        }

        let invalid: Vec<_> = self.additional_hosts.iter().filter(|h| !h.is_valid()).collect();
        if !self.additional_hosts.is_empty() && invalid.is_empty() {
            writeln!(
                f,
                "[ok]    All {} additional hosts are valid",
                self.additional_hosts.len()
            )?;
        }
        for host in invalid {
            writeln!(f, "[error] Additional host invalid: {}", host.url)?;
        }

        if self.clipboard_warning {
            writeln!(
                f,
                "[warn]  Clipboard disabled, post-install matching will be less accurate"
            )?;
        }

        writeln!(f)?;
        match self.status() {
            DiagnosticsStatus::Success => write!(f, "Configuration is valid."),
            DiagnosticsStatus::WarningsOnly => write!(
                f,
                "Configuration is valid with {} warning(s).",
                self.warning_count()
            ),
            DiagnosticsStatus::HasErrors => write!(
                f,
                "Found {} error(s) and {} warning(s).",
                self.error_count(),
                self.warning_count()
            ),
        }
    }
}
