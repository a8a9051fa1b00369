//! XDG Base Directory paths for traceback.
//!
//! The CLI keeps its config and attribution state in XDG locations on every
//! platform, so a simulated install behaves the same on Linux and macOS.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "traceback";

/// Name of the per-project config directory.
pub const PROJECT_DIR: &str = ".traceback";

/// Get the traceback config directory.
///
/// Returns `$XDG_CONFIG_HOME/traceback` if set, otherwise
/// `~/.config/traceback`.
///
/// # Examples
///
/// ```
/// use traceback_paths::config_dir;
///
/// let config_file = config_dir().join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    resolve(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir(), ".config")
}

/// Get the traceback data directory.
///
/// Returns `$XDG_DATA_HOME/traceback` if set, otherwise
/// `~/.local/share/traceback`. The install gate and campaign ledger of a
/// simulated install live here.
pub fn data_dir() -> PathBuf {
    resolve(std::env::var_os("XDG_DATA_HOME"), dirs::home_dir(), ".local/share")
}

/// Project config directory under `root`.
pub fn project_dir(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR)
}

/// An empty XDG variable counts as unset.
fn resolve(xdg: Option<OsString>, home: Option<PathBuf>, fallback: &str) -> PathBuf {
    match xdg.filter(|value| !value.is_empty()) {
        Some(base) => PathBuf::from(base).join(APP_DIR),
        None => home
            .map(|home| home.join(fallback))
            .unwrap_or_else(|| PathBuf::from(fallback))
            .join(APP_DIR),
    }
}
