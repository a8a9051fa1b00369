//! Signal collectors for a desktop host
//!
//! The CLI stands in for an app install: device metadata comes from the
//! environment and the clipboard is the real system clipboard.

use std::path::PathBuf;

use arboard::Clipboard;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use traceback_core::{ClipboardReader, SDK_VERSION, ScreenInfo, SystemInfo, SystemInfoProvider};
use url::Url;

/// System clipboard via `arboard`
///
/// Every access opens its own handle on a blocking thread, since some
/// platforms tie clipboard handles to the thread that created them.
pub struct SystemClipboard;

#[async_trait]
impl ClipboardReader for SystemClipboard {
    async fn read_url(&self) -> Option<Url> {
        let text = tokio::task::spawn_blocking(|| Clipboard::new()?.get_text())
            .await
            .ok()?;
        match text {
            Ok(text) => Url::parse(text.trim()).ok(),
            Err(e) => {
                debug!("Failed to read clipboard: {}", e);
                None
            }
        }
    }

    async fn clear(&self) {
        let result = tokio::task::spawn_blocking(|| Clipboard::new()?.clear()).await;
        if let Ok(Err(e)) = result {
            debug!("Failed to clear clipboard: {}", e);
        }
    }
}

/// Device metadata read from the process environment
pub struct EnvSystemInfo {
    pub bundle_id: String,
    /// The install time is the creation time of this directory
    pub data_dir: PathBuf,
}

#[async_trait]
impl SystemInfoProvider for EnvSystemInfo {
    async fn system_info(&self) -> SystemInfo {
        SystemInfo {
            installation_time: self.installation_time().await,
            bundle_id: self.bundle_id.clone(),
            os_version: std::env::consts::OS.to_string(),
            sdk_version: SDK_VERSION.to_string(),
            device_model_name: std::env::consts::ARCH.to_string(),
            locale_identifier: locale_from_env(
                std::env::var("LC_ALL").ok(),
                std::env::var("LANG").ok(),
            ),
            timezone: std::env::var("TZ")
                .ok()
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
            screen: ScreenInfo::default(),
        }
    }
}

impl EnvSystemInfo {
    async fn installation_time(&self) -> DateTime<Utc> {
        match tokio::fs::metadata(&self.data_dir).await {
            Ok(metadata) => metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now()),
            Err(_) => Utc::now(),
        }
    }
}

/// Locale tag from POSIX locale variables, e.g. `es_ES.UTF-8` becomes `es_ES`.
///
/// `LC_ALL` wins over `LANG`; `C` and `POSIX` mean no locale.
fn locale_from_env(lc_all: Option<String>, lang: Option<String>) -> String {
    [lc_all, lang]
        .into_iter()
        .flatten()
        .map(|value| {
            let end = value.find(['.', '@']).unwrap_or(value.len());
            value[..end].to_string()
        })
        .find(|tag| !tag.is_empty() && tag != "C" && tag != "POSIX")
        .unwrap_or_else(|| "en_US".to_string())
}
