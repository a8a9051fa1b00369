//! Best-effort signal collectors supplied by the host
//!
//! Device metadata, clipboard access and webview inspection are platform
//! concerns. The engine only sees these traits, and treats every failure
//! or timeout as an absent signal.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Version string reported to the backend.
pub const SDK_VERSION: &str = concat!("rust/", env!("CARGO_PKG_VERSION"));

/// Screen geometry as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    /// The app runs under another device class's presentation (e.g. a phone
    /// app on a tablet), so `width`/`height` do not describe what the user sees
    pub compatibility_mode: bool,
}

/// Static device and app metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub installation_time: DateTime<Utc>,
    pub bundle_id: String,
    pub os_version: String,
    pub sdk_version: String,
    pub device_model_name: String,
    /// Locale tag as the platform reports it, e.g. `es_ES`
    pub locale_identifier: String,
    /// IANA timezone name, e.g. `Europe/Madrid`
    pub timezone: String,
    pub screen: ScreenInfo,
}

/// Values read from the platform's embedded browser engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebViewInfo {
    pub language: Option<String>,
    pub app_version: Option<String>,
}

/// Source of device metadata
#[async_trait]
pub trait SystemInfoProvider: Send + Sync {
    async fn system_info(&self) -> SystemInfo;
}

/// Access to a link the user may have copied before installing
#[async_trait]
pub trait ClipboardReader: Send + Sync {
    /// The clipboard contents, if they parse as a URL.
    async fn read_url(&self) -> Option<Url>;

    /// Empty the clipboard.
    async fn clear(&self);
}

/// Access to the embedded browser's navigator values
#[async_trait]
pub trait WebViewInfoReader: Send + Sync {
    async fn read(&self) -> Option<WebViewInfo>;
}

/// SystemInfoProvider returning a fixed value
pub struct StaticSystemInfo(pub SystemInfo);

#[async_trait]
impl SystemInfoProvider for StaticSystemInfo {
    async fn system_info(&self) -> SystemInfo {
        self.0.clone()
    }
}

/// Clipboard that is always empty
pub struct NoClipboard;

#[async_trait]
impl ClipboardReader for NoClipboard {
    async fn read_url(&self) -> Option<Url> {
        None
    }

    async fn clear(&self) {}
}

/// In-process clipboard holding at most one URL
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<Url>>,
}

impl MemoryClipboard {
    pub fn with_url(url: Url) -> Self {
        Self {
            contents: Mutex::new(Some(url)),
        }
    }

    /// Current contents without consuming them.
    pub fn peek(&self) -> Option<Url> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ClipboardReader for MemoryClipboard {
    async fn read_url(&self) -> Option<Url> {
        self.peek()
    }

    async fn clear(&self) {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

/// Webview reader for platforms without an embedded browser
pub struct NoWebView;

#[async_trait]
impl WebViewInfoReader for NoWebView {
    async fn read(&self) -> Option<WebViewInfo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_clipboard_clears() {
        let url = Url::parse("https://app.test/p/1").unwrap();
        let clipboard = MemoryClipboard::with_url(url.clone());

        assert_eq!(clipboard.read_url().await, Some(url));
        clipboard.clear().await;
        assert_eq!(clipboard.read_url().await, None);
    }

    #[tokio::test]
    async fn inert_collectors_return_nothing() {
        assert_eq!(NoClipboard.read_url().await, None);
        assert_eq!(NoWebView.read().await, None);
    }

    #[test]
    fn sdk_version_is_prefixed() {
        assert!(SDK_VERSION.starts_with("rust/"));
    }
}
