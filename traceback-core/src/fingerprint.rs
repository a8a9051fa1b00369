//! Device fingerprint sent to the match backend

use serde::{Deserialize, Serialize};
use url::Url;

use crate::signals::{SystemInfo, WebViewInfo};

/// Signal bundle for one post-install search attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFingerprint {
    /// Seconds since the Unix epoch
    pub app_installation_time: f64,
    pub bundle_id: String,
    pub os_version: String,
    pub sdk_version: String,
    /// Link found on the clipboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_match_link_to_check: Option<Url>,
    /// Link the OS delivered when the app was opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_link: Option<Url>,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_model_name: String,
    /// Normalized, e.g. `es-ES`
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code_from_web_view: Option<String>,
    /// As reported, e.g. `es_ES`
    pub language_code_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version_from_web_view: Option<String>,
    pub screen_resolution_width: u32,
    pub screen_resolution_height: u32,
    pub timezone: String,
}

/// Turn a platform locale tag into a comparable one.
///
/// `es_ES` becomes `es-ES`; the `001` "world" pseudo-region is dropped, so
/// `es_001` becomes `es`.
pub fn normalize_locale(raw: &str) -> String {
    let dashed = raw.replace('_', "-");
    match dashed.strip_suffix("-001") {
        Some(stripped) => stripped.to_string(),
        None => dashed,
    }
}

/// Assemble the outbound fingerprint from collected signals.
pub fn build_fingerprint(
    system: &SystemInfo,
    clipboard_link: Option<Url>,
    intent_link: Option<Url>,
    webview: Option<WebViewInfo>,
) -> DeviceFingerprint {
    let (width, height) = if system.screen.compatibility_mode {
        (0, 0)
    } else {
        (system.screen.width, system.screen.height)
    };
    let webview = webview.unwrap_or_default();

    DeviceFingerprint {
        app_installation_time: system.installation_time.timestamp_millis() as f64 / 1000.0,
        bundle_id: system.bundle_id.clone(),
        os_version: system.os_version.clone(),
        sdk_version: system.sdk_version.clone(),
        unique_match_link_to_check: clipboard_link,
        intent_link,
        device: DeviceInfo {
            device_model_name: system.device_model_name.clone(),
            language_code: normalize_locale(&system.locale_identifier),
            language_code_from_web_view: webview.language,
            language_code_raw: system.locale_identifier.clone(),
            app_version_from_web_view: webview.app_version,
            screen_resolution_width: width,
            screen_resolution_height: height,
            timezone: system.timezone.clone(),
        },
    }
}
