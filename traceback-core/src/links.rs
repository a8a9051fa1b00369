//! Pure helpers for inspecting opened links

use url::Url;

use crate::config::TracebackConfig;

/// Whether `url`'s host is one of the configured associated hosts.
///
/// Exact, case-sensitive comparison; no wildcards.
pub fn is_associated_host(config: &TracebackConfig, url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    config
        .hosts()
        .any(|candidate| candidate.host_str() == Some(host))
}

/// Campaign identifier carried in a link's path.
///
/// `/summer_sale` yields `summer_sale`; an empty or root path yields `None`.
pub fn campaign_id(url: &Url) -> Option<String> {
    let path = url.path();
    let id = path.strip_prefix('/').unwrap_or(path);
    (!id.is_empty()).then(|| id.to_string())
}

/// Decoded value of the `link` query parameter, if it is a valid URL.
pub fn link_parameter(url: &Url) -> Option<Url> {
    url.query_pairs()
        .find(|(name, _)| name == "link")
        .and_then(|(_, value)| Url::parse(&value).ok())
}
