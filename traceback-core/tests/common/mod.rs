//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use traceback_core::{
    AttributionEngine, KeyValueStore, MemoryStore, MockMatchClient, SDK_VERSION, ScreenInfo,
    StaticSystemInfo, SystemInfo, TracebackConfig,
};
use url::Url;

pub const MAIN_HOST: &str = "https://example.web.app";
pub const EXTRA_HOST: &str = "https://links.example.com";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn config() -> TracebackConfig {
    TracebackConfig::new(url(MAIN_HOST))
        .with_associated_hosts(vec![url(EXTRA_HOST)])
        .with_intent_grace_period(Duration::from_millis(500))
}

pub fn system_info() -> SystemInfo {
    SystemInfo {
        installation_time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        bundle_id: "com.test.app".into(),
        os_version: "18.0".into(),
        sdk_version: SDK_VERSION.into(),
        device_model_name: "iPhone15,2".into(),
        locale_identifier: "es_ES".into(),
        timezone: "Europe/Madrid".into(),
        screen: ScreenInfo {
            width: 393,
            height: 852,
            compatibility_mode: false,
        },
    }
}

/// Engine wired to the given mock and store
pub fn engine_for(
    client: &Arc<MockMatchClient>,
    store: &Arc<dyn KeyValueStore>,
) -> AttributionEngine {
    AttributionEngine::builder(config())
        .store(Arc::clone(store))
        .client(client.clone())
        .system_info(Arc::new(StaticSystemInfo(system_info())))
        .build()
        .unwrap()
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}
