//! End-to-end attribution flows against a mock backend

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;
use tokio::time::Instant;
use traceback_core::{
    AnalyticsEvent, AttributionEngine, CampaignLedger, CampaignResponse, FileStore, InstallGate,
    KeyValueStore, MatchType, MockCall, MockMatchClient, NetworkError, SearchPhase,
    StaticSystemInfo, TracebackError,
};

use common::{config, engine_for, memory_store, system_info, url};

async fn installed_store() -> Arc<dyn KeyValueStore> {
    let store = memory_store();
    InstallGate::new(Arc::clone(&store)).set().await.unwrap();
    store
}

// ==================== Post-install search ====================

#[tokio::test(start_paused = true)]
async fn second_search_makes_no_network_call() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(Some("https://app.test/p/1"), "unique", None);
    let store = memory_store();
    let engine = engine_for(&client, &store);

    let first = engine.post_install_search().await;
    assert_eq!(first.url, Some(url("https://app.test/p/1")));
    assert_eq!(first.match_type, MatchType::Unique);
    assert_eq!(
        first.analytics,
        vec![AnalyticsEvent::PostInstallDetected(url("https://app.test/p/1"))]
    );

    let second = engine.post_install_search().await;
    assert!(second.is_empty());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn search_without_launch_link_waits_full_grace_period() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    let engine = engine_for(&client, &memory_store());

    let start = Instant::now();
    let result = engine.post_install_search().await;

    assert!(start.elapsed() >= config().intent_grace_period);
    assert!(result.is_empty());
    let fingerprints = client.fingerprints();
    assert_eq!(fingerprints.len(), 1);
    assert_eq!(fingerprints[0].intent_link, None);
}

#[tokio::test(start_paused = true)]
async fn fingerprint_carries_device_signals() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    let engine = engine_for(&client, &memory_store());

    engine.post_install_search().await;

    let fingerprint = &client.fingerprints()[0];
    assert_eq!(fingerprint.bundle_id, "com.test.app");
    assert_eq!(fingerprint.app_installation_time, 1_700_000_000.0);
    assert_eq!(fingerprint.device.language_code, "es-ES");
    assert_eq!(fingerprint.device.language_code_raw, "es_ES");
    assert_eq!(fingerprint.device.timezone, "Europe/Madrid");
    assert_eq!(fingerprint.device.screen_resolution_width, 393);
}

#[tokio::test(start_paused = true)]
async fn match_without_link_emits_no_event() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "ambiguous", Some("spring"));
    let engine = engine_for(&client, &memory_store());

    let result = engine.post_install_search().await;

    assert_eq!(result.url, None);
    assert_eq!(result.campaign.as_deref(), Some("spring"));
    assert_eq!(result.match_type, MatchType::Ambiguous);
    assert!(result.analytics.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unrecognized_match_type_is_unknown() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(Some("https://app.test/p/1"), "probabilistic", None);
    let engine = engine_for(&client, &memory_store());

    assert_eq!(engine.post_install_search().await.match_type, MatchType::Unknown);
}

#[tokio::test(start_paused = true)]
async fn failed_search_leaves_gate_unset() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_search(Err(NetworkError::HttpStatus { status_code: 500 }));
    client.queue_match(Some("https://app.test/p/1"), "heuristics", None);
    let store = memory_store();

    let result = engine_for(&client, &store).post_install_search().await;
    assert_eq!(result.url, None);
    assert_eq!(
        result.analytics,
        vec![AnalyticsEvent::PostInstallError(TracebackError::Network(
            NetworkError::HttpStatus { status_code: 500 }
        ))]
    );
    assert!(!InstallGate::new(Arc::clone(&store)).get().await.unwrap());

    // Next launch
    let engine = engine_for(&client, &store);
    let retried = engine.post_install_search().await;
    assert_eq!(retried.url, Some(url("https://app.test/p/1")));
    assert!(InstallGate::new(store).get().await.unwrap());
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn completed_search_is_skipped_on_next_launch() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    let store = memory_store();

    engine_for(&client, &store).post_install_search().await;

    let engine = engine_for(&client, &store);
    assert!(engine.post_install_search().await.is_empty());
    assert_eq!(engine.phase(), SearchPhase::NeverSearched);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn search_state_survives_restart_on_disk() {
    let temp_dir = tempdir().unwrap();
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(Some("https://app.test/p/1"), "unique", Some("summer_sale"));

    {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::load(temp_dir.path()).await.unwrap());
        engine_for(&client, &store).post_install_search().await;
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::load(temp_dir.path()).await.unwrap());
    assert!(engine_for(&client, &store).post_install_search().await.is_empty());
    assert!(
        CampaignLedger::new(store)
            .contains("summer_sale")
            .await
            .unwrap()
    );
    assert_eq!(client.call_count(), 1);
}

// ==================== First-run launch links ====================

#[tokio::test(start_paused = true)]
async fn launch_link_before_search_becomes_intent_link() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(Some("https://app.test/p/1"), "intent", None);
    let engine = engine_for(&client, &memory_store());
    let link = url("https://example.web.app/summer_sale");

    let deferred = engine.campaign_link(&link).await;
    assert!(deferred.is_empty());
    assert_eq!(client.call_count(), 0);

    let start = Instant::now();
    let result = engine.post_install_search().await;

    assert!(start.elapsed() < config().intent_grace_period);
    assert_eq!(result.match_type, MatchType::Intent);
    assert_eq!(client.fingerprints()[0].intent_link, Some(link));
}

#[tokio::test(start_paused = true)]
async fn launch_link_during_grace_period_wakes_search() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(Some("https://app.test/p/1"), "intent", None);
    let engine = Arc::new(engine_for(&client, &memory_store()));
    let link = url("https://links.example.com/summer_sale");

    let search = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.post_install_search().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(engine.campaign_link(&link).await.is_empty());
    let result = search.await.unwrap();

    assert_eq!(result.url, Some(url("https://app.test/p/1")));
    assert_eq!(client.fingerprints()[0].intent_link, Some(link));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn latest_launch_link_wins() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    let engine = engine_for(&client, &memory_store());

    engine.campaign_link(&url("https://example.web.app/first")).await;
    engine.campaign_link(&url("https://example.web.app/second")).await;
    engine.post_install_search().await;

    assert_eq!(
        client.fingerprints()[0].intent_link,
        Some(url("https://example.web.app/second"))
    );
}

fn campaign_calls(client: &MockMatchClient) -> usize {
    client
        .calls()
        .iter()
        .filter(|call| matches!(call, MockCall::ResolveCampaign { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn launch_link_after_grace_period_is_deferred() {
    let client = Arc::new(MockMatchClient::new().with_latency(Duration::from_secs(1)));
    client.queue_match(None, "none", None);
    client.queue_campaign(Ok(CampaignResponse {
        result: Some(url("https://app.test/sale")),
        error: None,
    }));
    let store = memory_store();
    let engine = Arc::new(engine_for(&client, &store));
    let link = url("https://example.web.app/summer_sale");

    let search = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.post_install_search().await })
    };
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(engine.phase(), SearchPhase::Searching);

    let result = engine.campaign_link(&link).await;
    assert!(result.is_empty());
    assert_eq!(campaign_calls(&client), 0);

    search.await.unwrap();
    assert_eq!(client.fingerprints()[0].intent_link, None);
    assert_eq!(client.call_count(), 1);
    let ledger = CampaignLedger::new(store);
    assert!(!ledger.contains("summer_sale").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn launch_link_after_failed_search_is_deferred() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_search(Err(NetworkError::NoConnection));
    client.queue_campaign(Ok(CampaignResponse {
        result: Some(url("https://app.test/sale")),
        error: None,
    }));
    let store = memory_store();
    let engine = engine_for(&client, &store);

    let failed = engine.post_install_search().await;
    assert!(failed.url.is_none());
    assert!(!InstallGate::new(Arc::clone(&store)).get().await.unwrap());

    let result = engine.campaign_link(&url("https://example.web.app/summer_sale")).await;
    assert!(result.is_empty());
    assert!(result.analytics.is_empty());
    assert_eq!(campaign_calls(&client), 0);
    assert_eq!(client.call_count(), 1);
    let ledger = CampaignLedger::new(store);
    assert!(!ledger.contains("summer_sale").await.unwrap());
}

// ==================== Campaign links ====================

#[tokio::test]
async fn foreign_host_is_ignored() {
    let client = Arc::new(MockMatchClient::new());
    let engine = engine_for(&client, &memory_store());

    for link in [
        "https://evil.test/summer_sale",
        "https://sub.example.web.app/summer_sale",
        "https://EXAMPLE.web.app.evil.test/summer_sale",
    ] {
        assert!(engine.campaign_link(&url(link)).await.is_empty());
    }
    assert_eq!(client.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn foreign_host_does_not_reach_search() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    let engine = engine_for(&client, &memory_store());

    engine.campaign_link(&url("https://evil.test/summer_sale")).await;
    engine.post_install_search().await;

    assert_eq!(client.fingerprints()[0].intent_link, None);
}

#[tokio::test]
async fn campaign_resolves_with_first_open_flag() {
    let client = Arc::new(MockMatchClient::new());
    for _ in 0..2 {
        client.queue_campaign(Ok(CampaignResponse {
            result: Some(url("https://app.test/sale")),
            error: None,
        }));
    }
    let engine = engine_for(&client, &installed_store().await);
    let link = url("https://example.web.app/summer_sale");

    let first = engine.campaign_link(&link).await;
    assert_eq!(first.url, Some(url("https://app.test/sale")));
    assert_eq!(first.campaign.as_deref(), Some("summer_sale"));
    assert_eq!(first.match_type, MatchType::Intent);
    assert_eq!(
        first.analytics,
        vec![AnalyticsEvent::CampaignResolved(url("https://app.test/sale"))]
    );

    engine.campaign_link(&link).await;

    assert_eq!(
        client.calls(),
        vec![
            MockCall::ResolveCampaign {
                link: link.clone(),
                first_campaign_open: true
            },
            MockCall::ResolveCampaign {
                link,
                first_campaign_open: false
            },
        ]
    );
}

#[tokio::test]
async fn campaign_seen_by_search_is_not_a_first_open() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_campaign(Ok(CampaignResponse::default()));
    let store = installed_store().await;
    CampaignLedger::new(Arc::clone(&store))
        .mark_seen("summer_sale")
        .await
        .unwrap();
    let engine = engine_for(&client, &store);

    engine
        .campaign_link(&url("https://example.web.app/summer_sale"))
        .await;

    assert!(matches!(
        client.calls()[0],
        MockCall::ResolveCampaign {
            first_campaign_open: false,
            ..
        }
    ));
}

#[tokio::test]
async fn link_parameter_resolves_locally() {
    let client = Arc::new(MockMatchClient::new());
    let engine = engine_for(&client, &installed_store().await);

    let result = engine
        .campaign_link(&url(
            "https://links.example.com?utm_source=a&link=https%3A%2F%2Fapp.test%2Fp%2F1&utm_campaign=b",
        ))
        .await;

    assert_eq!(result.url, Some(url("https://app.test/p/1")));
    assert_eq!(result.campaign, None);
    assert_eq!(result.match_type, MatchType::Intent);
    assert_eq!(
        result.analytics,
        vec![AnalyticsEvent::CampaignResolvedLocally(url("https://app.test/p/1"))]
    );
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn link_without_campaign_or_target_is_empty() {
    let client = Arc::new(MockMatchClient::new());
    let engine = engine_for(&client, &installed_store().await);

    assert!(
        engine
            .campaign_link(&url("https://example.web.app/?utm_source=a"))
            .await
            .is_empty()
    );
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn unresolved_campaign_is_empty() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_campaign(Ok(CampaignResponse::default()));
    let engine = engine_for(&client, &installed_store().await);

    let result = engine
        .campaign_link(&url("https://example.web.app/expired"))
        .await;

    assert!(result.is_empty());
}

#[tokio::test]
async fn server_error_becomes_campaign_error() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_campaign(Ok(CampaignResponse {
        result: None,
        error: Some("unknown campaign".into()),
    }));
    let engine = engine_for(&client, &installed_store().await);

    let result = engine
        .campaign_link(&url("https://example.web.app/nope"))
        .await;

    assert_eq!(result.url, None);
    assert_eq!(
        result.analytics,
        vec![AnalyticsEvent::CampaignError(TracebackError::Server(
            "unknown campaign".into()
        ))]
    );
}

#[tokio::test]
async fn transport_failure_becomes_campaign_error() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_campaign(Err(NetworkError::TimedOut));
    let engine = engine_for(&client, &installed_store().await);

    let result = engine
        .campaign_link(&url("https://example.web.app/summer_sale"))
        .await;

    assert_eq!(result.url, None);
    assert_eq!(
        result.analytics,
        vec![AnalyticsEvent::CampaignError(NetworkError::TimedOut.into())]
    );
}

#[tokio::test(start_paused = true)]
async fn campaign_after_search_on_same_instance_resolves() {
    let client = Arc::new(MockMatchClient::new());
    client.queue_match(None, "none", None);
    client.queue_campaign(Ok(CampaignResponse {
        result: Some(url("https://app.test/sale")),
        error: None,
    }));
    let engine = AttributionEngine::builder(config())
        .store(memory_store())
        .client(client.clone())
        .system_info(Arc::new(StaticSystemInfo(system_info())))
        .build()
        .unwrap();

    engine.post_install_search().await;
    let result = engine
        .campaign_link(&url("https://example.web.app/summer_sale"))
        .await;

    assert_eq!(result.url, Some(url("https://app.test/sale")));
    assert_eq!(engine.phase(), SearchPhase::Resolved);
}
