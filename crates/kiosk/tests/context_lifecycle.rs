//! Integration tests for KioskContext startup, health and teardown

mod common;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use common::{config_for, mount_health, mount_status, requests_to, status_body, wait_for};
use rvm_core::ScanOutcome;
use rvm_domain::{HealthStatus, KioskConfig, KioskError, ScanState};
use rvm_kiosk::KioskContext;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn healthy_startup_fetches_initial_status() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_status(&server, status_body("idle"), None).await;

    let ctx = KioskContext::new(config_for(&server)).await.unwrap();

    let state = ctx.snapshot();
    assert!(state.connected);
    assert_eq!(state.health, HealthStatus::Healthy);
    assert_eq!(state.status.state, ScanState::Idle);
    assert!(state.last_synced.is_some());
    assert!(ctx.is_polling().await);

    ctx.shutdown().await.unwrap();
    assert!(!ctx.is_polling().await);
}

/// Probe fails: disconnected right after startup, no tick needed.
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_service_is_reported_immediately() {
    let base_url = closed_port_url();
    let mut config = KioskConfig::default();
    config.api.base_url = base_url.clone();

    let ctx = KioskContext::new(config).await.unwrap();

    let state = ctx.snapshot();
    assert!(!state.connected);
    assert_eq!(state.health, HealthStatus::Unhealthy);
    let message = state.connection_error.unwrap();
    assert!(message.contains(&base_url), "{message}");
    assert!(message.contains("RVM_API_URL"), "{message}");
    assert!(state.last_synced.is_none());

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_probe_recovers_on_first_good_tick() {
    let server = MockServer::start().await;
    mount_health(&server, 503).await;
    mount_status(&server, status_body("idle"), None).await;

    let mut config = config_for(&server);
    config.polling.status_interval_ms = 100;
    let ctx = KioskContext::new(config).await.unwrap();
    assert!(!ctx.snapshot().connected);

    let state = wait_for(&ctx, |s| s.connected).await;

    assert_eq!(state.health, HealthStatus::Healthy);
    assert!(state.connection_error.is_none());

    ctx.shutdown().await.unwrap();
}

/// A tick that times out drops the connection, the next one restores it.
#[tokio::test(flavor = "multi_thread")]
async fn poller_survives_a_failed_tick() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_status(&server, status_body("idle"), Some(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("idle"))
                .set_delay(Duration::from_millis(800)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, status_body("idle"), None).await;

    let mut config = config_for(&server);
    config.polling.status_interval_ms = 100;
    config.api.timeouts.status_ms = 100;
    let ctx = KioskContext::new(config).await.unwrap();
    assert!(ctx.snapshot().connected);

    let offline = wait_for(&ctx, |s| !s.connected).await;
    assert!(!offline.connection_error.unwrap_or_default().is_empty());
    assert_eq!(offline.health, HealthStatus::Unhealthy);

    let online = wait_for(&ctx, |s| s.connected).await;
    assert!(online.connection_error.is_none());
    assert_eq!(online.health, HealthStatus::Healthy);

    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_background_polling() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_status(&server, status_body("idle"), None).await;

    let mut config = config_for(&server);
    config.polling.status_interval_ms = 50;
    let ctx = KioskContext::new(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    ctx.shutdown().await.unwrap();
    let after_shutdown = requests_to(&server, "/api/status").await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(requests_to(&server, "/api/status").await, after_shutdown);
    // Second shutdown is a no-op
    ctx.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_cancels_active_scan() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_status(&server, status_body("idle"), Some(1)).await;
    mount_status(&server, status_body("scanning"), None).await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("scanning")))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.polling.scan_max_attempts = 10_000;
    let ctx = Arc::new(KioskContext::new(config).await.unwrap());

    let scan = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.scan().await }
    });
    wait_for(&ctx, |s| s.loading && s.status.state == ScanState::Scanning).await;

    ctx.shutdown().await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), scan).await.unwrap().unwrap();
    assert_eq!(outcome, Ok(ScanOutcome::Cancelled));
    assert!(!ctx.snapshot().loading);
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_scan_is_rejected() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_status(&server, status_body("idle"), Some(1)).await;
    mount_status(&server, status_body("scanning"), None).await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("scanning")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.polling.scan_max_attempts = 10_000;
    let ctx = Arc::new(KioskContext::new(config).await.unwrap());

    let first = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.scan().await }
    });
    wait_for(&ctx, |s| s.loading).await;

    assert_eq!(ctx.scan().await, Err(KioskError::ScanInProgress));

    ctx.shutdown().await.unwrap();
    assert_eq!(first.await.unwrap(), Ok(ScanOutcome::Cancelled));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_base_url_fails_construction() {
    let mut config = KioskConfig::default();
    config.api.base_url = "ftp://rvm.local".into();

    let result = KioskContext::new(config).await;

    assert!(matches!(result, Err(KioskError::Config(_))));
}
