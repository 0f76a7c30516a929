//! Shared fixtures for kiosk integration tests

#![allow(dead_code)]

use std::time::Duration;

use rvm_domain::{KioskConfig, PublishedState};
use rvm_kiosk::KioskContext;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at `server` with a background poller slow enough to stay
/// out of scripted status sequences and a fast scan poll.
pub fn config_for(server: &MockServer) -> KioskConfig {
    let mut config = KioskConfig::default();
    config.api.base_url = server.uri();
    config.polling.status_interval_ms = 60_000;
    config.polling.scan_interval_ms = 20;
    config
}

pub fn status_body(state: &str) -> Value {
    json!({
        "state": state,
        "item_detected": null,
        "confidence": null,
        "error_message": null
    })
}

pub async fn mount_health(server: &MockServer, code: u16) {
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(code).set_body_json(json!({"status": "healthy"})))
        .mount(server)
        .await;
}

/// Mount a `/api/status` response served `times` times (forever if `None`).
pub async fn mount_status(server: &MockServer, body: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

pub async fn requests_to(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == endpoint)
        .count()
}

/// Wait until the published state satisfies `predicate`.
pub async fn wait_for<F>(ctx: &KioskContext, predicate: F) -> PublishedState
where
    F: FnMut(&PublishedState) -> bool,
{
    let mut updates = ctx.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(predicate))
        .await
        .expect("state condition not reached in time")
        .expect("state store closed")
        .clone();
    state
}
