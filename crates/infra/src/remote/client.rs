//! Detection service client
//!
//! Implements [`KioskService`] over the service's JSON/HTTP API. Every
//! operation has its own timeout budget from [`TimeoutConfig`]; nothing is
//! retried here because `confirm` and the actuator trigger move hardware.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use rvm_core::KioskService;
use rvm_domain::constants::{
    PATH_CONFIRM, PATH_HEALTH, PATH_INVALID_ITEM_REMOVED, PATH_RESET, PATH_SCAN, PATH_STATUS,
    PATH_TRIGGER_ACTUATOR,
};
use rvm_domain::{ActuatorReport, ApiConfig, KioskError, Result, SystemStatus, TimeoutConfig};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// reqwest-backed [`KioskService`]
#[derive(Clone)]
pub struct KioskClient {
    http: HttpClient,
    base_url: String,
    timeouts: TimeoutConfig,
}

impl KioskClient {
    /// Build a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if the base URL is not an absolute
    /// http(s) URL, or if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = HttpClient::builder().timeout(config.timeouts.status()).build()?;
        Ok(Self { http, base_url, timeouts: config.timeouts.clone() })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call(&self, method: Method, path: &str, budget: Duration) -> Result<Response> {
        let request = self.http.request(method, self.url(path));
        let response = self.http.send_with_timeout(request, budget).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|err| {
                warn!(path, status = status.as_u16(), error = %err, "Error body unreadable");
                format!("<body unreadable: {err}>")
            });
            warn!(path, status = status.as_u16(), body = %body, "Service returned error status");
            return Err(KioskError::Remote { code: status.as_u16(), body });
        }

        Ok(response)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        budget: Duration,
    ) -> Result<T> {
        let response = self.call(method, path, budget).await?;
        let body = response.text().await.map_err(|err| {
            let infra = InfraError::from_transport(err, budget);
            KioskError::from(infra)
        })?;

        serde_json::from_str(&body).map_err(|err| {
            debug!(path, body = %body, "Undecodable response body");
            KioskError::from(InfraError::from(err))
        })
    }
}

#[async_trait]
impl KioskService for KioskClient {
    #[instrument(skip(self))]
    async fn get_status(&self) -> Result<SystemStatus> {
        self.call_json(Method::GET, PATH_STATUS, self.timeouts.status()).await
    }

    #[instrument(skip(self))]
    async fn start_scan(&self) -> Result<SystemStatus> {
        self.call_json(Method::POST, PATH_SCAN, self.timeouts.scan()).await
    }

    #[instrument(skip(self))]
    async fn confirm(&self) -> Result<SystemStatus> {
        self.call_json(Method::POST, PATH_CONFIRM, self.timeouts.confirm()).await
    }

    #[instrument(skip(self))]
    async fn reject_invalid_item(&self) -> Result<SystemStatus> {
        self.call_json(Method::POST, PATH_INVALID_ITEM_REMOVED, self.timeouts.reject()).await
    }

    #[instrument(skip(self))]
    async fn reset(&self) -> Result<SystemStatus> {
        self.call_json(Method::POST, PATH_RESET, self.timeouts.reset()).await
    }

    #[instrument(skip(self))]
    async fn probe_health(&self) -> bool {
        match self.call(Method::GET, PATH_HEALTH, self.timeouts.health()).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "Health probe failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn trigger_actuator(&self) -> Result<ActuatorReport> {
        self.call_json(Method::POST, PATH_TRIGGER_ACTUATOR, self.timeouts.actuator()).await
    }
}

/// Validate the base URL and strip any trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|err| KioskError::Config(format!("invalid base URL '{trimmed}': {err}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.trim_end_matches('/').to_string()),
        other => Err(KioskError::Config(format!(
            "base URL '{trimmed}' must use http or https, not '{other}'"
        ))),
    }
}
