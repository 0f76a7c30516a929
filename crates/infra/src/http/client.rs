use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use rvm_domain::{KioskError, Result};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("rvm-kiosk/", env!("CARGO_PKG_VERSION"));

/// HTTP client with a per-request timeout budget.
///
/// Requests are sent exactly once. The kiosk's status loop already re-asks
/// on its own cadence, so a retry here would only delay the error.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request, failing with a connectivity error once `budget`
    /// elapses.
    pub async fn send_with_timeout(
        &self,
        builder: RequestBuilder,
        budget: Duration,
    ) -> Result<Response> {
        let request = builder.timeout(budget).build().map_err(|err| {
            let infra: InfraError = err.into();
            KioskError::from(infra)
        })?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, timeout_ms = budget.as_millis() as u64, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from_transport(err, budget).into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(5) }
    }
}

impl HttpClientBuilder {
    /// Client-wide request timeout; the budget passed to
    /// [`HttpClient::send_with_timeout`] overrides it per request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let client = ReqwestClient::builder()
            .no_proxy()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|err| {
                let infra: InfraError = err.into();
                KioskError::from(infra)
            })?;

        Ok(HttpClient { client })
    }
}
