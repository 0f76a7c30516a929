//! Startup health monitor
//!
//! Classifies the remote service as reachable or not before the first status
//! is shown. After startup the classification is kept current by the
//! outcome of every poll and command (see [`crate::state::StateStore`]), so
//! the monitor itself only runs on demand.

use std::sync::Arc;

use rvm_domain::constants::API_URL_ENV;
use rvm_domain::HealthStatus;
use tracing::{info, instrument, warn};

use crate::ports::KioskService;
use crate::refresh::refresh_status;
use crate::state::StateStore;

/// Health monitor with `Unknown -> {Healthy, Unhealthy}` transitions
pub struct HealthMonitor {
    service: Arc<dyn KioskService>,
    store: StateStore,
    endpoint: String,
}

impl HealthMonitor {
    /// Create a monitor for the service reachable at `endpoint`.
    ///
    /// `endpoint` only feeds the operator-facing error text.
    pub fn new(
        service: Arc<dyn KioskService>,
        store: StateStore,
        endpoint: impl Into<String>,
    ) -> Self {
        Self { service, store, endpoint: endpoint.into() }
    }

    /// Probe once at startup.
    ///
    /// A healthy service gets an immediate status fetch; an unhealthy one is
    /// published as disconnected with an actionable message and no fetch is
    /// attempted.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn initialize(&self) -> HealthStatus {
        if self.service.probe_health().await {
            info!("Remote service healthy, fetching initial status");
            if let Err(err) = refresh_status(self.service.as_ref(), &self.store).await {
                warn!(error = %err, "Initial status fetch failed");
            }
        } else {
            warn!("Remote service is not responding");
            self.store.mark_unreachable(self.unreachable_message());
        }
        self.store.snapshot().health
    }

    /// Re-probe on demand without fetching status
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn probe(&self) -> bool {
        let healthy = self.service.probe_health().await;
        if healthy {
            self.store.mark_reachable();
        } else {
            self.store.mark_unreachable(self.unreachable_message());
        }
        healthy
    }

    /// Operator-facing text published while the service is unreachable
    pub fn unreachable_message(&self) -> String {
        format!(
            "Detection service at {} is not responding. Start the backend service or point {} at \
             the right address.",
            self.endpoint, API_URL_ENV
        )
    }
}
