//! Single status fetch shared by the poller, the health monitor and the
//! command engine

use rvm_domain::{Result, SystemStatus};

use crate::ports::KioskService;
use crate::state::StateStore;

/// Fetch the remote status once and publish the outcome.
///
/// Success overwrites the published status; failure drops `connected` and
/// records the error text.
pub async fn refresh_status(service: &dyn KioskService, store: &StateStore) -> Result<SystemStatus> {
    match service.get_status().await {
        Ok(status) => {
            store.apply_status(status.clone());
            Ok(status)
        }
        Err(err) => {
            store.record_poll_failure(&err);
            Err(err)
        }
    }
}
