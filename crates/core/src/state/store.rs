//! Owned store for the published kiosk state
//!
//! The store is the only place the aggregate lives. Writers are the health
//! monitor, the status poller, and the command engine; every write fully
//! replaces the fields it owns, so concurrent writers resolve as
//! last-completed-write-wins. Readers either take a snapshot or subscribe to
//! a `watch` receiver that is notified only when a field changes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rvm_domain::{HealthStatus, KioskError, PublishedState, SystemStatus};
use tokio::sync::watch;
use tracing::{debug, info};

struct Inner {
    tx: watch::Sender<PublishedState>,
    /// Outstanding commands and active poll sessions. Only touched while the
    /// watch lock is held so it never disagrees with `loading`.
    outstanding: AtomicUsize,
}

/// Cheaply cloneable handle to the published state
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Inner>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store holding the pre-first-fetch placeholder state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PublishedState::default());
        Self { inner: Arc::new(Inner { tx, outstanding: AtomicUsize::new(0) }) }
    }

    /// Current value of the aggregate
    pub fn snapshot(&self) -> PublishedState {
        self.inner.tx.borrow().clone()
    }

    /// Receiver notified on every field change
    pub fn subscribe(&self) -> watch::Receiver<PublishedState> {
        self.inner.tx.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.tx.borrow().loading
    }

    /// Mark an operation as outstanding until the guard is dropped.
    ///
    /// `loading` stays true while at least one guard is alive.
    pub fn begin_operation(&self) -> OperationGuard {
        self.modify(|state, outstanding| {
            let count = outstanding.fetch_add(1, Ordering::SeqCst) + 1;
            set_if_changed(&mut state.loading, count > 0)
        });
        OperationGuard { store: self.clone() }
    }

    fn end_operation(&self) {
        self.modify(|state, outstanding| {
            let previous = outstanding.load(Ordering::SeqCst);
            let count = previous.saturating_sub(1);
            outstanding.store(count, Ordering::SeqCst);
            set_if_changed(&mut state.loading, count > 0)
        });
    }

    /// Publish a freshly fetched status.
    ///
    /// Overwrites `status` entirely and marks the service reachable.
    pub fn apply_status(&self, status: SystemStatus) {
        debug!(state = %status.state, "publishing status");
        self.modify(|state, _| {
            state.status = status;
            state.last_synced = Some(Utc::now());
            Self::mark_healthy(state);
            true
        });
    }

    /// Record a failed status fetch.
    ///
    /// Any fetch failure drops `connected`; only connectivity failures mark
    /// the service unhealthy.
    pub fn record_poll_failure(&self, error: &KioskError) {
        let message = error.to_string();
        self.modify(|state, _| {
            let mut changed = set_if_changed(&mut state.connected, false);
            changed |= set_if_changed(&mut state.connection_error, Some(message));
            if error.is_connectivity() {
                changed |= Self::transition(state, HealthStatus::Unhealthy);
            }
            changed
        });
    }

    /// Record a successful command acknowledgement
    pub fn record_command_success(&self) {
        self.modify(|state, _| {
            let mut changed = set_if_changed(&mut state.last_command_error, None);
            changed |= Self::mark_healthy(state);
            changed
        });
    }

    /// Record a failed command.
    ///
    /// The error text is always kept in `last_command_error`; connectivity
    /// failures additionally mark the service unreachable.
    pub fn record_command_failure(&self, error: &KioskError) {
        let message = error.to_string();
        self.modify(|state, _| {
            let mut changed =
                set_if_changed(&mut state.last_command_error, Some(message.clone()));
            if error.is_connectivity() {
                changed |= set_if_changed(&mut state.connected, false);
                changed |= set_if_changed(&mut state.connection_error, Some(message));
                changed |= Self::transition(state, HealthStatus::Unhealthy);
            }
            changed
        });
    }

    /// Mark the service unreachable with an operator-facing message
    pub fn mark_unreachable(&self, message: impl Into<String>) {
        let message = message.into();
        self.modify(|state, _| {
            let mut changed = set_if_changed(&mut state.connected, false);
            changed |= set_if_changed(&mut state.connection_error, Some(message));
            changed |= Self::transition(state, HealthStatus::Unhealthy);
            changed
        });
    }

    /// Mark the service reachable without publishing a status
    pub fn mark_reachable(&self) {
        self.modify(|state, _| Self::mark_healthy(state));
    }

    fn mark_healthy(state: &mut PublishedState) -> bool {
        let mut changed = set_if_changed(&mut state.connected, true);
        changed |= set_if_changed(&mut state.connection_error, None);
        changed |= Self::transition(state, HealthStatus::Healthy);
        changed
    }

    fn transition(state: &mut PublishedState, next: HealthStatus) -> bool {
        if state.health == next {
            return false;
        }
        info!(previous_status = %state.health, new_status = %next, "remote health changed");
        state.health = next;
        true
    }

    fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut PublishedState, &AtomicUsize) -> bool,
    {
        let outstanding = &self.inner.outstanding;
        self.inner.tx.send_if_modified(|state| f(state, outstanding));
    }
}

/// Keeps `loading` raised for as long as it lives
#[must_use = "loading is cleared as soon as the guard is dropped"]
pub struct OperationGuard {
    store: StateStore,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.store.end_operation();
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
