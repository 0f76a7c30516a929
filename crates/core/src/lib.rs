//! # RVM Core
//!
//! Synchronization logic for the kiosk, free of transport details.
//!
//! This crate contains:
//! - The `KioskService` port implemented by infrastructure adapters
//! - The published state store and its loading/health bookkeeping
//! - Health monitoring, bounded scan polling and the command engine
//!
//! ## Architecture Principles
//! - Only depends on `rvm-domain`
//! - No HTTP or platform code
//! - The remote service is reached through a trait object

pub mod commands;
pub mod health;
pub mod ports;
pub mod refresh;
pub mod scan;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{CommandEngine, ScanSettings};
pub use health::HealthMonitor;
pub use ports::KioskService;
pub use refresh::refresh_status;
pub use scan::{PollSession, ScanOutcome, SessionOutcome, SessionPhase};
pub use state::{OperationGuard, StateStore};
