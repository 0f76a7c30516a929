//! Background task scheduling
//!
//! Every scheduler here follows the same lifecycle rules:
//! - Explicit `start`/`stop`
//! - Join handles for spawned tasks
//! - Cancellation token support, cancelled on drop

pub mod error;
pub mod status_poller;

pub use error::{SchedulerError, SchedulerResult};
pub use status_poller::{StatusPoller, StatusPollerConfig};
