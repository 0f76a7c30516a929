//! # RVM Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed detection service client
//! - Configuration loading (file + environment)
//! - The background status poller
//!
//! ## Architecture
//! - Implements traits defined in `rvm-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod config;
pub mod errors;
pub mod http;
pub mod remote;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use remote::KioskClient;
pub use scheduling::{SchedulerError, SchedulerResult, StatusPoller, StatusPollerConfig};
