//! # RVM Domain
//!
//! Domain types for the reverse vending machine kiosk.
//!
//! This crate contains:
//! - Remote status model (`SystemStatus`, `ScanState`)
//! - Published state aggregate consumed by presentation layers
//! - Error types and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other RVM crates
//! - Pure data, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
