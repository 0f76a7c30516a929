//! # RVM Kiosk
//!
//! Application layer for the reverse vending machine kiosk.
//!
//! This crate contains:
//! - `KioskContext`, which wires the client, state store, health monitor,
//!   status poller and command engine together
//! - Logging setup and the console front end used by the binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Owns every background task it starts and releases them on shutdown

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::KioskContext;
