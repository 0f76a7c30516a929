//! User-triggered commands and their reconciliation with the poll stream

pub mod engine;

pub use engine::{CommandEngine, ScanSettings};
