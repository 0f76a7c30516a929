//! Remote service health classification

pub mod monitor;

pub use monitor::HealthMonitor;
