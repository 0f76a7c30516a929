//! Domain types and models

pub mod actuator;
pub mod state;
pub mod status;

pub use actuator::{ActuatorHardwareStatus, ActuatorReport};
pub use state::{ConnectionHealth, HealthStatus, PublishedState};
pub use status::{ScanState, SystemStatus};
