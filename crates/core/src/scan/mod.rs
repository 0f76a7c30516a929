//! Bounded scan polling

pub mod session;

pub use session::{PollSession, ScanOutcome, SessionOutcome, SessionPhase};
