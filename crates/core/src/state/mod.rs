//! Published state container

pub mod store;

pub use store::{OperationGuard, StateStore};
