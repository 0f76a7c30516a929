//! Configuration loading
//!
//! Layers built-in defaults, an optional config file and environment
//! overrides into a validated [`rvm_domain::KioskConfig`].

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_file, load_with, probe_config_paths};
