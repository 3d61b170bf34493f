//! Shared building blocks for the keylock combination-lock controller.
//!
//! This crate holds the fixed dimensions of the lock (code length, slot
//! count, reference tick counts), the bounded value types that make illegal
//! slot indices and malformed codes unrepresentable, the crate-wide error
//! type and the runtime configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{KeyBindings, LockConfig, TimingConfig, ToneConfig};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
