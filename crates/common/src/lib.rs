//! Rowcast Common Utilities
//!
//! Shared infrastructure for all Rowcast crates:
//! - Error types and result aliases
//! - Conversion clock and progress rate limiting
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
