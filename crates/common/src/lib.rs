//! Montage Common Utilities
//!
//! Shared infrastructure for all Montage crates:
//! - Error types and result aliases
//! - Editor configuration and the centralized drift policy
//! - Clock utilities for tick measurement and emission throttling
//! - Tracing/logging initialization

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
