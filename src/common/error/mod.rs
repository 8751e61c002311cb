//! Unified error types for resconv.
//!
//! This module provides a single error type shared by the container readers
//! and the image decoders, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
