//! Common types, traits, and utilities shared across formats.
//!
//! Error handling, big-endian binary reading, and MacRoman text decoding used
//! by both the container readers and the image decoders.

// Submodule declarations
pub mod binary;
pub mod encoding;
pub mod error;

// Re-exports for convenience
pub use binary::BeReader;
pub use error::{Error, Result};
