//! Unified error types for resconv.
//!
//! Every decoder in this crate reports failures through one error type. There
//! is no warn-and-continue path: a violated invariant aborts the decode.
use thiserror::Error;

/// Main error type for resconv operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer ended before a read could complete
    #[error("Truncated data: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// Malformed container: forbidden field value, bad length prefix, bad magic
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Legitimate format feature this crate does not decode
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// A color table has no entry for an indexed pixel value
    #[error("No color with id {0}")]
    MissingColor(u16),

    /// Export requested for a picture that cannot be projected to a raster
    #[error("Export error: {0}")]
    Export(String),

    /// Resource type, resource id, or container entry not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// The image sink failed to encode
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for resconv operations.
pub type Result<T> = std::result::Result<T, Error>;
