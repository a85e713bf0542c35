//! Error types for tone-mapping operations.

use thiserror::Error;

/// Error type for tone-mapping operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffers or pyramids have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Parameter outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The progress reporter requested an abort.
    #[error("operation cancelled")]
    Cancelled,

    /// Error from a core buffer operation.
    #[error(transparent)]
    Core(#[from] llf_core::Error),
}

/// Result type for tone-mapping operations.
pub type OpsResult<T> = Result<T, OpsError>;
