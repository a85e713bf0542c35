//! Error types for llf-core operations.
//!
//! # Usage
//!
//! ```rust
//! use llf_core::{Error, LumaBuffer, Result};
//!
//! fn same_grid(a: &LumaBuffer, b: &LumaBuffer) -> Result<()> {
//!     if a.dimensions() != b.dimensions() {
//!         return Err(Error::dimension_mismatch(a.dimensions(), b.dimensions()));
//!     }
//!     Ok(())
//! }
//! let a = LumaBuffer::filled(2, 2, 0)?;
//! let b = LumaBuffer::filled(3, 2, 0)?;
//! assert!(same_grid(&a, &b).is_err());
//! # Ok::<(), Error>(())
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling luminance buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Buffer dimensions don't match for the operation.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: u32,
        /// First buffer height
        a_height: u32,
        /// Second buffer width
        b_width: u32,
        /// Second buffer height
        b_height: u32,
    },

    /// Zero-sized or overflowing dimensions, or a data length that does not
    /// match them.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }
}
