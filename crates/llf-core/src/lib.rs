//! # llf-core
//!
//! Core types for local Laplacian tone mapping.
//!
//! This crate provides the foundational types used throughout the llf-rs workspace:
//!
//! - [`LumaBuffer`] - Owned single-channel 8-bit intensity grid
//! - [`Rect`] - Rectangular selection in image space
//! - [`Error`] / [`Result`] - Core error handling
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other llf-rs crates depend
//! on `llf-core`:
//!
//! ```text
//! llf-core (this crate)
//!    ^
//!    |
//!    +-- llf-io  (PNG/JPEG I/O)
//!    +-- llf-ops (pyramids, tone curves, remapping)
//!    +-- llf-cli (command line front-end)
//! ```
//!
//! ## Value Range
//!
//! Every buffer holds intensities in `[0, 255]`. Arithmetic is done in `f32`
//! and brought back with [`quantize`], which rounds to nearest and clamps.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod rect;

pub use buffer::{quantize, LumaBuffer, NEUTRAL};
pub use error::{Error, Result};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// ```
/// use llf_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{quantize, LumaBuffer, NEUTRAL};
    pub use crate::error::{Error, Result};
    pub use crate::rect::Rect;
}
