//! # llf-ops
//!
//! Local Laplacian tone mapping of 8-bit luminance buffers.
//!
//! The operator redistributes local contrast: fine texture (detail) and
//! large brightness transitions (edges) are attenuated or amplified
//! independently, without the halos of single-scale local operators.
//!
//! # Pipeline
//!
//! 1. [`GaussianPyramid::build`] decomposes the input.
//! 2. For every reference level of the contrast [`Window`], a
//!    [`ToneCurve`] remaps the input and the result is decomposed with
//!    [`laplacian::to_laplacian`].
//! 3. [`RemappingEngine`] keeps, per pixel, the level of the pyramid whose
//!    reference matches that pixel's Gaussian value.
//! 4. [`LaplacianPyramid::collapse`] reconstructs the pass; its change
//!    against the unremapped collapse is stretched back to full range and
//!    applied to the input.
//! 5. In normal-contrast mode [`ContrastBlender`] weights a full-range and
//!    a compressed pass per level, collapses them separately and
//!    grain-merges the results.
//!
//! [`ToneMapper`] wires the stages together.
//!
//! # Example
//!
//! ```rust
//! use llf_core::LumaBuffer;
//! use llf_ops::{tonemap, Mode, ToneMapParams};
//!
//! let src = LumaBuffer::from_fn(32, 32, |x, _| if x < 16 { 50 } else { 200 }).unwrap();
//! let params = ToneMapParams {
//!     mode: Mode::Preview,
//!     edge_strength: -50,
//!     detail_edge_threshold: 100,
//!     ..ToneMapParams::default()
//! };
//! let out = tonemap(&src, &params).unwrap();
//! assert_eq!(out.dimensions(), (32, 32));
//! ```
//!
//! [`ToneMapParams`] and [`Mode`] implement `Serialize`/`Deserialize`, so
//! parameter sets can be stored as presets.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod blend;
pub mod composite;
pub mod interp;
pub mod laplacian;
pub mod levels;
pub mod progress;
pub mod pyramid;
pub mod remap;
pub mod resample;
pub mod tone_curve;
pub mod tonemap;
pub mod value;

pub use blend::ContrastBlender;
pub use error::{OpsError, OpsResult};
pub use laplacian::LaplacianPyramid;
pub use levels::Window;
pub use progress::{CancelToken, NoProgress, Progress};
pub use pyramid::{GaussianPyramid, Pyramid, DEFAULT_MIN_SIZE};
pub use remap::{RemapOutput, RemappingEngine};
pub use tone_curve::{CurveParams, ToneCurve};
pub use tonemap::{tonemap, Adjustment, Mode, ToneMapParams, ToneMapper};
