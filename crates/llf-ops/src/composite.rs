//! Per-pixel buffer algebra.
//!
//! Bias-128 difference signals are combined with the two "grain" operators:
//!
//! - [`grain_extract`]: `clamp(a - b + 128)`
//! - [`grain_merge`]: `clamp(a + b - 128)`
//!
//! `grain_merge(b, grain_extract(a, b)) == a` whenever the difference did
//! not clip, which is what keeps Laplacian decomposition invertible.
//!
//! # Example
//!
//! ```rust
//! use llf_core::LumaBuffer;
//! use llf_ops::composite::{grain_extract, grain_merge};
//!
//! let a = LumaBuffer::from_vec(3, 1, vec![10, 128, 250]).unwrap();
//! let b = LumaBuffer::from_vec(3, 1, vec![20, 128, 240]).unwrap();
//! let diff = grain_extract(&a, &b).unwrap();
//! assert_eq!(diff.as_slice(), &[118, 128, 138]);
//! assert_eq!(grain_merge(&b, &diff).unwrap(), a);
//! ```

use crate::OpsResult;
use llf_core::{quantize, LumaBuffer, NEUTRAL};
use rayon::prelude::*;

/// Applies `op` to corresponding samples of two same-sized buffers.
fn zip_map<F>(a: &LumaBuffer, b: &LumaBuffer, op: F) -> OpsResult<LumaBuffer>
where
    F: Fn(u8, u8) -> u8 + Sync,
{
    a.ensure_same_size(b)?;
    let data: Vec<u8> = a
        .as_slice()
        .par_iter()
        .zip(b.as_slice().par_iter())
        .map(|(&x, &y)| op(x, y))
        .collect();
    Ok(LumaBuffer::from_vec(a.width(), a.height(), data)?)
}

/// Signed difference `a - b`, stored biased by 128 and clamped.
///
/// # Errors
///
/// Fails if the buffers differ in size.
pub fn grain_extract(a: &LumaBuffer, b: &LumaBuffer) -> OpsResult<LumaBuffer> {
    zip_map(a, b, |x, y| {
        (x as i16 - y as i16 + NEUTRAL as i16).clamp(0, 255) as u8
    })
}

/// Adds a bias-128 difference `diff` back onto `base`, clamped.
///
/// # Errors
///
/// Fails if the buffers differ in size.
pub fn grain_merge(base: &LumaBuffer, diff: &LumaBuffer) -> OpsResult<LumaBuffer> {
    zip_map(base, diff, |x, y| {
        (x as i16 + y as i16 - NEUTRAL as i16).clamp(0, 255) as u8
    })
}

/// Copies `src` into `dst` wherever `key == value`.
///
/// This is the masked composite of the remapping loop: `key` is a Gaussian
/// level, `value` the reference level whose pyramid supplies `src`.
///
/// # Errors
///
/// Fails if the three buffers are not the same size.
pub fn select_where(
    dst: &mut LumaBuffer,
    src: &LumaBuffer,
    key: &LumaBuffer,
    value: u8,
) -> OpsResult<()> {
    dst.ensure_same_size(src)?;
    dst.ensure_same_size(key)?;
    dst.as_mut_slice()
        .par_iter_mut()
        .zip(src.as_slice().par_iter())
        .zip(key.as_slice().par_iter())
        .for_each(|((d, &s), &k)| {
            if k == value {
                *d = s;
            }
        });
    Ok(())
}

/// Copies `src` into `dst` wherever `covered[key]` is set.
///
/// Generalizes [`select_where`] to a set of keys; used to merge partial
/// remapping results that each own a disjoint set of reference levels.
///
/// # Errors
///
/// Fails if the three buffers are not the same size.
pub fn select_covered(
    dst: &mut LumaBuffer,
    src: &LumaBuffer,
    key: &LumaBuffer,
    covered: &[bool; 256],
) -> OpsResult<()> {
    dst.ensure_same_size(src)?;
    dst.ensure_same_size(key)?;
    dst.as_mut_slice()
        .par_iter_mut()
        .zip(src.as_slice().par_iter())
        .zip(key.as_slice().par_iter())
        .for_each(|((d, &s), &k)| {
            if covered[k as usize] {
                *d = s;
            }
        });
    Ok(())
}

/// Linear crossfade `weight * a + (1 - weight) * b`.
///
/// `weight` is clamped to `[0, 1]`.
///
/// # Errors
///
/// Fails if the buffers differ in size.
pub fn crossfade(a: &LumaBuffer, b: &LumaBuffer, weight: f32) -> OpsResult<LumaBuffer> {
    let w = weight.clamp(0.0, 1.0);
    zip_map(a, b, |x, y| quantize(w * x as f32 + (1.0 - w) * y as f32))
}
