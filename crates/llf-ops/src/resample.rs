//! Separable linear resampling of luminance buffers.
//!
//! One kernel is used everywhere so that pyramid construction and collapse
//! stay exact inverses of each other:
//!
//! - Pixel centres map with `(x + 0.5) * scale - 0.5`.
//! - The kernel is a triangle (tent) whose support is widened by the scale
//!   factor when reducing. An exact 2:1 reduction is therefore the
//!   `[1, 3, 3, 1] / 8` binomial filter; enlarging is plain bilinear
//!   interpolation.
//! - Taps that fall outside the source are dropped and the remaining
//!   weights renormalised, so constant images stay constant.
//! - Both passes run in `f32`; the result is rounded once with
//!   [`quantize`].
//!
//! ```rust
//! use llf_core::LumaBuffer;
//! use llf_ops::resample::{downsample, upsample};
//!
//! let src = LumaBuffer::filled(5, 3, 90).unwrap();
//! let half = downsample(&src).unwrap();
//! assert_eq!(half.dimensions(), (3, 2));
//! let back = upsample(&half, 5, 3).unwrap();
//! assert!(back.as_slice().iter().all(|&v| v == 90));
//! ```

use crate::{OpsError, OpsResult};
use llf_core::{quantize, LumaBuffer};
use rayon::prelude::*;

/// Dimensions of the next coarser pyramid level: `ceil(w / 2) x ceil(h / 2)`.
#[inline]
pub fn half_size(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(2), height.div_ceil(2))
}

/// Triangle kernel.
#[inline]
fn tent(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Source taps and normalised weights for one destination sample.
#[derive(Debug, Clone)]
struct Taps {
    first: usize,
    weights: Vec<f32>,
}

fn compute_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let support = scale.max(1.0);

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let left = (center - support).floor().max(0.0) as usize;
            let right = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

            let mut weights: Vec<f32> = (left..=right)
                .map(|s| tent((s as f32 - center) / support))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum > 0.0 {
                weights.iter_mut().for_each(|w| *w /= sum);
            }
            Taps { first: left, weights }
        })
        .collect()
}

/// Resamples `src` to `dst_w x dst_h`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] if either target dimension is 0.
pub fn resample(src: &LumaBuffer, dst_w: u32, dst_h: u32) -> OpsResult<LumaBuffer> {
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    if src.dimensions() == (dst_w, dst_h) {
        return Ok(src.clone());
    }

    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let dst_w = dst_w as usize;
    let dst_h = dst_h as usize;

    // Horizontal pass: src_w x src_h -> dst_w x src_h
    let h_taps = compute_taps(src_w, dst_w);
    let mut temp = vec![0.0f32; dst_w * src_h];
    temp.par_chunks_mut(dst_w)
        .zip(src.as_slice().par_chunks(src_w))
        .for_each(|(out, row)| {
            for (x, taps) in h_taps.iter().enumerate() {
                out[x] = taps
                    .weights
                    .iter()
                    .zip(&row[taps.first..])
                    .map(|(w, &v)| w * v as f32)
                    .sum();
            }
        });

    // Vertical pass: dst_w x src_h -> dst_w x dst_h
    let v_taps = compute_taps(src_h, dst_h);
    let mut dst = vec![0u8; dst_w * dst_h];
    dst.par_chunks_mut(dst_w)
        .zip(v_taps.par_iter())
        .for_each(|(out, taps)| {
            for (x, px) in out.iter_mut().enumerate() {
                let sum: f32 = taps
                    .weights
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * temp[(taps.first + k) * dst_w + x])
                    .sum();
                *px = quantize(sum);
            }
        });

    Ok(LumaBuffer::from_vec(dst_w as u32, dst_h as u32, dst)?)
}

/// Halves a buffer with the tent filter (ceil rounding of odd sizes).
pub fn downsample(src: &LumaBuffer) -> OpsResult<LumaBuffer> {
    let (w, h) = half_size(src.width(), src.height());
    resample(src, w, h)
}

/// Enlarges a coarser level to `width x height` with bilinear interpolation.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] if either target dimension is 0.
pub fn upsample(src: &LumaBuffer, width: u32, height: u32) -> OpsResult<LumaBuffer> {
    resample(src, width, height)
}
