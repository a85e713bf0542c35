//! Multiresolution pyramids.
//!
//! A [`Pyramid`] is an ordered list of [`LumaBuffer`] levels: level 0 is the
//! full-resolution input, and every following level is
//! `ceil(w / 2) x ceil(h / 2)` of the previous one.
//!
//! The pyramid's state is part of its type. A [`GaussianPyramid`] holds
//! direct intensities; a [`LaplacianPyramid`](crate::LaplacianPyramid) holds
//! bias-128 band-pass differences on every level but the coarsest. The two
//! cannot be mixed by accident:
//!
//! ```rust,compile_fail
//! use llf_core::LumaBuffer;
//! use llf_ops::{GaussianPyramid, LaplacianPyramid};
//!
//! let g = GaussianPyramid::build(LumaBuffer::filled(8, 8, 0).unwrap(), 2).unwrap();
//! let l: LaplacianPyramid = g; // mismatched types
//! ```
//!
//! # Example
//!
//! ```rust
//! use llf_core::LumaBuffer;
//! use llf_ops::GaussianPyramid;
//!
//! let src = LumaBuffer::filled(16, 8, 100).unwrap();
//! let pyr = GaussianPyramid::build(src, 2).unwrap();
//! assert_eq!(pyr.level_count(), 2);
//! assert_eq!(pyr.coarsest().dimensions(), (8, 4));
//! ```

use crate::resample::{downsample, half_size};
use crate::{OpsError, OpsResult};
use llf_core::LumaBuffer;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Default stop size: levels are produced while both sides stay above 2.
pub const DEFAULT_MIN_SIZE: u32 = 2;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Gaussian {}
    impl Sealed for super::Laplacian {}
}

/// Content state of a pyramid.
///
/// Sealed: only [`Gaussian`] and [`Laplacian`] exist.
pub trait PyramidKind:
    sealed::Sealed + Copy + Clone + Default + Send + Sync + fmt::Debug + 'static
{
    /// Name used in logs.
    const NAME: &'static str;
}

/// Levels hold blurred, downsampled intensities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gaussian;

/// Levels hold bias-128 differences; the coarsest level holds intensities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Laplacian;

impl PyramidKind for Gaussian {
    const NAME: &'static str = "gaussian";
}

impl PyramidKind for Laplacian {
    const NAME: &'static str = "laplacian";
}

/// Ordered sequence of half-resolution levels, finest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pyramid<K: PyramidKind> {
    levels: Vec<LumaBuffer>,
    _kind: PhantomData<K>,
}

/// Pyramid of direct intensities.
pub type GaussianPyramid = Pyramid<Gaussian>;

impl<K: PyramidKind> Pyramid<K> {
    /// Wraps pre-built levels.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidDimensions`] if `levels` is empty or a
    /// level is not the half size of its predecessor.
    pub fn from_levels(levels: Vec<LumaBuffer>) -> OpsResult<Self> {
        if levels.is_empty() {
            return Err(OpsError::InvalidDimensions("pyramid needs at least one level".into()));
        }
        for (k, pair) in levels.windows(2).enumerate() {
            let expected = half_size(pair[0].width(), pair[0].height());
            if pair[1].dimensions() != expected {
                return Err(OpsError::InvalidDimensions(format!(
                    "level {} is {}x{}, expected {}x{}",
                    k + 1,
                    pair[1].width(),
                    pair[1].height(),
                    expected.0,
                    expected.1
                )));
            }
        }
        Ok(Self::from_levels_unchecked(levels))
    }

    pub(crate) fn from_levels_unchecked(levels: Vec<LumaBuffer>) -> Self {
        Self {
            levels,
            _kind: PhantomData,
        }
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [LumaBuffer] {
        &mut self.levels
    }

    /// Number of levels (always >= 1).
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Level `k`, 0 being the finest.
    ///
    /// # Panics
    ///
    /// Panics if `k >= level_count()`.
    #[inline]
    pub fn level(&self, k: usize) -> &LumaBuffer {
        &self.levels[k]
    }

    /// All levels, finest first.
    #[inline]
    pub fn levels(&self) -> &[LumaBuffer] {
        &self.levels
    }

    /// Full-resolution level.
    #[inline]
    pub fn finest(&self) -> &LumaBuffer {
        &self.levels[0]
    }

    /// Lowest-resolution level.
    #[inline]
    pub fn coarsest(&self) -> &LumaBuffer {
        &self.levels[self.levels.len() - 1]
    }

    /// Every level except the coarsest.
    #[inline]
    pub fn detail_levels(&self) -> &[LumaBuffer] {
        &self.levels[..self.levels.len() - 1]
    }

    /// Full-resolution `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.finest().dimensions()
    }

    /// Returns `true` if both pyramids have the same level sizes.
    pub fn same_shape<J: PyramidKind>(&self, other: &Pyramid<J>) -> bool {
        self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.same_size(b))
    }

    /// Consumes the pyramid, returning its levels.
    pub fn into_levels(self) -> Vec<LumaBuffer> {
        self.levels
    }

    /// Iterates levels, finest first.
    pub fn iter(&self) -> std::slice::Iter<'_, LumaBuffer> {
        self.levels.iter()
    }
}

impl Pyramid<Gaussian> {
    /// Builds a Gaussian pyramid, taking ownership of `buffer` as level 0.
    ///
    /// Halving continues while both next dimensions stay above `min_size`,
    /// so a buffer with a side of `2 * min_size` or less gives a single
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `min_size` is 0.
    pub fn build(buffer: LumaBuffer, min_size: u32) -> OpsResult<Self> {
        check_min_size(min_size)?;
        let (width, height) = buffer.dimensions();
        let mut levels = vec![buffer];
        loop {
            let last = &levels[levels.len() - 1];
            let (w, h) = half_size(last.width(), last.height());
            if w <= min_size || h <= min_size {
                break;
            }
            let next = downsample(last)?;
            levels.push(next);
        }
        debug!(
            kind = Gaussian::NAME,
            width,
            height,
            levels = levels.len(),
            "Pyramid built"
        );
        Ok(Self::from_levels_unchecked(levels))
    }

    /// Number of levels [`build`](Self::build) produces for a given size.
    ///
    /// # Errors
    ///
    /// Rejects `min_size = 0` like [`build`](Self::build).
    pub fn level_count_for(width: u32, height: u32, min_size: u32) -> OpsResult<usize> {
        check_min_size(min_size)?;
        let (mut w, mut h) = (width, height);
        let mut count = 1;
        loop {
            (w, h) = half_size(w, h);
            if w <= min_size || h <= min_size {
                return Ok(count);
            }
            count += 1;
        }
    }

    /// Collapses to full resolution.
    ///
    /// Every coarser level is a blurred copy of the finer one, so the
    /// upsampled coarse level is replaced outright and the result is the
    /// finest level.
    pub fn collapse(&self) -> LumaBuffer {
        self.finest().clone()
    }
}

fn check_min_size(min_size: u32) -> OpsResult<()> {
    if min_size == 0 {
        return Err(OpsError::InvalidParameter("pyramid min_size must be >= 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_sizes() {
        let src = LumaBuffer::filled(37, 21, 0).unwrap();
        let pyr = GaussianPyramid::build(src, DEFAULT_MIN_SIZE).unwrap();
        let dims: Vec<_> = pyr.iter().map(|l| l.dimensions()).collect();
        assert_eq!(dims, vec![(37, 21), (19, 11), (10, 6), (5, 3)]);
        assert_eq!(GaussianPyramid::level_count_for(37, 21, DEFAULT_MIN_SIZE).unwrap(), 4);
    }

    #[test]
    fn test_small_input_single_level() {
        for (w, h) in [(1, 1), (4, 4), (100, 3), (2, 50)] {
            let pyr = GaussianPyramid::build(LumaBuffer::filled(w, h, 7).unwrap(), 2).unwrap();
            assert_eq!(pyr.level_count(), 1, "{w}x{h}");
            assert_eq!(pyr.collapse(), *pyr.finest());
        }
    }

    #[test]
    fn test_zero_min_size_rejected() {
        let src = LumaBuffer::filled(4, 4, 0).unwrap();
        assert!(matches!(
            GaussianPyramid::build(src, 0),
            Err(OpsError::InvalidParameter(_))
        ));
        assert!(matches!(
            GaussianPyramid::level_count_for(4, 4, 0),
            Err(OpsError::InvalidParameter(_))
        ));
        assert_eq!(GaussianPyramid::level_count_for(4, 4, 1).unwrap(), 2);
        assert_eq!(GaussianPyramid::level_count_for(4, 4, 2).unwrap(), 1);
    }

    #[test]
    fn test_level_zero_is_input() {
        let src = LumaBuffer::from_fn(24, 24, |x, y| (x * 10 + y) as u8).unwrap();
        let pyr = GaussianPyramid::build(src.clone(), 2).unwrap();
        assert_eq!(pyr.finest(), &src);
        assert_eq!(pyr.collapse(), src);
    }

    #[test]
    fn test_from_levels_validates_sizes() {
        let a = LumaBuffer::filled(8, 8, 0).unwrap();
        let b = LumaBuffer::filled(4, 4, 0).unwrap();
        let bad = LumaBuffer::filled(3, 4, 0).unwrap();
        assert!(GaussianPyramid::from_levels(vec![a.clone(), b]).is_ok());
        assert!(GaussianPyramid::from_levels(vec![a, bad]).is_err());
        assert!(GaussianPyramid::from_levels(vec![]).is_err());
    }
}
