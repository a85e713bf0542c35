//! Laplacian (band-pass) decomposition and its inverse.
//!
//! Every level but the coarsest stores `fine - upsample(coarse) + 128`,
//! clamped to `[0, 255]`. The coarsest level keeps plain intensities.
//! Collapsing runs coarse to fine with
//! `fine = clamp(upsample(coarse) + stored - 128)`, which undoes the
//! decomposition exactly unless a difference clipped.

use crate::composite::{grain_extract, grain_merge};
use crate::pyramid::{Gaussian, Laplacian, Pyramid, PyramidKind};
use crate::resample::upsample;
use crate::{OpsError, OpsResult};
use llf_core::{LumaBuffer, NEUTRAL};
use tracing::trace;

/// Pyramid of bias-128 band-pass differences.
pub type LaplacianPyramid = Pyramid<Laplacian>;

/// Converts a Gaussian pyramid into its Laplacian pyramid.
///
/// ```rust
/// use llf_core::LumaBuffer;
/// use llf_ops::{laplacian::to_laplacian, GaussianPyramid};
///
/// let src = LumaBuffer::from_fn(32, 32, |x, y| (4 * x + 2 * y) as u8).unwrap();
/// let lap = to_laplacian(&GaussianPyramid::build(src.clone(), 2).unwrap()).unwrap();
/// assert_eq!(lap.collapse().unwrap(), src);
/// ```
///
/// # Errors
///
/// Propagates resampling errors; none occur for pyramids built with
/// [`GaussianPyramid::build`](crate::GaussianPyramid::build).
pub fn to_laplacian(gaussian: &Pyramid<Gaussian>) -> OpsResult<LaplacianPyramid> {
    let levels = gaussian.levels();
    let mut out = Vec::with_capacity(levels.len());
    for pair in levels.windows(2) {
        let (fine, coarse) = (&pair[0], &pair[1]);
        let expanded = upsample(coarse, fine.width(), fine.height())?;
        out.push(grain_extract(fine, &expanded)?);
    }
    out.push(gaussian.coarsest().clone());
    trace!(levels = out.len(), kind = Laplacian::NAME, "Converted pyramid");
    Ok(Pyramid::from_levels_unchecked(out))
}

impl Pyramid<Laplacian> {
    /// Builds the Laplacian pyramid of `gaussian`; see [`to_laplacian`].
    pub fn from_gaussian(gaussian: &Pyramid<Gaussian>) -> OpsResult<Self> {
        to_laplacian(gaussian)
    }

    /// Laplacian pyramid with the shape of `gaussian`: every detail level
    /// holds the neutral difference 128, the coarsest level is a copy of
    /// the Gaussian residual.
    ///
    /// Collapsing it yields the upsampled residual.
    pub fn neutral_like(gaussian: &Pyramid<Gaussian>) -> Self {
        let mut levels: Vec<LumaBuffer> = gaussian
            .detail_levels()
            .iter()
            .map(|l| {
                let mut n = l.clone();
                n.as_mut_slice().fill(NEUTRAL);
                n
            })
            .collect();
        levels.push(gaussian.coarsest().clone());
        Pyramid::from_levels_unchecked(levels)
    }

    /// Replaces the detail level `k`.
    ///
    /// # Errors
    ///
    /// Fails if `k` is not a detail level or `level` does not match the
    /// size of the level it replaces.
    pub fn set_detail_level(&mut self, k: usize, level: LumaBuffer) -> OpsResult<()> {
        if k + 1 >= self.level_count() {
            return Err(OpsError::InvalidParameter(format!(
                "level {} is not a detail level of a {}-level pyramid",
                k,
                self.level_count()
            )));
        }
        self.levels_mut()[k].ensure_same_size(&level)?;
        self.levels_mut()[k] = level;
        Ok(())
    }

    /// Reconstructs the full-resolution buffer.
    ///
    /// # Errors
    ///
    /// Propagates resampling errors; none occur for well-formed pyramids.
    pub fn collapse(&self) -> OpsResult<LumaBuffer> {
        let mut current = self.coarsest().clone();
        for fine in self.detail_levels().iter().rev() {
            let expanded = upsample(&current, fine.width(), fine.height())?;
            current = grain_merge(&expanded, fine)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GaussianPyramid;

    #[test]
    fn test_coarsest_is_gaussian_residual() {
        let src = LumaBuffer::from_fn(20, 12, |x, _| (x * 12) as u8).unwrap();
        let g = GaussianPyramid::build(src, 2).unwrap();
        let l = to_laplacian(&g).unwrap();
        assert_eq!(l.level_count(), g.level_count());
        assert_eq!(l.coarsest(), g.coarsest());
        assert!(l.same_shape(&g));
    }

    #[test]
    fn test_flat_input_is_neutral() {
        let g = GaussianPyramid::build(LumaBuffer::filled(16, 16, 77).unwrap(), 2).unwrap();
        let l = to_laplacian(&g).unwrap();
        for level in l.detail_levels() {
            assert!(level.as_slice().iter().all(|&v| v == NEUTRAL));
        }
        assert_eq!(l, LaplacianPyramid::neutral_like(&g));
    }

    #[test]
    fn test_collapse_single_level() {
        let src = LumaBuffer::filled(3, 3, 42).unwrap();
        let g = GaussianPyramid::build(src.clone(), 2).unwrap();
        assert_eq!(to_laplacian(&g).unwrap().collapse().unwrap(), src);
    }

    #[test]
    fn test_set_detail_level_checks_size() {
        let g = GaussianPyramid::build(LumaBuffer::filled(16, 16, 0).unwrap(), 2).unwrap();
        let mut l = LaplacianPyramid::neutral_like(&g);
        assert!(l.set_detail_level(0, LumaBuffer::filled(8, 8, 0).unwrap()).is_err());
        assert!(l.set_detail_level(2, LumaBuffer::filled(4, 4, 0).unwrap()).is_err());
        assert!(l.set_detail_level(1, LumaBuffer::filled(8, 8, 1).unwrap()).is_ok());
        assert_eq!(l.level(1).get(0, 0), 1);
    }
}
