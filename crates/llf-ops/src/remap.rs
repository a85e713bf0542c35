//! The remapping engine: one tone curve per reference level.
//!
//! For every reference level `r` of the contrast window the windowed input
//! is remapped with the curve centred on `r` and decomposed into a
//! Laplacian pyramid. Each detail-level pixel of the result is taken from
//! the pyramid whose `r` equals the Gaussian pyramid's value at that pixel,
//! so every pixel is shaped by a curve centred on its own intensity.
//!
//! # Parallelism
//!
//! Reference levels are independent. They are folded on rayon workers into
//! partial accumulators, each tagged with the levels it covered, and the
//! partials are merged per pixel: a pixel takes the value of the partial
//! covering its Gaussian value. Since each pixel matches exactly one `r`,
//! the result does not depend on scheduling.
//!
//! Reference levels that no detail-level pixel takes are skipped; they are
//! still reported to the progress callback.

use crate::composite::{select_covered, select_where};
use crate::laplacian::{to_laplacian, LaplacianPyramid};
use crate::levels::Window;
use crate::progress::{Progress, Serialized};
use crate::pyramid::{GaussianPyramid, DEFAULT_MIN_SIZE};
use crate::tone_curve::{CurveParams, ToneCurve};
use crate::{OpsError, OpsResult};
use llf_core::LumaBuffer;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Result of one remapping pass.
#[derive(Debug, Clone)]
pub struct RemapOutput {
    /// Remapped Laplacian pyramid; its coarsest level is the Gaussian residual.
    pub accumulator: LaplacianPyramid,
    /// Gaussian pyramid of the windowed input; its finest level is the
    /// input compressed into the window.
    pub gaussian: GaussianPyramid,
    /// Window the pass sampled.
    pub window: Window,
}

impl RemapOutput {
    /// Laplacian pyramid of the windowed input without remapping.
    pub fn baseline(&self) -> OpsResult<LaplacianPyramid> {
        to_laplacian(&self.gaussian)
    }

    /// Collapses the accumulator to a windowed buffer.
    pub fn collapse(&self) -> OpsResult<LumaBuffer> {
        self.accumulator.collapse()
    }

    /// Collapse of the unremapped pyramid.
    ///
    /// Equals [`collapse`](Self::collapse) when no level changed, including
    /// whatever the band-pass clamp lost, and is the zero point of
    /// [`restretch`](Self::restretch).
    pub fn reference(&self) -> OpsResult<LumaBuffer> {
        self.baseline()?.collapse()
    }

    /// Collapses and applies the change made by this pass, stretched back
    /// to full range, to `source`.
    pub fn restretch(&self, source: &LumaBuffer) -> OpsResult<LumaBuffer> {
        let result = self.collapse()?;
        self.window.restretch(source, &self.reference()?, &result)
    }
}

/// Runs the per-reference-level remapping over one contrast window.
#[derive(Debug, Clone)]
pub struct RemappingEngine {
    window: Window,
    params: CurveParams,
    min_size: u32,
}

impl RemappingEngine {
    /// Creates an engine for `window` with full-range curve parameters.
    ///
    /// The radii in `params` are given for full-range intensities and are
    /// scaled by the window's contraction factor.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `params` is out of range.
    pub fn new(window: Window, params: CurveParams) -> OpsResult<Self> {
        params.validate()?;
        Ok(Self {
            window,
            params,
            min_size: DEFAULT_MIN_SIZE,
        })
    }

    /// Sets the pyramid stop size.
    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sampled window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Full-range curve parameters.
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Number of progress steps a run reports.
    pub fn steps(&self) -> u32 {
        self.window.level_count()
    }

    /// Runs the pass over `luma`.
    ///
    /// Steps `0..steps()` are reported once each, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Cancelled`] if `progress` requests an abort;
    /// partial results are discarded.
    pub fn run<P: Progress + ?Sized>(
        &self,
        luma: &LumaBuffer,
        progress: &P,
    ) -> OpsResult<RemapOutput> {
        let window = self.window;
        let windowed = window.compress(luma);
        let params = self.params.scaled(window.factor());
        let gaussian = GaussianPyramid::build(windowed.clone(), self.min_size)?;
        let used = used_levels(&gaussian);
        debug!(
            lo = window.lo(),
            hi = window.hi(),
            levels = gaussian.level_count(),
            used = used.iter().filter(|&&u| u).count(),
            "Remapping pass started"
        );

        let reporter = Serialized::new(progress);
        let lo = window.lo() as u32;
        let merged = (lo..=window.hi() as u32)
            .into_par_iter()
            .try_fold(Partial::empty, |mut partial, r| {
                if reporter.is_cancelled() {
                    return Err(OpsError::Cancelled);
                }
                let reference = r as u8;
                if used[reference as usize] {
                    let remapped = remap_level(&windowed, reference, &params, self.min_size)?;
                    partial.insert(reference, remapped, &gaussian)?;
                    trace!(reference, "Reference level remapped");
                } else {
                    trace!(reference, "Reference level skipped");
                }
                reporter.report(r - lo);
                Ok(partial)
            })
            .try_reduce(Partial::empty, |a, b| a.merge(b, &gaussian))?;

        let mut accumulator = LaplacianPyramid::neutral_like(&gaussian);
        if let Some(levels) = &merged.levels {
            let targets = accumulator.levels_mut();
            for (k, level) in levels.iter().enumerate() {
                select_covered(&mut targets[k], level, gaussian.level(k), &merged.covered)?;
            }
        }
        debug!(lo = window.lo(), hi = window.hi(), "Remapping pass finished");

        Ok(RemapOutput {
            accumulator,
            gaussian,
            window,
        })
    }
}

/// Remaps `windowed` with the curve for `reference` and decomposes it.
pub fn remap_level(
    windowed: &LumaBuffer,
    reference: u8,
    params: &CurveParams,
    min_size: u32,
) -> OpsResult<LaplacianPyramid> {
    let curve = ToneCurve::build(reference, params)?;
    let remapped = curve.apply(windowed);
    to_laplacian(&GaussianPyramid::build(remapped, min_size)?)
}

/// Intensities present on any detail level of `gaussian`.
fn used_levels(gaussian: &GaussianPyramid) -> [bool; 256] {
    let mut used = [false; 256];
    for level in gaussian.detail_levels() {
        for &v in level.as_slice() {
            used[v as usize] = true;
        }
    }
    used
}

/// Detail levels folded by one worker.
///
/// Only pixels whose Gaussian value is in `covered` are meaningful.
struct Partial {
    covered: [bool; 256],
    levels: Option<Vec<LumaBuffer>>,
}

impl Partial {
    fn empty() -> Self {
        Self {
            covered: [false; 256],
            levels: None,
        }
    }

    fn insert(
        &mut self,
        reference: u8,
        remapped: LaplacianPyramid,
        gaussian: &GaussianPyramid,
    ) -> OpsResult<()> {
        match &mut self.levels {
            Some(levels) => {
                for (k, level) in levels.iter_mut().enumerate() {
                    select_where(level, remapped.level(k), gaussian.level(k), reference)?;
                }
            }
            None => {
                let mut levels = remapped.into_levels();
                levels.truncate(gaussian.level_count() - 1);
                self.levels = Some(levels);
            }
        }
        self.covered[reference as usize] = true;
        Ok(())
    }

    fn merge(mut self, other: Self, gaussian: &GaussianPyramid) -> OpsResult<Self> {
        let Some(theirs) = other.levels else {
            return Ok(self);
        };
        let Some(ours) = self.levels.as_mut() else {
            return Ok(Self {
                covered: other.covered,
                levels: Some(theirs),
            });
        };
        for (k, (dst, src)) in ours.iter_mut().zip(&theirs).enumerate() {
            select_covered(dst, src, gaussian.level(k), &other.covered)?;
        }
        for (mine, bit) in self.covered.iter_mut().zip(other.covered) {
            *mine |= bit;
        }
        Ok(self)
    }
}
