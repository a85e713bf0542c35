//! Two-pass contrast blending against highlight and shadow clipping.
//!
//! Normal-contrast mode remaps twice: over the full range (the primary
//! pass) and over the compressed window `[64, 191]` (the low pass). Each
//! pass keeps a share of its per-level change: counting `i` from the
//! coarsest level, the primary pass keeps `smoothstep(i, 0, levels / 3 - 1)`
//! and the low pass the rest, so large-scale contrast comes from the low
//! pass and fine detail from the primary one.
//!
//! The two weighted pyramids are collapsed separately. The low pass
//! collapses inside its window, where the band-pass sums have headroom on
//! both sides, and only its change is stretched back to full range. The
//! two full-range results are then grain-merged.

use crate::composite::{crossfade, grain_extract, grain_merge};
use crate::interp::smoothstep;
use crate::laplacian::LaplacianPyramid;
use crate::levels::Window;
use crate::progress::{Progress, StepOffset};
use crate::pyramid::{Pyramid, DEFAULT_MIN_SIZE};
use crate::remap::{RemapOutput, RemappingEngine};
use crate::tone_curve::CurveParams;
use crate::{OpsError, OpsResult};
use llf_core::LumaBuffer;
use tracing::debug;

/// Weight of the primary pass at pyramid `level` (0 = finest).
///
/// `i` in `smoothstep(i, 0, levels / 3 - 1)` counts from the coarsest
/// level, so the finest levels take the primary pass.
///
/// ```rust
/// use llf_ops::blend::blend_weight;
///
/// assert_eq!(blend_weight(8, 9), 0.0); // coarsest
/// assert_eq!(blend_weight(7, 9), 0.5);
/// assert_eq!(blend_weight(0, 9), 1.0); // finest
/// ```
pub fn blend_weight(level: usize, level_count: usize) -> f32 {
    let i = level_count.saturating_sub(level + 1) as f32;
    smoothstep(i, 0.0, level_count as f32 / 3.0 - 1.0)
}

/// Keeps `weight(k)` of the change on each detail level of `pass`.
///
/// The coarsest level is the unchanged Gaussian residual.
fn weighted_pyramid(
    pass: &RemapOutput,
    baseline: &LaplacianPyramid,
    weight: impl Fn(usize) -> f32,
) -> OpsResult<LaplacianPyramid> {
    let count = pass.accumulator.level_count();
    let mut levels = Vec::with_capacity(count);
    for k in 0..count - 1 {
        levels.push(crossfade(pass.accumulator.level(k), baseline.level(k), weight(k))?);
    }
    levels.push(pass.accumulator.coarsest().clone());
    Ok(Pyramid::from_levels_unchecked(levels))
}

/// Blends a primary and a low pass over `source` into the final result.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] if the passes ran on inputs of
/// different sizes or not on `source`.
pub fn blend_passes(
    source: &LumaBuffer,
    primary: &RemapOutput,
    low: &RemapOutput,
) -> OpsResult<LumaBuffer> {
    if !primary.accumulator.same_shape(&low.accumulator)
        || primary.accumulator.dimensions() != source.dimensions()
    {
        return Err(OpsError::SizeMismatch(format!(
            "cannot blend a {}-level {}x{} pass with a {}-level {}x{} pass over a {}x{} source",
            primary.accumulator.level_count(),
            primary.accumulator.dimensions().0,
            primary.accumulator.dimensions().1,
            low.accumulator.level_count(),
            low.accumulator.dimensions().0,
            low.accumulator.dimensions().1,
            source.width(),
            source.height(),
        )));
    }
    let count = primary.accumulator.level_count();
    debug!(
        levels = count,
        finest_primary_weight = blend_weight(0, count),
        "Blending passes"
    );

    let primary_base = primary.baseline()?;
    let primary_blend = weighted_pyramid(primary, &primary_base, |k| blend_weight(k, count))?;
    let primary_full = primary.window.restretch(
        source,
        &primary_base.collapse()?,
        &primary_blend.collapse()?,
    )?;

    let low_base = low.baseline()?;
    let low_blend = weighted_pyramid(low, &low_base, |k| 1.0 - blend_weight(k, count))?;
    let low_full = low
        .window
        .restretch(source, &low_base.collapse()?, &low_blend.collapse()?)?;

    grain_merge(&primary_full, &grain_extract(&low_full, source)?)
}

/// Runs the primary and compressed passes and blends them.
#[derive(Debug, Clone)]
pub struct ContrastBlender {
    params: CurveParams,
    min_size: u32,
}

impl ContrastBlender {
    /// Window of the low pass.
    pub const LOW_WINDOW: Window = Window::COMPRESSED;

    /// Creates a blender.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `params` is out of range.
    pub fn new(params: CurveParams) -> OpsResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            min_size: DEFAULT_MIN_SIZE,
        })
    }

    /// Sets the pyramid stop size.
    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    /// Progress steps of both passes.
    pub fn steps(&self) -> u32 {
        Window::FULL.level_count() + Self::LOW_WINDOW.level_count()
    }

    /// Runs both passes over `luma` and returns the blended result.
    ///
    /// Steps of the low pass follow those of the primary pass.
    pub fn run<P: Progress + ?Sized>(&self, luma: &LumaBuffer, progress: &P) -> OpsResult<LumaBuffer> {
        let primary = RemappingEngine::new(Window::FULL, self.params)?
            .with_min_size(self.min_size)
            .run(luma, progress)?;
        let offset = StepOffset::new(progress, Window::FULL.level_count());
        let low = RemappingEngine::new(Self::LOW_WINDOW, self.params)?
            .with_min_size(self.min_size)
            .run(luma, &offset)?;

        blend_passes(luma, &primary, &low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    /// 192x192 checkerboard of 48 px cells, 30 and 225 plus grain.
    fn checkerboard() -> LumaBuffer {
        LumaBuffer::from_fn(192, 192, |x, y| {
            let base: u32 = if (x / 48 + y / 48) % 2 == 0 { 30 } else { 225 };
            (base + (x * 7 + y * 13) % 9 - 4) as u8
        })
        .unwrap()
    }

    fn strong() -> CurveParams {
        CurveParams {
            detail_radius: 20.0,
            noise_reduction: 1.0,
            detail_strength: 60.0,
            edge_strength: 100.0,
        }
    }

    fn clipped(buffer: &LumaBuffer) -> usize {
        buffer.as_slice().iter().filter(|&&v| v == 0 || v == 255).count()
    }

    #[test]
    fn test_weights_favor_primary_at_fine_levels() {
        let n = 12;
        let weights: Vec<f32> = (0..n).map(|k| blend_weight(k, n)).collect();
        assert_eq!(weights[0], 1.0);
        assert_eq!(weights[n - 1], 0.0);
        assert!(weights.windows(2).all(|p| p[0] >= p[1]));
    }

    #[test]
    fn test_shallow_pyramid_uses_primary() {
        for k in 0..2 {
            assert_eq!(blend_weight(k, 3), 1.0);
        }
        // Below seven levels every detail level is still fully primary
        for k in 0..5 {
            assert_eq!(blend_weight(k, 6), 1.0);
        }
        assert!(blend_weight(5, 7) < 1.0);
    }

    #[test]
    fn test_identity_is_noop() {
        let src = LumaBuffer::from_fn(48, 40, |x, y| (x * 3 + y * 2) as u8).unwrap();
        let blender = ContrastBlender::new(CurveParams::default()).unwrap();
        assert_eq!(blender.run(&src, &NoProgress).unwrap(), src);
    }

    #[test]
    fn test_low_pass_collapses_inside_its_window() {
        let src = checkerboard();
        let primary = RemappingEngine::new(Window::FULL, strong())
            .unwrap()
            .run(&src, &NoProgress)
            .unwrap();
        let low = RemappingEngine::new(ContrastBlender::LOW_WINDOW, strong())
            .unwrap()
            .run(&src, &NoProgress)
            .unwrap();
        let count = low.accumulator.level_count();
        assert_eq!(count, 7);

        // The full-range pass runs into the clamp...
        assert!(clipped(&primary.collapse().unwrap()) > 0);

        // ...while the low pass keeps headroom, weighted or not
        let low_base = low.baseline().unwrap();
        let low_blend = weighted_pyramid(&low, &low_base, |k| 1.0 - blend_weight(k, count)).unwrap();
        for collapsed in [low.collapse().unwrap(), low_blend.collapse().unwrap()] {
            let (min, max) = collapsed
                .as_slice()
                .iter()
                .fold((255u8, 0u8), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            assert!(min > 16 && max < 239, "range {}..{}", min, max);
        }
    }

    #[test]
    fn test_weighted_pyramid_keeps_residual() {
        let src = checkerboard();
        let pass = RemappingEngine::new(Window::FULL, strong())
            .unwrap()
            .run(&src, &NoProgress)
            .unwrap();
        let base = pass.baseline().unwrap();

        let none = weighted_pyramid(&pass, &base, |_| 0.0).unwrap();
        assert_eq!(none, base);
        let all = weighted_pyramid(&pass, &base, |_| 1.0).unwrap();
        assert_eq!(all, pass.accumulator);
    }

    #[test]
    fn test_mismatched_passes_rejected() {
        let params = CurveParams::default();
        let src = LumaBuffer::filled(16, 16, 9).unwrap();
        let a = RemappingEngine::new(Window::FULL, params)
            .unwrap()
            .run(&src, &NoProgress)
            .unwrap();
        let b = RemappingEngine::new(Window::COMPRESSED, params)
            .unwrap()
            .run(&LumaBuffer::filled(32, 16, 9).unwrap(), &NoProgress)
            .unwrap();
        assert!(matches!(blend_passes(&src, &a, &b), Err(OpsError::SizeMismatch(_))));

        let other = LumaBuffer::filled(8, 8, 9).unwrap();
        assert!(matches!(blend_passes(&other, &a, &a), Err(OpsError::SizeMismatch(_))));
    }

    #[test]
    fn test_steps() {
        let blender = ContrastBlender::new(CurveParams::default()).unwrap();
        assert_eq!(blender.steps(), 384);
    }
}
