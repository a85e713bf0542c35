//! Per-reference-level tone curves.
//!
//! For a reference level `r`, each input `x` is shaped by its deviation
//! `d = x - r`:
//!
//! - **Detail** (`|d| <= radius`): `sign(d) * radius * (|d| / radius)^p`
//!   with `p = 3^(-detail_strength / 100)`. Positive strengths give `p < 1`
//!   and enhance small deviations, negative strengths smooth them.
//! - **Edge** (`|d| > radius`): `d + sign(d) * edge_strength / 100 * (|d| - radius)`,
//!   a linear compression or expansion of large deviations.
//! - **Noise reduction**: where `|d| <= noise_reduction` and the shaped
//!   offset would amplify `d`, the offset is blended back towards `d` with
//!   `smoothstep(|d|, noise_reduction / 2, noise_reduction)`.
//!
//! The table entry is `quantize(r + offset)`.
//!
//! # Example
//!
//! ```rust
//! use llf_ops::tone_curve::{CurveParams, ToneCurve};
//!
//! let params = CurveParams {
//!     detail_radius: 20.0,
//!     noise_reduction: 0.0,
//!     detail_strength: 0.0,
//!     edge_strength: -50.0,
//! };
//! let curve = ToneCurve::build(100, &params).unwrap();
//! assert_eq!(curve.map(110), 110); // detail band, identity
//! assert_eq!(curve.map(200), 160); // 100 + 100 - 0.5 * 80
//! ```

use crate::interp::smoothstep;
use crate::{OpsError, OpsResult};
use llf_core::{quantize, LumaBuffer};

/// Shape parameters of a tone curve, in intensity units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    /// Deviation separating the detail and edge regimes.
    pub detail_radius: f32,
    /// Deviation below which amplification is suppressed.
    pub noise_reduction: f32,
    /// Detail contrast in `[-100, 100]`.
    pub detail_strength: f32,
    /// Edge contrast in `[-100, 100]`.
    pub edge_strength: f32,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            detail_radius: 10.0,
            noise_reduction: 1.0,
            detail_strength: 0.0,
            edge_strength: 0.0,
        }
    }
}

impl CurveParams {
    /// Checks every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> OpsResult<()> {
        check_non_negative("detail_radius", self.detail_radius)?;
        check_non_negative("noise_reduction", self.noise_reduction)?;
        check_strength("detail_strength", self.detail_strength)?;
        check_strength("edge_strength", self.edge_strength)?;
        Ok(())
    }

    /// Radii multiplied by `factor`; strengths unchanged.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            detail_radius: self.detail_radius * factor,
            noise_reduction: self.noise_reduction * factor,
            ..*self
        }
    }

    /// `true` when both strengths are zero, i.e. every curve is the identity.
    pub fn is_identity(&self) -> bool {
        self.detail_strength == 0.0 && self.edge_strength == 0.0
    }

    /// Detail-regime exponent `3^(-detail_strength / 100)`.
    #[inline]
    pub fn detail_exponent(&self) -> f32 {
        3.0f32.powf(-self.detail_strength / 100.0)
    }

    /// Shaped offset for a deviation `d` from the reference level.
    pub fn offset(&self, d: f32) -> f32 {
        if d == 0.0 {
            return 0.0;
        }
        let ad = d.abs();
        let sign = d.signum();
        let radius = self.detail_radius;

        let shaped = if ad <= radius {
            sign * radius * (ad / radius).powf(self.detail_exponent())
        } else {
            d + sign * (self.edge_strength / 100.0) * (ad - radius)
        };

        let nr = self.noise_reduction;
        if ad <= nr && shaped.abs() > ad {
            let w = smoothstep(ad, nr / 2.0, nr);
            w * shaped + (1.0 - w) * d
        } else {
            shaped
        }
    }
}

fn check_non_negative(name: &str, value: f32) -> OpsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!("{} must be >= 0, got {}", name, value)))
    }
}

fn check_strength(name: &str, value: f32) -> OpsResult<()> {
    if (-100.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(OpsError::InvalidParameter(format!(
            "{} must be in [-100, 100], got {}",
            name, value
        )))
    }
}

/// 256-entry lookup table for one reference level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCurve {
    reference: u8,
    lut: [u8; 256],
}

impl ToneCurve {
    /// Synthesizes the curve centred on `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `params` is out of range.
    pub fn build(reference: u8, params: &CurveParams) -> OpsResult<Self> {
        params.validate()?;
        let r = reference as f32;
        let mut lut = [0u8; 256];
        for (x, out) in lut.iter_mut().enumerate() {
            *out = quantize(r + params.offset(x as f32 - r));
        }
        Ok(Self { reference, lut })
    }

    /// Reference level the curve is centred on.
    #[inline]
    pub fn reference(&self) -> u8 {
        self.reference
    }

    /// The lookup table.
    #[inline]
    pub fn lut(&self) -> &[u8; 256] {
        &self.lut
    }

    /// Maps one intensity.
    #[inline]
    pub fn map(&self, x: u8) -> u8 {
        self.lut[x as usize]
    }

    /// `true` if every entry maps to itself.
    pub fn is_identity(&self) -> bool {
        self.lut.iter().enumerate().all(|(i, &v)| i == v as usize)
    }

    /// Applies the curve to every sample.
    pub fn apply(&self, buffer: &LumaBuffer) -> LumaBuffer {
        buffer.map_lut(&self.lut)
    }
}
