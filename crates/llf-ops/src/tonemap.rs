//! The tone mapper: parameters, mode dispatch and image-level entry points.
//!
//! # Example
//!
//! ```rust
//! use llf_core::LumaBuffer;
//! use llf_ops::{Mode, ToneMapParams, ToneMapper};
//!
//! let params = ToneMapParams {
//!     mode: Mode::LowContrast,
//!     detail_strength: 40,
//!     ..ToneMapParams::default()
//! };
//! let mapper = ToneMapper::new(params).unwrap();
//! let flat = LumaBuffer::filled(4, 4, 128).unwrap();
//! assert_eq!(mapper.run(&flat, &|_step: u32| {}).unwrap(), flat);
//! ```

use crate::blend::ContrastBlender;
use crate::levels::Window;
use crate::progress::{NoProgress, Progress};
use crate::pyramid::DEFAULT_MIN_SIZE;
use crate::remap::RemappingEngine;
use crate::tone_curve::CurveParams;
use crate::value::{apply_value, extract_value};
use crate::{OpsError, OpsResult};
use llf_core::{LumaBuffer, Rect};
use llf_io::ImageData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// Largest accepted noise-reduction setting.
pub const MAX_NOISE_REDUCTION: u32 = 4;

/// Largest accepted detail/edge threshold.
pub const MAX_DETAIL_EDGE_THRESHOLD: u32 = 255;

/// Strength magnitude limit for detail and edge contrast.
pub const MAX_STRENGTH: i32 = 100;

/// Sampling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// 32 reference levels around mid-gray; fast, lower fidelity.
    Preview,
    /// All 256 reference levels, single pass.
    LowContrast,
    /// All 256 reference levels plus the anti-clipping blend pass.
    #[default]
    NormalContrast,
}

impl Mode {
    /// Window of the primary pass.
    pub fn window(&self) -> Window {
        match self {
            Mode::Preview => Window::PREVIEW,
            Mode::LowContrast | Mode::NormalContrast => Window::FULL,
        }
    }

    /// `true` if the mode runs the [`ContrastBlender`].
    pub fn blends(&self) -> bool {
        matches!(self, Mode::NormalContrast)
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Preview => "preview",
            Mode::LowContrast => "low-contrast",
            Mode::NormalContrast => "normal-contrast",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preview" => Ok(Mode::Preview),
            "low" | "low-contrast" => Ok(Mode::LowContrast),
            "normal" | "normal-contrast" => Ok(Mode::NormalContrast),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown mode '{}' (expected preview, low-contrast or normal-contrast)",
                s
            ))),
        }
    }
}

/// User-facing tone-mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMapParams {
    /// Sampling mode.
    pub mode: Mode,
    /// Noise reduction, 0 (off) to 4.
    pub noise_reduction: u32,
    /// Deviation separating detail from edges, 0 to 255.
    pub detail_edge_threshold: u32,
    /// Detail contrast, -100 to 100.
    pub detail_strength: i32,
    /// Edge contrast, -100 to 100.
    pub edge_strength: i32,
    /// Keep the adjustment as a separate layer instead of merging it.
    pub keep_as_layer: bool,
}

impl Default for ToneMapParams {
    fn default() -> Self {
        Self {
            mode: Mode::NormalContrast,
            noise_reduction: 0,
            detail_edge_threshold: 20,
            detail_strength: 0,
            edge_strength: 0,
            keep_as_layer: false,
        }
    }
}

impl ToneMapParams {
    /// Checks every field against its range.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> OpsResult<()> {
        if self.noise_reduction > MAX_NOISE_REDUCTION {
            return Err(OpsError::InvalidParameter(format!(
                "noise_reduction must be in [0, {}], got {}",
                MAX_NOISE_REDUCTION, self.noise_reduction
            )));
        }
        if self.detail_edge_threshold > MAX_DETAIL_EDGE_THRESHOLD {
            return Err(OpsError::InvalidParameter(format!(
                "detail_edge_threshold must be in [0, {}], got {}",
                MAX_DETAIL_EDGE_THRESHOLD, self.detail_edge_threshold
            )));
        }
        for (name, value) in [
            ("detail_strength", self.detail_strength),
            ("edge_strength", self.edge_strength),
        ] {
            if value.abs() > MAX_STRENGTH {
                return Err(OpsError::InvalidParameter(format!(
                    "{} must be in [-{}, {}], got {}",
                    name, MAX_STRENGTH, MAX_STRENGTH, value
                )));
            }
        }
        Ok(())
    }

    /// Curve parameters in full-range intensity units.
    ///
    /// The radius is half the threshold. Noise reduction is shifted by one:
    /// at 1 the blend weight already reaches 1 for every non-zero integer
    /// deviation, so setting 0 leaves the curves untouched.
    pub fn curve_params(&self) -> CurveParams {
        CurveParams {
            detail_radius: self.detail_edge_threshold as f32 / 2.0,
            noise_reduction: (self.noise_reduction + 1) as f32,
            detail_strength: self.detail_strength as f32,
            edge_strength: self.edge_strength as f32,
        }
    }
}

/// Tone-mapped value channel and where it belongs in the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    /// New value channel, sized like `region`.
    pub buffer: LumaBuffer,
    /// Placement in the source image.
    pub region: Rect,
}

impl Adjustment {
    /// Writes the adjustment into `image` as a value-replacing layer.
    pub fn apply_to(&self, image: &mut ImageData) -> OpsResult<()> {
        apply_value(image, &self.buffer, self.region)
    }
}

/// Runs the configured passes over a luminance buffer.
#[derive(Debug, Clone)]
pub struct ToneMapper {
    params: ToneMapParams,
    min_size: u32,
}

impl ToneMapper {
    /// Creates a tone mapper.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `params` is out of range.
    pub fn new(params: ToneMapParams) -> OpsResult<Self> {
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

    /// The parameters.
    pub fn params(&self) -> &ToneMapParams {
        &self.params
    }

    /// Steps a run reports: 32 in preview, 256 in low-contrast, 384 in
    /// normal-contrast mode.
    pub fn total_steps(&self) -> u32 {
        let primary = self.params.mode.window().level_count();
        if self.params.mode.blends() {
            primary + Window::COMPRESSED.level_count()
        } else {
            primary
        }
    }

    /// Tone maps `luma`, returning the new full-range buffer.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Cancelled`] if `progress` aborts the run.
    pub fn run<P: Progress + ?Sized>(&self, luma: &LumaBuffer, progress: &P) -> OpsResult<LumaBuffer> {
        let mode = self.params.mode;
        let curve = self.params.curve_params();
        let (width, height) = luma.dimensions();
        debug!(%mode, width, height, ?curve, "Tone mapping");
        let start = Instant::now();

        let result = if mode.blends() {
            ContrastBlender::new(curve)?
                .with_min_size(self.min_size)
                .run(luma, progress)?
        } else {
            RemappingEngine::new(mode.window(), curve)?
                .with_min_size(self.min_size)
                .run(luma, progress)?
                .restretch(luma)?
        };

        debug!(%mode, elapsed_ms = start.elapsed().as_millis() as u64, "Tone mapping finished");
        Ok(result)
    }

    /// Tone maps the value channel of `image` inside `selection`.
    ///
    /// The returned [`Adjustment`] is either merged with
    /// [`Adjustment::apply_to`] or kept as a layer, as the caller decides.
    pub fn process_image<P: Progress + ?Sized>(
        &self,
        image: &ImageData,
        selection: Option<Rect>,
        progress: &P,
    ) -> OpsResult<Adjustment> {
        let (luma, region) = extract_value(image, selection)?;
        let buffer = self.run(&luma, progress)?;
        Ok(Adjustment { buffer, region })
    }
}

/// Tone maps `luma` without progress reporting.
pub fn tonemap(luma: &LumaBuffer, params: &ToneMapParams) -> OpsResult<LumaBuffer> {
    ToneMapper::new(*params)?.run(luma, &NoProgress)
}
