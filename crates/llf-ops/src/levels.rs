//! Contrast windows and levels stretches.
//!
//! A [`Window`] `[lo, hi]` is the range of reference levels a remapping
//! pass samples. Before remapping, the full range is compressed into the
//! window (`v' = lo + v * (hi - lo) / 255`); afterwards only the *change*
//! made by the pass is stretched back by `255 / (hi - lo)`, so a pass that
//! changes nothing returns its input exactly.
//!
//! ```rust
//! use llf_ops::Window;
//!
//! let w = Window::PREVIEW;
//! assert_eq!(w.level_count(), 32);
//! assert_eq!(w.compress_value(0), 112);
//! assert_eq!(w.compress_value(255), 143);
//! ```

use crate::{OpsError, OpsResult};
use llf_core::{quantize, LumaBuffer};
use rayon::prelude::*;
use std::ops::RangeInclusive;

/// Inclusive range of sampled reference levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    lo: u8,
    hi: u8,
}

impl Window {
    /// Whole intensity range, no compression.
    pub const FULL: Window = Window { lo: 0, hi: 255 };
    /// Narrow window sampled by preview mode.
    pub const PREVIEW: Window = Window { lo: 112, hi: 143 };
    /// Compressed window of the anti-clipping pass.
    pub const COMPRESSED: Window = Window { lo: 64, hi: 191 };

    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `lo > hi`.
    pub fn new(lo: u8, hi: u8) -> OpsResult<Self> {
        if lo > hi {
            return Err(OpsError::InvalidParameter(format!(
                "window lower bound {} exceeds upper bound {}",
                lo, hi
            )));
        }
        Ok(Self { lo, hi })
    }

    /// Lowest reference level.
    #[inline]
    pub fn lo(&self) -> u8 {
        self.lo
    }

    /// Highest reference level.
    #[inline]
    pub fn hi(&self) -> u8 {
        self.hi
    }

    /// `hi - lo`.
    #[inline]
    pub fn span(&self) -> u32 {
        (self.hi - self.lo) as u32
    }

    /// Number of reference levels, `hi - lo + 1`.
    #[inline]
    pub fn level_count(&self) -> u32 {
        self.span() + 1
    }

    /// Reference levels in ascending order.
    pub fn levels(&self) -> RangeInclusive<u8> {
        self.lo..=self.hi
    }

    /// `true` for `[0, 255]`.
    #[inline]
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Contraction factor `(hi - lo) / 255` applied to intensities and to
    /// the curve radii.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.span() as f32 / 255.0
    }

    /// Stretch gain `255 / (hi - lo)`; 0 for a single-level window, whose
    /// passes cannot produce any change.
    #[inline]
    pub fn gain(&self) -> f32 {
        if self.span() == 0 {
            0.0
        } else {
            255.0 / self.span() as f32
        }
    }

    /// Maps one full-range intensity into the window.
    #[inline]
    pub fn compress_value(&self, v: u8) -> u8 {
        quantize(self.lo as f32 + v as f32 * self.factor())
    }

    /// Lookup table of [`compress_value`](Self::compress_value).
    pub fn compress_lut(&self) -> [u8; 256] {
        let mut lut = [0u8; 256];
        for (v, out) in lut.iter_mut().enumerate() {
            *out = self.compress_value(v as u8);
        }
        lut
    }

    /// Compresses a full-range buffer into the window.
    pub fn compress(&self, buffer: &LumaBuffer) -> LumaBuffer {
        if self.is_full() {
            return buffer.clone();
        }
        buffer.map_lut(&self.compress_lut())
    }

    /// Applies the change `result - reference`, stretched by
    /// [`gain`](Self::gain), to the full-range `source`.
    ///
    /// # Errors
    ///
    /// Fails if the three buffers differ in size.
    pub fn restretch(
        &self,
        source: &LumaBuffer,
        reference: &LumaBuffer,
        result: &LumaBuffer,
    ) -> OpsResult<LumaBuffer> {
        source.ensure_same_size(reference)?;
        source.ensure_same_size(result)?;
        let gain = self.gain();
        let data: Vec<u8> = source
            .as_slice()
            .par_iter()
            .zip(reference.as_slice().par_iter())
            .zip(result.as_slice().par_iter())
            .map(|((&s, &w), &r)| quantize(s as f32 + (r as f32 - w as f32) * gain))
            .collect();
        Ok(LumaBuffer::from_vec(source.width(), source.height(), data)?)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::FULL
    }
}
