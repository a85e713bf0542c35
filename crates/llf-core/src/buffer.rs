//! Single-channel 8-bit intensity buffers.
//!
//! [`LumaBuffer`] is the unit every stage of the tone mapper operates on:
//! pyramid levels, remapped images, accumulators and the final adjustment
//! are all luminance buffers.
//!
//! # Memory Layout
//!
//! Samples are stored row-major, top-to-bottom, without padding:
//!
//! ```text
//! [v v v v ...]  <- Row 0
//! [v v v v ...]  <- Row 1
//! ```
//!
//! # Ownership
//!
//! A buffer is owned exclusively by whichever stage currently holds it.
//! Transforms never mutate their input; they return a new buffer or write
//! into one the caller owns.
//!
//! # Usage
//!
//! ```rust
//! use llf_core::LumaBuffer;
//!
//! let mut buf = LumaBuffer::filled(4, 4, 128).unwrap();
//! buf.set(1, 2, 200);
//! assert_eq!(buf.get(1, 2), 200);
//!
//! let invert: Vec<u8> = (0..=255u8).rev().collect();
//! let lut: [u8; 256] = invert.try_into().unwrap();
//! let inverted = buf.map_lut(&lut);
//! assert_eq!(inverted.get(1, 2), 55);
//! ```

use crate::{Error, Result};
use rayon::prelude::*;

/// Neutral value of a bias-128 difference signal.
pub const NEUTRAL: u8 = 128;

/// Rounds to the nearest integer and clamps to `[0, 255]`.
///
/// Every `f32` to buffer boundary goes through this function so that
/// rounding is consistent across the whole pipeline.
///
/// ```rust
/// use llf_core::quantize;
///
/// assert_eq!(quantize(127.5), 128);
/// assert_eq!(quantize(-3.0), 0);
/// assert_eq!(quantize(300.0), 255);
/// ```
#[inline]
pub fn quantize(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Owned grid of 8-bit intensity samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl LumaBuffer {
    /// Creates a buffer where every sample is `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for zero-sized or overflowing
    /// dimensions.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            data: vec![value; len],
            width,
            height,
        })
    }

    /// Wraps existing row-major samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height`
    /// or either dimension is zero.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", len, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Result<Self>
    where
        F: Fn(u32, u32) -> u8,
    {
        let len = checked_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sample at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y)]
    }

    /// Writes the sample at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// One row of samples.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Borrows all samples.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrows all samples.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns `true` if both buffers have the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &LumaBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Fails with [`Error::DimensionMismatch`] unless both buffers have the
    /// same dimensions.
    pub fn ensure_same_size(&self, other: &LumaBuffer) -> Result<()> {
        if self.same_size(other) {
            Ok(())
        } else {
            Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()))
        }
    }

    /// Applies a 256-entry lookup table to every sample.
    pub fn map_lut(&self, lut: &[u8; 256]) -> LumaBuffer {
        let data = self.data.par_iter().map(|&v| lut[v as usize]).collect();
        LumaBuffer {
            data,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for buffer {}x{}",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "width and height must be > 0"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}
