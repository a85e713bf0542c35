//! # llf-io
//!
//! 8-bit image I/O for the llf-rs tone mapper.
//!
//! The tone mapper works on 8-bit intensities, so this crate reads every
//! supported file into 8-bit interleaved samples and writes them back:
//!
//! - **PNG** - gray, gray+alpha, RGB, RGBA (palette and 16-bit are reduced to 8-bit)
//! - **JPEG** - RGB and grayscale
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use llf_io::{read, write};
//!
//! let image = read("input.png")?;
//! write("output.jpg", &image)?;
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

pub use detect::Format;
pub use error::{IoError, IoResult};

use llf_core::LumaBuffer;
use std::path::Path;
use tracing::debug;

/// Reads an image from a file, auto-detecting the format.
///
/// The format is detected by magic bytes, falling back to the extension.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the format is not
/// supported, or the file is corrupted.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), ?format, "Reading image");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),

        _ => Err(unsupported(path)),
    }
}

/// Writes an image to a file, choosing the format from the extension.
///
/// # Errors
///
/// Returns an error if the file cannot be created, the extension is not a
/// supported format, or the channel layout cannot be encoded.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    debug!(path = %path.display(), ?format, width = image.width, height = image.height, "Writing image");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write(path, image),

        _ => Err(unsupported(path)),
    }
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Interleaved 8-bit image.
///
/// `channels` is 1 (gray), 2 (gray + alpha), 3 (RGB) or 4 (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of interleaved channels.
    pub channels: u32,
    /// Row-major interleaved samples.
    pub data: Vec<u8>,
}

impl ImageData {
    /// Creates ImageData from interleaved u8 samples.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if the sample count does not
    /// match `width * height * channels`, and
    /// [`IoError::UnsupportedOperation`] for channel counts outside 1..=4.
    pub fn from_u8(width: u32, height: u32, channels: u32, data: Vec<u8>) -> IoResult<Self> {
        if !(1..=4).contains(&channels) {
            return Err(IoError::UnsupportedOperation(format!(
                "{} channels",
                channels
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(IoError::DimensionMismatch {
                expected: expected.to_string(),
                actual: data.len().to_string(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wraps a luminance buffer as a single-channel image.
    pub fn from_luma(buffer: &LumaBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            channels: 1,
            data: buffer.as_slice().to_vec(),
        }
    }

    /// Returns the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the last channel is alpha (2 or 4 channels).
    pub fn has_alpha(&self) -> bool {
        self.channels == 2 || self.channels == 4
    }

    /// Number of color channels, excluding alpha.
    pub fn color_channels(&self) -> u32 {
        if self.has_alpha() {
            self.channels - 1
        } else {
            self.channels
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_validates_length() {
        assert!(ImageData::from_u8(2, 2, 3, vec![0; 12]).is_ok());
        assert!(ImageData::from_u8(2, 2, 3, vec![0; 11]).is_err());
        assert!(ImageData::from_u8(2, 2, 5, vec![0; 20]).is_err());
    }

    #[test]
    fn test_alpha_layout() {
        let rgba = ImageData::from_u8(1, 1, 4, vec![1, 2, 3, 4]).unwrap();
        assert!(rgba.has_alpha());
        assert_eq!(rgba.color_channels(), 3);

        let gray = ImageData::from_u8(1, 1, 1, vec![7]).unwrap();
        assert!(!gray.has_alpha());
        assert_eq!(gray.color_channels(), 1);
    }

    #[test]
    fn test_from_luma() {
        let buf = LumaBuffer::from_vec(2, 1, vec![10, 20]).unwrap();
        let img = ImageData::from_luma(&buf);
        assert_eq!(img.channels, 1);
        assert_eq!(img.data, vec![10, 20]);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let img = ImageData::from_u8(1, 1, 1, vec![0]).unwrap();
        let err = write("out.xyz", &img).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(ext) if ext == "xyz"));
    }
}
