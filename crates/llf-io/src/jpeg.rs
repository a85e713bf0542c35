//! JPEG format support.
//!
//! Grayscale files are read as one channel, everything else as RGB.
//! Alpha is dropped on write since JPEG cannot store it.
//!
//! ```rust,ignore
//! use llf_io::jpeg;
//!
//! let image = jpeg::read("photo.jpg")?;
//! jpeg::write_with_quality("output.jpg", &image, 95)?;
//! ```

use crate::{ImageData, IoError, IoResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default encoder quality.
pub const DEFAULT_QUALITY: u8 = 90;

/// Reads a JPEG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let (channels, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => (3, pixels),
        jpeg_decoder::PixelFormat::L8 => (1, pixels),
        jpeg_decoder::PixelFormat::L16 => {
            // High byte of each big-endian sample
            let gray: Vec<u8> = pixels.chunks_exact(2).map(|l16| l16[0]).collect();
            (1, gray)
        }
        jpeg_decoder::PixelFormat::CMYK32 => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let k = 1.0 - cmyk[3] as f32 / 255.0;
                    let r = (255.0 - cmyk[0] as f32) * k;
                    let g = (255.0 - cmyk[1] as f32) * k;
                    let b = (255.0 - cmyk[2] as f32) * k;
                    [r.round() as u8, g.round() as u8, b.round() as u8]
                })
                .collect();
            (3, rgb)
        }
    };

    ImageData::from_u8(width, height, channels, data)
}

/// Writes an image to a JPEG file with [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

/// Writes an image to a JPEG file with the given quality (1-100).
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &ImageData, quality: u8) -> IoResult<()> {
    use jpeg_encoder::{ColorType, Encoder};

    let width = u16::try_from(image.width)
        .map_err(|_| IoError::EncodeError(format!("width {} exceeds JPEG limit", image.width)))?;
    let height = u16::try_from(image.height)
        .map_err(|_| IoError::EncodeError(format!("height {} exceeds JPEG limit", image.height)))?;

    // Strip alpha
    let (color_type, pixel_data) = match image.channels {
        1 => (ColorType::Luma, image.data.clone()),
        2 => (ColorType::Luma, image.data.chunks_exact(2).map(|ga| ga[0]).collect()),
        3 => (ColorType::Rgb, image.data.clone()),
        4 => (
            ColorType::Rgb,
            image
                .data
                .chunks_exact(4)
                .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
                .collect(),
        ),
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    let encoder = Encoder::new_file(path.as_ref(), quality.clamp(1, 100))
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    encoder
        .encode(&pixel_data, width, height, color_type)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(())
}
