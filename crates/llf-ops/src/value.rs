//! Value-channel extraction and recombination.
//!
//! The tone mapper works on HSV value (the largest color channel).
//! [`extract_value`] reduces an interleaved 8-bit image to that channel
//! inside an optional selection; [`apply_value`] writes an adjusted value
//! channel back, scaling each pixel's color channels by `new / old` so hue
//! and saturation survive. Alpha is never touched.

use crate::{OpsError, OpsResult};
use llf_core::{quantize, LumaBuffer, Rect};
use llf_io::ImageData;
use rayon::prelude::*;
use tracing::trace;

fn check_layout(image: &ImageData) -> OpsResult<()> {
    let expected = image.pixel_count() * image.channels as usize;
    if !(1..=4).contains(&image.channels) || image.data.len() != expected {
        return Err(OpsError::SizeMismatch(format!(
            "{}x{}x{} image holds {} samples",
            image.width,
            image.height,
            image.channels,
            image.data.len()
        )));
    }
    Ok(())
}

/// Value channel of `image` inside `selection`, with the region it covers.
///
/// The selection is clipped to the image; `None` selects everything.
///
/// # Errors
///
/// Returns [`OpsError::InvalidParameter`] if the selection does not
/// overlap the image, and [`OpsError::SizeMismatch`] for malformed images.
///
/// ```rust
/// use llf_core::Rect;
/// use llf_io::ImageData;
/// use llf_ops::value::extract_value;
///
/// let image = ImageData::from_u8(2, 1, 3, vec![10, 200, 30, 5, 5, 5]).unwrap();
/// let (value, region) = extract_value(&image, None).unwrap();
/// assert_eq!(value.as_slice(), &[200, 5]);
/// assert_eq!(region, Rect::new(0, 0, 2, 1));
/// ```
pub fn extract_value(image: &ImageData, selection: Option<Rect>) -> OpsResult<(LumaBuffer, Rect)> {
    check_layout(image)?;
    let region = match selection {
        Some(sel) => sel.clamp_to(image.width, image.height).ok_or_else(|| {
            OpsError::InvalidParameter(format!(
                "selection {}x{}+{}+{} lies outside the {}x{} image",
                sel.width, sel.height, sel.x, sel.y, image.width, image.height
            ))
        })?,
        None => Rect::from_size(image.width, image.height),
    };

    let channels = image.channels as usize;
    let color = image.color_channels() as usize;
    let stride = image.width as usize * channels;
    let value = LumaBuffer::from_fn(region.width, region.height, |x, y| {
        let start = (region.y + y) as usize * stride + (region.x + x) as usize * channels;
        image.data[start..start + color]
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
    })?;
    trace!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "Extracted value channel"
    );
    Ok((value, region))
}

/// Replaces the value channel of `image` inside `region` with `adjustment`.
///
/// Black pixels have no hue and become neutral gray of the new value.
///
/// # Errors
///
/// Returns [`OpsError::SizeMismatch`] if `adjustment` does not have the
/// size of `region` or `region` is not inside the image.
pub fn apply_value(image: &mut ImageData, adjustment: &LumaBuffer, region: Rect) -> OpsResult<()> {
    check_layout(image)?;
    if adjustment.dimensions() != (region.width, region.height)
        || !Rect::from_size(image.width, image.height).contains_rect(&region)
    {
        return Err(OpsError::SizeMismatch(format!(
            "{}x{} adjustment at {}x{}+{}+{} does not fit a {}x{} image",
            adjustment.width(),
            adjustment.height(),
            region.width,
            region.height,
            region.x,
            region.y,
            image.width,
            image.height
        )));
    }

    let channels = image.channels as usize;
    let color = image.color_channels() as usize;
    let stride = image.width as usize * channels;
    image
        .data
        .par_chunks_mut(stride)
        .skip(region.y as usize)
        .take(region.height as usize)
        .zip(0..region.height)
        .for_each(|(row, y)| {
            let values = adjustment.row(y);
            let pixels = &mut row[region.x as usize * channels..region.right() as usize * channels];
            for (px, &new) in pixels.chunks_exact_mut(channels).zip(values) {
                recolor(&mut px[..color], new);
            }
        });
    Ok(())
}

/// Sets the value of one pixel, keeping hue and saturation.
fn recolor(color: &mut [u8], new: u8) {
    let old = color.iter().copied().max().unwrap_or(0);
    if old == new {
        return;
    }
    if old == 0 {
        color.fill(new);
        return;
    }
    let scale = new as f32 / old as f32;
    for c in color.iter_mut() {
        *c = quantize(*c as f32 * scale);
    }
}
