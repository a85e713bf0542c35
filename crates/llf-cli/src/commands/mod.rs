//! CLI command implementations

pub mod curve;
pub mod pyramid;
pub mod tonemap;

use anyhow::{bail, Context, Result};
use llf_core::Rect;
use llf_io::ImageData;
use llf_ops::ToneMapParams;
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path) -> Result<ImageData> {
    llf_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageData) -> Result<()> {
    llf_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Load tone-mapping parameters from a YAML preset.
///
/// Missing fields keep their defaults.
pub fn load_preset(path: &Path) -> Result<ToneMapParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset: {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Invalid preset: {}", path.display()))
}

/// Parse `x,y,width,height`.
pub fn parse_region(s: &str) -> Result<Rect> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        bail!("Region must be x,y,width,height, got '{}'", s);
    }
    let mut v = [0u32; 4];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("Invalid region component '{}'", part))?;
    }
    if v[2] == 0 || v[3] == 0 {
        bail!("Region width and height must be > 0");
    }
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}
