//! Shared inputs for the llf-rs benchmarks.

use llf_core::{LumaBuffer, Result};

/// Deterministic test scene: a bright window on a dark wall with fine
/// texture, so every pyramid level and both curve regimes see work.
pub fn synthetic_scene(width: u32, height: u32) -> Result<LumaBuffer> {
    let (w3, h3) = (width / 3, height / 3);
    LumaBuffer::from_fn(width, height, |x, y| {
        let inside = x >= w3 && x < 2 * w3 && y >= h3 && y < 2 * h3;
        let base: u32 = if inside { 210 } else { 35 };
        let texture = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) % 17;
        (base + texture) as u8
    })
}
