//! Pyramid command
//!
//! Writes every level of the value channel's Gaussian or Laplacian pyramid
//! as a grayscale PNG.

use crate::PyramidArgs;
use anyhow::{Context, Result};
use llf_io::ImageData;
use llf_ops::laplacian::to_laplacian;
use llf_ops::value::extract_value;
use llf_ops::GaussianPyramid;
use tracing::{info, trace};

pub fn run(args: PyramidArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "pyramid::run");

    let image = super::load_image(&args.input)?;
    let (value, _) = extract_value(&image, None)?;
    let gaussian = GaussianPyramid::build(value, args.min_size)?;
    let levels = if args.laplacian {
        to_laplacian(&gaussian)?.into_levels()
    } else {
        gaussian.into_levels()
    };

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;
    let kind = if args.laplacian { "laplacian" } else { "gaussian" };
    info!(kind, levels = levels.len(), "Writing pyramid");

    for (k, level) in levels.iter().enumerate() {
        let path = args.output.join(format!("{}_{:02}.png", kind, k));
        super::save_image(&path, &ImageData::from_luma(level))?;
        if verbose > 0 {
            println!("  {} {}x{}", path.display(), level.width(), level.height());
        }
    }
    Ok(())
}
