//! Tonemap command
//!
//! Tone maps the value channel of an image and either merges the result
//! or writes it as a separate grayscale layer.

use crate::TonemapArgs;
use anyhow::{Context, Result};
use llf_io::ImageData;
use llf_ops::{ToneMapParams, ToneMapper};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, trace};

pub fn run(args: TonemapArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "tonemap::run");

    let params = resolve_params(&args)?;
    let mapper = ToneMapper::new(params).context("Invalid tone-mapping parameters")?;
    let selection = args.region.as_deref().map(super::parse_region).transpose()?;
    let image = super::load_image(&args.input)?;

    info!(
        mode = %params.mode,
        noise_reduction = params.noise_reduction,
        threshold = params.detail_edge_threshold,
        detail = params.detail_strength,
        edge = params.edge_strength,
        w = image.width,
        h = image.height,
        "Tone mapping"
    );
    if verbose > 0 {
        println!("Tone mapping {} ({} mode)", args.input.display(), params.mode);
    }

    let total = mapper.total_steps();
    let done = AtomicU32::new(0);
    let report = |_step: u32| {
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if verbose > 0 && (n % 64 == 0 || n == total) {
            println!("  {}/{} reference levels", n, total);
        }
    };
    let adjustment = mapper.process_image(&image, selection, &report)?;

    if params.keep_as_layer {
        let layer = ImageData::from_luma(&adjustment.buffer);
        super::save_image(&args.output, &layer)?;
        info!(
            x = adjustment.region.x,
            y = adjustment.region.y,
            "Adjustment kept as layer"
        );
        if verbose > 0 {
            println!(
                "Adjustment layer written to {} (offset {},{})",
                args.output.display(),
                adjustment.region.x,
                adjustment.region.y
            );
        }
    } else {
        let mut output = image;
        adjustment.apply_to(&mut output)?;
        super::save_image(&args.output, &output)?;
        if verbose > 0 {
            println!("Done.");
        }
    }

    Ok(())
}

/// Preset (or defaults) overridden by explicit flags.
fn resolve_params(args: &TonemapArgs) -> Result<ToneMapParams> {
    let mut params = match &args.preset {
        Some(path) => super::load_preset(path)?,
        None => ToneMapParams::default(),
    };
    if let Some(mode) = args.mode {
        params.mode = mode.into();
    }
    if let Some(v) = args.noise_reduction {
        params.noise_reduction = v;
    }
    if let Some(v) = args.threshold {
        params.detail_edge_threshold = v;
    }
    if let Some(v) = args.detail {
        params.detail_strength = v;
    }
    if let Some(v) = args.edge {
        params.edge_strength = v;
    }
    if args.keep_as_layer {
        params.keep_as_layer = true;
    }
    Ok(params)
}
