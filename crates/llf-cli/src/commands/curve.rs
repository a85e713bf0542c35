//! Curve command
//!
//! Prints the 256-entry tone curve for one reference level, one
//! `input<TAB>output` pair per line.

use crate::CurveArgs;
use anyhow::{Context, Result};
use llf_ops::{ToneCurve, ToneMapParams};
use tracing::trace;

pub fn run(args: CurveArgs) -> Result<()> {
    trace!(reference = args.reference, "curve::run");

    let params = ToneMapParams {
        noise_reduction: args.noise_reduction,
        detail_edge_threshold: args.threshold,
        detail_strength: args.detail,
        edge_strength: args.edge,
        ..ToneMapParams::default()
    };
    params.validate().context("Invalid curve parameters")?;
    let curve = ToneCurve::build(args.reference, &params.curve_params())?;

    for (x, y) in curve.lut().iter().enumerate() {
        println!("{}\t{}", x, y);
    }
    Ok(())
}
