//! llf - local Laplacian tone mapping from the command line

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use llf_ops::Mode;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "llf")]
#[command(author, version, about = "Edge-aware local tone mapping")]
#[command(long_about = "
Redistributes local contrast with a discretized Local Laplacian Filter.
Fine texture (detail) and large brightness transitions (edges) are shaped
independently, without halos around high-contrast boundaries.

Examples:
  llf tonemap in.png -o out.png --detail 40 --edge -30
  llf tonemap in.jpg -o out.jpg --mode preview --region 100,80,640,480
  llf tonemap in.png -o adj.png --preset soft.yaml --keep-as-layer
  llf pyramid in.png -o levels/ --laplacian
  llf curve --reference 128 --threshold 40 --detail 60
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tone map the value channel of an image
    #[command(visible_alias = "t")]
    Tonemap(TonemapArgs),

    /// Dump the Gaussian or Laplacian pyramid levels as PNGs
    Pyramid(PyramidArgs),

    /// Print the tone curve for one reference level
    Curve(CurveArgs),
}

#[derive(Args)]
struct TonemapArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// YAML preset; explicit flags override its fields
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Tone-mapping mode
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Noise reduction (0-4)
    #[arg(short, long)]
    noise_reduction: Option<u32>,

    /// Detail/edge threshold (0-255)
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Detail strength (-100 to 100)
    #[arg(short, long, allow_negative_numbers = true)]
    detail: Option<i32>,

    /// Edge strength (-100 to 100)
    #[arg(short, long, allow_negative_numbers = true)]
    edge: Option<i32>,

    /// Write the grayscale adjustment instead of merging it
    #[arg(long)]
    keep_as_layer: bool,

    /// Restrict to a selection: x,y,width,height
    #[arg(short, long)]
    region: Option<String>,
}

/// Tone-mapping mode as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Central window 112-143 only, fastest
    Preview,
    /// Full range, single pass
    #[value(alias = "low")]
    LowContrast,
    /// Full range plus the anti-clipping blend pass
    #[value(alias = "normal")]
    NormalContrast,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Preview => Mode::Preview,
            ModeArg::LowContrast => Mode::LowContrast,
            ModeArg::NormalContrast => Mode::NormalContrast,
        }
    }
}

#[derive(Args)]
struct PyramidArgs {
    /// Input image
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Dump the Laplacian (band-pass) pyramid instead of the Gaussian one
    #[arg(short, long)]
    laplacian: bool,

    /// Stop halving once a side would drop to this size
    #[arg(long, default_value = "2")]
    min_size: u32,
}

#[derive(Args)]
struct CurveArgs {
    /// Reference level (0-255)
    #[arg(short, long)]
    reference: u8,

    /// Noise reduction (0-4)
    #[arg(short, long, default_value = "0")]
    noise_reduction: u32,

    /// Detail/edge threshold (0-255)
    #[arg(short, long, default_value = "20")]
    threshold: u32,

    /// Detail strength (-100 to 100)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    detail: i32,

    /// Edge strength (-100 to 100)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    edge: i32,
}

/// Installs the stderr subscriber and, with `--log`, a file writer.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(filter).with(stderr_layer).init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Log path has no file name: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Tonemap(args) => commands::tonemap::run(args, cli.verbose),
        Commands::Pyramid(args) => commands::pyramid::run(args, cli.verbose),
        Commands::Curve(args) => commands::curve::run(args),
    }
}
