use anyhow::{Context, Result, bail};
use clap::Parser;
use image::{ImageBuffer, Rgb32FImage, RgbImage};
use log::info;
use phosphor_crt::config;
use phosphor_crt::{Color, ParallelPipeline, ParameterSet, PhosphorPipeline};
use std::path::PathBuf;
use std::sync::Arc;

/// Renders still images through the CRT phosphor effect, one PNG per frame.
#[derive(Parser, Debug)]
#[command(name = "phosphor_tester", version)]
struct Args {
    /// Source image (any format the `image` crate can decode).
    input: PathBuf,

    /// Output path; `{frame}` is replaced by the zero-padded frame counter.
    #[arg(short, long, default_value = "phosphor_{frame}.png")]
    output: String,

    /// Number of frames to render.
    #[arg(short = 'n', long, default_value_t = 4)]
    frames: u64,

    /// Frame counter of the first rendered frame.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// TOML parameter file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset override (manual, flat_srgb, vibrant, quick_phosphor).
    #[arg(short, long)]
    preset: Option<String>,

    /// Render row bands on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Print the effective parameters as TOML and exit.
    #[arg(long)]
    dump_config: bool,

    /// Print this many samples of the decay curve and exit.
    #[arg(long)]
    decay_curve: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // --- 1. Parameters ---
    let mut parameters = match &args.config {
        Some(path) => config::load_parameters(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => ParameterSet::default(),
    };
    if let Some(name) = &args.preset {
        parameters.preset = config::parse_preset(name)?;
    }
    let parameters = parameters.clamped();

    let pipeline = PhosphorPipeline::new(parameters.clone());

    if args.dump_config {
        print!("{}", config::to_toml_string(pipeline.parameters())?);
        return Ok(());
    }
    if let Some(samples) = args.decay_curve {
        for (phase, decay) in pipeline.decay_curve(samples) {
            println!("{phase:.4}\t{:.6}\t{:.6}\t{:.6}", decay.red, decay.green, decay.blue);
        }
        return Ok(());
    }

    if args.frames > 1 && !args.output.contains("{frame}") {
        bail!("Output pattern must contain {{frame}} when rendering more than one frame");
    }

    // --- 2. Source ---
    let source = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?
        .to_rgb32f();
    let (width, height) = source.dimensions();
    info!("Loaded {} ({width}x{height})", args.input.display());

    // --- 3. Render Loop ---
    let parallel = args.parallel.then(|| ParallelPipeline::new(parameters));
    let source = Arc::new(source);

    for frame_counter in frame_range(args.start, args.frames) {
        let rendered = match &parallel {
            Some(parallel) => parallel.process_frame(Arc::clone(&source), frame_counter).await?,
            None => pipeline.process_frame(&source, frame_counter),
        };

        let path = args.output.replace("{frame}", &format!("{frame_counter:05}"));
        to_rgb8(&rendered)
            .save(&path)
            .with_context(|| format!("Failed to write {path}"))?;
        info!(
            "Frame {frame_counter} (phase {:.3}) -> {path}",
            pipeline.frame_timing(frame_counter).decay_phase
        );
    }

    info!("Processing complete.");
    Ok(())
}

/// Counters to render, stopping at `u64::MAX` instead of overflowing.
fn frame_range(start: u64, frames: u64) -> std::ops::Range<u64> {
    start..start.saturating_add(frames)
}

fn to_rgb8(frame: &Rgb32FImage) -> RgbImage {
    ImageBuffer::from_fn(frame.width(), frame.height(), |x, y| {
        Color::from(*frame.get_pixel(x, y)).to_rgb8()
    })
}
