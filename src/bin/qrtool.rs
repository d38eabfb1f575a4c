use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_qr_reader::encode::render_png;
use rust_qr_reader::normalizer::normalize;
use rust_qr_reader::tools::{
    FileOutcome, bench_limit_from_env, binary_stats, dataset_iter, dataset_root_from_env,
    decode_files, grayscale_stats, is_binary, smoke_from_env,
};
use rust_qr_reader::{
    AttemptOutcome, DecodePipeline, DecodeResult, PipelineConfig, RqrrDetector, Stage,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const TROUBLESHOOTING_TIPS: &str = "\
Troubleshooting tips:
  - Ensure the QR code is clearly visible
  - Check that the image is well-lit and focused
  - Try a different image format
  - Make sure the QR code has good contrast";

#[derive(Parser)]
#[command(name = "qrtool", version, about = "Decode and generate QR codes")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the QR code in a single image
    Decode {
        #[arg(long)]
        image: PathBuf,
    },
    /// Show every stage attempt and buffer statistics for an image
    Inspect {
        #[arg(long)]
        image: PathBuf,
    },
    /// Render text as a PNG QR code
    Generate {
        #[arg(long)]
        text: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Decode every image under a directory in parallel and report the reading rate
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        smoke: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pipeline = DecodePipeline::with_config(RqrrDetector, PipelineConfig::from_env())
        .context("invalid pipeline configuration")?;

    match cli.command {
        Command::Decode { image } => decode_cmd(&pipeline, &image),
        Command::Inspect { image } => inspect_cmd(&pipeline, &image),
        Command::Generate { text, out } => generate_cmd(&text, &out),
        Command::Batch { root, limit, smoke } => batch_cmd(&pipeline, root, limit, smoke),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn decode_cmd(pipeline: &DecodePipeline, image: &Path) -> Result<ExitCode> {
    let bytes = read_image(image)?;
    let result = pipeline
        .decode(&bytes)
        .with_context(|| format!("{} is not a readable image", image.display()))?;

    match result {
        DecodeResult::Found(payload) => {
            match payload.as_str() {
                Some(text) => println!("{text}"),
                None => println!(
                    "{} (binary, {} bytes)",
                    payload.to_text_lossy(),
                    payload.as_bytes().len()
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        DecodeResult::NotFound => {
            eprintln!("No QR code found in {}", image.display());
            eprintln!("{TROUBLESHOOTING_TIPS}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn inspect_cmd(pipeline: &DecodePipeline, image: &Path) -> Result<ExitCode> {
    let bytes = read_image(image)?;
    let buffer = normalize(&bytes, pipeline.config().max_dimension)
        .with_context(|| format!("{} is not a readable image", image.display()))?;

    println!("Image: {} ({}x{})", image.display(), buffer.width(), buffer.height());
    let gray = grayscale_stats(buffer.to_luma().as_raw());
    println!(
        "Grayscale range: {}-{}, average: {}",
        gray.min, gray.max, gray.avg
    );

    for &stage in &pipeline.config().stages {
        match stage.apply(&buffer, pipeline.config()) {
            Ok(out) if is_binary(&out) => {
                let stats = binary_stats(out.as_raw());
                println!(
                    "  {:<20} dark_pixels={} total={} dark_ratio={:.2}%",
                    stage.name(),
                    stats.dark_pixels,
                    stats.total_pixels,
                    stats.dark_ratio * 100.0
                );
            }
            Ok(_) => println!("  {:<20} passthrough", stage.name()),
            Err(err) => println!("  {:<20} transform failed: {err}", stage.name()),
        }
    }

    let report = pipeline.run(&buffer);
    println!("Attempts:");
    for attempt in &report.attempts {
        let outcome = match &attempt.outcome {
            AttemptOutcome::Found => "found".to_string(),
            AttemptOutcome::NotFound => "not found".to_string(),
            AttemptOutcome::Failed(err) => format!("failed ({err})"),
        };
        println!(
            "  {:<20} {} ({:.2?})",
            attempt.stage.name(),
            outcome,
            attempt.elapsed
        );
    }

    match (&report.result, report.winning_stage()) {
        (DecodeResult::Found(payload), Some(stage)) => {
            println!("Decoded by {stage}: {payload}");
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            println!("No QR code found after {} stages", report.attempts.len());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn generate_cmd(text: &str, out: &Path) -> Result<ExitCode> {
    if text.is_empty() {
        bail!("refusing to generate a QR code for empty content");
    }
    let png = render_png(text.as_bytes()).context("failed to render QR code")?;
    std::fs::write(out, png).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(ExitCode::SUCCESS)
}

fn batch_cmd(
    pipeline: &DecodePipeline,
    root: Option<PathBuf>,
    limit: Option<usize>,
    smoke: bool,
) -> Result<ExitCode> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let smoke = smoke || smoke_from_env();

    if !root.exists() {
        bail!("dataset root not found: {}", root.display());
    }

    let images: Vec<PathBuf> = dataset_iter(&root, limit, smoke).collect();
    if images.is_empty() {
        println!("No images found under {}", root.display());
        return Ok(ExitCode::SUCCESS);
    }

    let start = Instant::now();
    let outcomes = decode_files(pipeline, &images);
    let elapsed = start.elapsed();

    let mut hits = 0usize;
    for (i, (path, outcome)) in images.iter().zip(&outcomes).enumerate() {
        let status = match outcome {
            FileOutcome::Hit(_) => {
                hits += 1;
                "hit".to_string()
            }
            FileOutcome::Miss => "miss".to_string(),
            FileOutcome::LoadFailed(err) => format!("load_failed ({err})"),
        };
        println!("  [{}] {} -> {}", i + 1, path.display(), status);
    }

    let rate = hits as f64 / images.len() as f64 * 100.0;
    println!(
        "Reading rate: {}/{} = {:.2}% ({:.2?} total, stages: {})",
        hits,
        images.len(),
        rate,
        elapsed,
        pipeline
            .config()
            .stages
            .iter()
            .map(Stage::name)
            .collect::<Vec<_>>()
            .join(",")
    );
    Ok(ExitCode::SUCCESS)
}
