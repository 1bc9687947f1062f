use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use cutguard_core::blurring::infrastructure::blurrer_factory::create_blurrers;
use cutguard_core::editing::domain::edit_config::EditConfig;
use cutguard_core::editing::domain::edit_planner::plan_edit;
use cutguard_core::editing::domain::operation::RawOperation;
use cutguard_core::editing::domain::segment::Timeline;
use cutguard_core::editing::infrastructure::json_source::{load_config, load_operations};
use cutguard_core::pipeline::edit_video_use_case::{EditOutcome, EditVideoUseCase};
use cutguard_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use cutguard_core::shared::constants::{DEFAULT_BLUR_KERNEL, DEFAULT_CRF};
use cutguard_core::video::domain::video_reader::VideoReader;
use cutguard_core::video::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use cutguard_core::video::infrastructure::ffmpeg_audio_writer::FfmpegAudioWriter;
use cutguard_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use cutguard_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Cut or blur moderated intervals of a video, keeping audio in sync.
#[derive(Parser)]
#[command(name = "cutguard")]
struct Cli {
    /// Source video file.
    input: PathBuf,

    /// Output video file (not needed with --plan-only).
    output: Option<PathBuf>,

    /// JSON array of {"timestamp": "HH:MM:SS[.ffffff]", "operation": "blur"|"remove"}.
    #[arg(long)]
    operations: PathBuf,

    /// JSON edit configuration; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds covered by each operation.
    #[arg(long)]
    effect_duration: Option<f64>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Removes closer than this multiple of the effect duration merge.
    #[arg(long)]
    merge_tolerance: Option<f64>,

    /// Kept gaps up to this multiple of the effect duration are dropped.
    #[arg(long)]
    segment_threshold: Option<f64>,

    /// Gaussian blur kernel size (must be odd).
    #[arg(long, default_value_t = DEFAULT_BLUR_KERNEL)]
    blur_strength: usize,

    /// H.264 CRF quality (0=lossless, 51=worst).
    #[arg(long, default_value_t = DEFAULT_CRF)]
    quality: u8,

    /// Blur worker threads (default: available cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Use this file's audio track instead of the source's.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Print the edit plan as JSON and exit without rendering.
    #[arg(long)]
    plan_only: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let operations = load_operations(&cli.operations)?;

    // validate() guarantees an output unless --plan-only is set.
    match cli.output.as_deref() {
        Some(output) if !cli.plan_only => run_edit(&cli, output, &operations, config),
        _ => print_plan(&cli.input, &operations, &config),
    }
}

fn run_edit(
    cli: &Cli,
    output: &Path,
    operations: &[RawOperation],
    config: EditConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let workers = cli.workers.unwrap_or_else(default_workers);
    let writer = FfmpegWriter::new().with_crf(cli.quality);

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rRendering frame {current}/{total}");
        true
    });

    let mut use_case = EditVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(writer),
        Box::new(FfmpegAudioReader),
        Box::new(FfmpegAudioWriter),
        create_blurrers(cli.blur_strength, workers),
        Box::new(ThreadedPipelineExecutor::new()),
        config,
        cli.audio.clone(),
        Some(progress),
        None,
    );
    let outcome = use_case.execute(&cli.input, output, operations)?;
    eprintln!();

    match outcome {
        EditOutcome::Edited(report) => {
            for rejected in &report.rejected {
                log::warn!("Ignored: {rejected}");
            }
            log::info!(
                "Output written to {} ({} segments, {} frames, {:.3}s removed)",
                output.display(),
                report.plan.segments.len(),
                report.stats.frames_written,
                report.plan.removed_duration()
            );
        }
        EditOutcome::FullyRemoved => {
            eprintln!("All content was removed; no output written");
        }
    }
    Ok(())
}

fn print_plan(
    input: &Path,
    operations: &[RawOperation],
    config: &EditConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = FfmpegReader::new();
    let metadata = reader.open(input)?;
    reader.close();

    let timeline = Timeline::from(&metadata);
    let planned = plan_edit(operations, &timeline, config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&planned.summary(timeline))?
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<EditConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EditConfig::default(),
    };
    if let Some(seconds) = cli.effect_duration {
        config = config.with_effect_duration(seconds);
    }
    if let Some(fps) = cli.fps {
        config = config.with_target_fps(fps);
    }
    if let Some(factor) = cli.merge_tolerance {
        config = config.with_merge_tolerance_factor(factor);
    }
    if let Some(factor) = cli.segment_threshold {
        config = config.with_segment_threshold_factor(factor);
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.operations.exists() {
        return Err(format!(
            "Operations file not found: {}",
            cli.operations.display()
        )
        .into());
    }
    if let Some(audio) = &cli.audio {
        if !audio.exists() {
            return Err(format!("Audio file not found: {}", audio.display()).into());
        }
    }
    if !cli.plan_only && cli.output.is_none() {
        return Err("Output file is required unless --plan-only is used".into());
    }
    if cli.blur_strength == 0 || cli.blur_strength % 2 == 0 {
        return Err(format!(
            "Blur strength must be a positive odd integer, got {}",
            cli.blur_strength
        )
        .into());
    }
    if cli.quality > 51 {
        return Err(format!("Quality must be between 0 and 51, got {}", cli.quality).into());
    }
    if cli.workers == Some(0) {
        return Err("Workers must be at least 1".into());
    }
    Ok(())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
