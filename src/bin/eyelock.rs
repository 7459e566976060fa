use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use eyelock::{
    AlignOptions, FfmpegEncoder, OnnxLandmarker, OnnxLandmarkerOptions, TimelapseOptions,
    align_batch, collect_image_files, run_timelapse,
};

#[derive(Parser, Debug)]
#[command(name = "eyelock", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align face photos to fixed eye positions and write numbered frames.
    Align(AlignArgs),
    /// Align a photo folder and encode a timelapse MP4 (requires `ffmpeg` on
    /// PATH).
    Timelapse(TimelapseArgs),
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Folder of input photos (.jpg, .jpeg, .png).
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Output folder for aligned frames. Cleared on every run.
    #[arg(long, default_value = "./aligned")]
    out: PathBuf,

    /// Face-landmark ONNX model path.
    #[arg(long)]
    model: PathBuf,

    /// Square canvas edge in pixels (must be even).
    #[arg(long, default_value_t = 1024)]
    canvas: u32,

    /// Maximum faces reported per image by the detector.
    #[arg(long, default_value_t = 3)]
    max_faces: usize,

    /// Write the batch report (written/skipped frames) as JSON.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TimelapseArgs {
    /// Folder of input photos (.jpg, .jpeg, .png).
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Working folder for aligned frames. Cleared on every run.
    #[arg(long, default_value = "./aligned")]
    frames: PathBuf,

    /// Output folder for the video. Cleared on every run.
    #[arg(long, default_value = "./download")]
    out: PathBuf,

    /// Face-landmark ONNX model path.
    #[arg(long)]
    model: PathBuf,

    /// Seconds each image is shown in the timelapse.
    #[arg(long, default_value_t = 0.1)]
    duration: f64,

    /// Square canvas edge in pixels (must be even).
    #[arg(long, default_value_t = 1024)]
    canvas: u32,

    /// Maximum faces reported per image by the detector.
    #[arg(long, default_value_t = 3)]
    max_faces: usize,

    /// Output container frame rate.
    #[arg(long, default_value_t = 30)]
    fps_out: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Align(args) => cmd_align(args),
        Command::Timelapse(args) => cmd_timelapse(args),
    }
}

fn make_detector(model: &PathBuf, max_faces: usize) -> anyhow::Result<OnnxLandmarker> {
    let mut opts = OnnxLandmarkerOptions::new(model);
    opts.max_faces = max_faces;
    Ok(OnnxLandmarker::from_options(opts)?)
}

fn cmd_align(args: AlignArgs) -> anyhow::Result<()> {
    let mut detector = make_detector(&args.model, args.max_faces)?;
    let files = collect_image_files(&args.in_dir)?;
    let opts = AlignOptions {
        canvas_size: args.canvas,
    };
    let report = align_batch(&mut detector, &files, &args.out, &opts)?;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report).context("serialize batch report")?;
        std::fs::write(path, json)
            .with_context(|| format!("write report '{}'", path.display()))?;
    }

    eprintln!(
        "aligned {} of {} frames into {}",
        report.frames.len(),
        files.len(),
        args.out.display()
    );
    Ok(())
}

fn cmd_timelapse(args: TimelapseArgs) -> anyhow::Result<()> {
    let mut detector = make_detector(&args.model, args.max_faces)?;
    let mut encoder = FfmpegEncoder;
    let opts = TimelapseOptions {
        input_dir: args.in_dir,
        aligned_dir: args.frames,
        output_dir: args.out,
        image_duration_secs: args.duration,
        canvas_size: args.canvas,
        fps_out: args.fps_out,
    };

    let outcome = run_timelapse(&mut detector, &mut encoder, &opts)?;
    match outcome.video {
        Some(path) => eprintln!("wrote {}", path.display()),
        None => eprintln!(
            "no output produced ({} usable frames, {} skipped)",
            outcome.report.frames.len(),
            outcome.report.skipped.len()
        ),
    }
    Ok(())
}
