use std::path::PathBuf;

use crate::assemble::ffmpeg::VideoEncoder;
use crate::assemble::{AssembleOptions, assemble};
use crate::detect::landmarker::FaceLandmarker;
use crate::foundation::error::{EyelockError, EyelockResult};
use crate::pipeline::batch::{
    AlignOptions, BatchReport, align_batch, collect_image_files, reset_dir,
};

/// Options for [`run_timelapse`].
#[derive(Clone, Debug)]
pub struct TimelapseOptions {
    /// Folder of source face photos (.jpg, .jpeg, .png).
    pub input_dir: PathBuf,
    /// Working folder for aligned frames. Destructively reset every run.
    pub aligned_dir: PathBuf,
    /// Folder receiving the final video. Destructively reset every run.
    pub output_dir: PathBuf,
    /// How long each image is shown, in seconds.
    pub image_duration_secs: f64,
    /// Square canvas edge for aligned frames.
    pub canvas_size: u32,
    /// Output container frame rate.
    pub fps_out: u32,
}

impl Default for TimelapseOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./selfies"),
            aligned_dir: PathBuf::from("./aligned"),
            output_dir: PathBuf::from("./download"),
            image_duration_secs: 0.1,
            canvas_size: 1024,
            fps_out: 30,
        }
    }
}

/// Outcome of [`run_timelapse`].
#[derive(Debug)]
pub struct TimelapseOutcome {
    /// Path of the encoded video, or `None` when no output was produced
    /// (no usable frames, or the encoder failed).
    pub video: Option<PathBuf>,
    /// Per-frame outcome of the alignment batch.
    pub report: BatchReport,
}

/// Run the whole pipeline: detect, align, export frames, encode.
///
/// A missing input folder or invalid options fail before any output state is
/// touched. `video` comes back `None` when the batch produced no usable
/// frames or when the encoder failed; encoder diagnostics (the attempted
/// command line) go to the log rather than the caller, keeping user-facing
/// messaging simple.
pub fn run_timelapse(
    detector: &mut dyn FaceLandmarker,
    encoder: &mut dyn VideoEncoder,
    opts: &TimelapseOptions,
) -> EyelockResult<TimelapseOutcome> {
    if !opts.image_duration_secs.is_finite() || opts.image_duration_secs <= 0.0 {
        return Err(EyelockError::validation(
            "image duration must be a positive number of seconds",
        ));
    }
    let align_opts = AlignOptions {
        canvas_size: opts.canvas_size,
    };
    align_opts.validate()?;

    let files = collect_image_files(&opts.input_dir)?;

    reset_dir(&opts.output_dir)?;
    let report = align_batch(detector, &files, &opts.aligned_dir, &align_opts)?;

    if report.is_empty() {
        tracing::info!(input = %opts.input_dir.display(), "no usable frames, no video produced");
        return Ok(TimelapseOutcome {
            video: None,
            report,
        });
    }

    // A 0.1s per-image duration corresponds to a 10 fps presentation rate.
    let assemble_opts = AssembleOptions {
        fps_in: opts.image_duration_secs * 100.0,
        fps_out: opts.fps_out,
    };

    match assemble(encoder, &opts.aligned_dir, &opts.output_dir, &assemble_opts) {
        Ok(path) => Ok(TimelapseOutcome {
            video: Some(path),
            report,
        }),
        Err(EyelockError::Encoding(msg)) => {
            tracing::error!(%msg, "video encoding failed, no video produced");
            Ok(TimelapseOutcome {
                video: None,
                report,
            })
        }
        Err(e) => Err(e),
    }
}
