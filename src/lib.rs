//! EyeLock aligns a set of face photos so the eyes sit at fixed canvas
//! coordinates across every frame, then stitches the aligned frames into a
//! timelapse MP4.
//!
//! # Pipeline overview
//!
//! 1. **Detect**: a [`FaceLandmarker`] returns zero or more facial keypoint
//!    sets per image
//! 2. **Align**: [`EyeAlignment`] computes the similarity transform that maps
//!    the detected eye pair onto the run's reference pair and recenters it on
//!    a square canvas
//! 3. **Batch**: [`align_batch`] walks the input set in order and writes
//!    numbered PNG frames, skipping unusable images with a recorded reason
//! 4. **Assemble**: [`assemble`] sequences the frames into a playlist and
//!    hands it to a [`VideoEncoder`] (the system `ffmpeg` binary by default)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Injectable capabilities**: the landmark detector and the video encoder
//!   are traits, so pipelines are testable with scripted fakes.
//! - **Skips are non-fatal**: an unusable frame never aborts a batch; every
//!   skip is reported with a reason.
#![forbid(unsafe_code)]

mod align;
mod assemble;
mod detect;
mod foundation;
mod pipeline;

pub use align::similarity::{EyeAlignment, MIN_EYE_DISTANCE_PX};
pub use align::warp::warp_into_canvas;
pub use assemble::ffmpeg::{
    EncodeJob, FfmpegEncoder, RecordingEncoder, VideoEncoder, is_ffmpeg_on_path,
};
pub use assemble::playlist::Playlist;
pub use assemble::{AssembleOptions, assemble};
pub use detect::landmarker::{
    FaceLandmarker, FaceLandmarks, LANDMARK_COUNT, LEFT_EYE_CENTER, RIGHT_EYE_CENTER,
    ScriptedLandmarker,
};
pub use detect::onnx::{OnnxLandmarker, OnnxLandmarkerOptions};
pub use foundation::core::{Affine, EyePair, Keypoint, Point, Vec2};
pub use foundation::error::{EyelockError, EyelockResult};
pub use pipeline::batch::{
    AlignOptions, AlignedFrame, BatchReport, IMAGE_EXTENSIONS, SkipReason, SkippedFrame,
    align_batch, collect_image_files,
};
pub use pipeline::timelapse::{TimelapseOptions, TimelapseOutcome, run_timelapse};
