use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::foundation::error::{EyelockError, EyelockResult};

/// One encoder invocation: an ordered playlist plus timing parameters.
#[derive(Clone, Debug)]
pub struct EncodeJob {
    /// Path to the concat list describing the frames in playback order.
    pub playlist_path: PathBuf,
    /// Final video artifact path.
    pub out_path: PathBuf,
    /// Input presentation rate (how long each still is shown).
    pub fps_in: f64,
    /// Output container frame rate.
    pub fps_out: u32,
}

impl EncodeJob {
    /// Arguments passed to `ffmpeg`, in order.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-r".into(),
            self.fps_in.to_string(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            self.playlist_path.display().to_string(),
            "-c:v".into(),
            "libx264".into(),
            "-r".into(),
            self.fps_out.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            self.out_path.display().to_string(),
        ]
    }

    /// Full command line, for diagnostics when an encode fails.
    pub fn command_line(&self) -> String {
        let mut s = String::from("ffmpeg");
        for arg in self.ffmpeg_args() {
            s.push(' ');
            s.push_str(&arg);
        }
        s
    }
}

/// Video-encoding capability.
///
/// Injected into the assembler so tests can substitute a fake and assert on
/// the attempted parameters without running a real encode.
pub trait VideoEncoder {
    /// Encode the job's playlist into its output path, or fail.
    fn encode(&mut self, job: &EncodeJob) -> EyelockResult<()>;
}

/// `true` when an `ffmpeg` binary responds on PATH.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Encoder backed by the system `ffmpeg` binary.
///
/// We intentionally shell out to the system binary rather than link FFmpeg,
/// to avoid native dev header/lib requirements.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegEncoder;

impl VideoEncoder for FfmpegEncoder {
    fn encode(&mut self, job: &EncodeJob) -> EyelockResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(EyelockError::encoding(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let output = Command::new("ffmpeg")
            .args(job.ffmpeg_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| EyelockError::encoding(format!("failed to spawn ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EyelockError::encoding(format!(
                "ffmpeg exited with status {}: {} (command: {})",
                output.status,
                stderr.trim(),
                job.command_line()
            )));
        }
        Ok(())
    }
}

/// Recording encoder for tests and debugging: captures every job and
/// optionally fails each one.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    jobs: Vec<EncodeJob>,
    fail: bool,
}

impl RecordingEncoder {
    /// Encoder that accepts every job.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder that records and then rejects every job.
    pub fn failing() -> Self {
        Self {
            jobs: Vec::new(),
            fail: true,
        }
    }

    /// Jobs captured so far, in call order.
    pub fn jobs(&self) -> &[EncodeJob] {
        &self.jobs
    }
}

impl VideoEncoder for RecordingEncoder {
    fn encode(&mut self, job: &EncodeJob) -> EyelockResult<()> {
        self.jobs.push(job.clone());
        if self.fail {
            return Err(EyelockError::encoding(format!(
                "scripted encoder failure (command: {})",
                job.command_line()
            )));
        }
        Ok(())
    }
}
