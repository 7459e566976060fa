pub mod ffmpeg;
pub mod playlist;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble::ffmpeg::{EncodeJob, VideoEncoder};
use crate::assemble::playlist::Playlist;
use crate::foundation::error::{EyelockError, EyelockResult};

/// Options for [`assemble`].
#[derive(Clone, Debug)]
pub struct AssembleOptions {
    /// Input presentation rate: how many stills are shown per second.
    pub fps_in: f64,
    /// Output container frame rate.
    pub fps_out: u32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            fps_in: 10.0,
            fps_out: 30,
        }
    }
}

impl AssembleOptions {
    /// Reject non-positive or non-finite rates up front.
    pub fn validate(&self) -> EyelockResult<()> {
        if !self.fps_in.is_finite() || self.fps_in <= 0.0 {
            return Err(EyelockError::validation(
                "fps_in must be a positive finite rate",
            ));
        }
        if self.fps_out == 0 {
            return Err(EyelockError::validation("fps_out must be non-zero"));
        }
        Ok(())
    }
}

/// Stitch the frames in `frames_dir` into a video inside `out_dir`.
///
/// Frames are sequenced in lexicographic filename order, which matches the
/// zero-padded numbering the batch pipeline writes even when indices have
/// gaps. The output is named with a fresh random identifier so repeated runs
/// never overwrite each other's artifact. The concat playlist is written next
/// to the output and removed on success; on failure it is kept for
/// diagnostics and any partial output file is removed.
pub fn assemble(
    encoder: &mut dyn VideoEncoder,
    frames_dir: &Path,
    out_dir: &Path,
    opts: &AssembleOptions,
) -> EyelockResult<PathBuf> {
    opts.validate()?;

    let playlist = Playlist::from_dir(frames_dir)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;

    let id = nanoid::nanoid!(6);
    let playlist_path = out_dir.join(format!("{id}.txt"));
    let out_path = out_dir.join(format!("{id}.mp4"));
    playlist.write_concat_file(&playlist_path)?;

    let job = EncodeJob {
        playlist_path: playlist_path.clone(),
        out_path: out_path.clone(),
        fps_in: opts.fps_in,
        fps_out: opts.fps_out,
    };

    match encoder.encode(&job) {
        Ok(()) => {
            let _ = std::fs::remove_file(&playlist_path);
            tracing::info!(
                out = %out_path.display(),
                frames = playlist.len(),
                "timelapse encoded"
            );
            Ok(out_path)
        }
        Err(e) => {
            tracing::error!(
                command = %job.command_line(),
                playlist = %playlist_path.display(),
                "encoding failed"
            );
            // A failed run must not leave a half-written artifact behind.
            let _ = std::fs::remove_file(&out_path);
            Err(e)
        }
    }
}
