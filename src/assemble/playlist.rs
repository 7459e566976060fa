use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{EyelockError, EyelockResult};
use crate::pipeline::batch::collect_image_files;

/// Ordered list of frame files handed to the video-encoding capability.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    entries: Vec<PathBuf>,
}

impl Playlist {
    /// Build a playlist from every image file in `dir`, sorted
    /// lexicographically by filename.
    ///
    /// Fails with a validation error when the folder holds no frames, so the
    /// caller can distinguish "nothing to encode" from encoder trouble.
    pub fn from_dir(dir: &Path) -> EyelockResult<Self> {
        let entries = collect_image_files(dir)?;
        if entries.is_empty() {
            return Err(EyelockError::validation(format!(
                "no frames found in '{}'",
                dir.display()
            )));
        }
        Ok(Self { entries })
    }

    /// Frame paths in playback order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the playlist holds no frames.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the ffmpeg concat-demuxer list: one `file '<path>'` line per
    /// frame, in playback order.
    pub fn to_concat_list(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "file '{}'",
                escape_concat_path(&entry.display().to_string())
            );
        }
        out
    }

    /// Write the concat list to `path`.
    pub fn write_concat_file(&self, path: &Path) -> EyelockResult<()> {
        std::fs::write(path, self.to_concat_list())
            .with_context(|| format!("write playlist '{}'", path.display()))?;
        Ok(())
    }
}

// The concat demuxer ends a single-quoted string at the next quote; an
// embedded quote becomes '\''.
fn escape_concat_path(path: &str) -> String {
    path.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_list_is_ordered_and_quoted() {
        let playlist = Playlist {
            entries: vec![PathBuf::from("/frames/0000.png"), PathBuf::from("/frames/0002.png")],
        };
        assert_eq!(
            playlist.to_concat_list(),
            "file '/frames/0000.png'\nfile '/frames/0002.png'\n"
        );
    }

    #[test]
    fn single_quotes_in_paths_are_escaped() {
        let playlist = Playlist {
            entries: vec![PathBuf::from("/o'brien/0000.png")],
        };
        assert_eq!(
            playlist.to_concat_list(),
            "file '/o'\\''brien/0000.png'\n"
        );
    }

    #[test]
    fn missing_frame_folder_is_a_validation_error() {
        let err = Playlist::from_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("validation error:"));
    }
}
