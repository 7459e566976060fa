use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::align::similarity::EyeAlignment;
use crate::align::warp::warp_into_canvas;
use crate::detect::landmarker::FaceLandmarker;
use crate::foundation::core::EyePair;
use crate::foundation::error::{EyelockError, EyelockResult};

/// Image extensions accepted by the pipeline, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Options for [`align_batch`].
#[derive(Clone, Debug)]
pub struct AlignOptions {
    /// Square output canvas edge, pixels. Must be even: the frames feed a
    /// yuv420p mp4 encode downstream.
    pub canvas_size: u32,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self { canvas_size: 1024 }
    }
}

impl AlignOptions {
    pub fn validate(&self) -> EyelockResult<()> {
        if self.canvas_size == 0 {
            return Err(EyelockError::validation("canvas size must be non-zero"));
        }
        if !self.canvas_size.is_multiple_of(2) {
            return Err(EyelockError::validation(
                "canvas size must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Why an input image produced no output frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum SkipReason {
    #[error("image could not be decoded")]
    Undecodable,
    #[error("no face detected")]
    NoFace,
    #[error("{0} faces detected, need exactly one")]
    MultipleFaces(usize),
    #[error("landmark set too small to contain the iris centers")]
    MissingEyes,
    #[error("degenerate eye geometry: {0}")]
    DegenerateEyes(String),
    #[error("detector failed: {0}")]
    Detector(String),
}

/// One aligned frame written by [`align_batch`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AlignedFrame {
    /// Position of the source image in the input enumeration. Output
    /// numbering keeps gaps where inputs were skipped.
    pub index: usize,
    /// Source image path.
    pub source: PathBuf,
    /// Written frame path, `{index:04}.png` inside the output folder.
    pub path: PathBuf,
}

/// One input image that produced no output frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SkippedFrame {
    /// Position of the source image in the input enumeration.
    pub index: usize,
    /// Source image path.
    pub source: PathBuf,
    /// Why the frame was skipped.
    pub reason: SkipReason,
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct BatchReport {
    /// Frames written, in input order.
    pub frames: Vec<AlignedFrame>,
    /// Inputs skipped, in input order, each with a reason.
    pub skipped: Vec<SkippedFrame>,
    /// Eye positions every frame was aligned onto, taken from the first
    /// usable frame. `None` when the batch had no usable frame.
    pub reference: Option<EyePair>,
}

impl BatchReport {
    /// `true` when the run produced no output frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// All image files directly inside `dir`, sorted by filename.
///
/// A missing or unreadable folder is a fatal precondition, not a skip.
pub fn collect_image_files(dir: &Path) -> EyelockResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(EyelockError::validation(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|x| ext.eq_ignore_ascii_case(x)))
}

/// Destructively reset `dir`: prior contents are lost.
pub(crate) fn reset_dir(dir: &Path) -> EyelockResult<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("clear directory '{}'", dir.display()))?;
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create directory '{}'", dir.display()))?;
    Ok(())
}

enum FrameError {
    Skip(SkipReason),
    Fatal(EyelockError),
}

/// Align every usable input image onto a shared reference eye position and
/// write numbered PNG frames into `out_dir`.
///
/// `out_dir` is destructively reset first. The reference pair comes from the
/// first frame that aligns successfully and stays fixed for the whole run.
/// Frame failures (bad decode, zero or multiple faces, degenerate eye
/// geometry) are non-fatal: each is logged and recorded in the report, and
/// the batch moves on. Output filenames keep the input index, so skipped
/// frames leave gaps in the numbering rather than compacting it.
pub fn align_batch(
    detector: &mut dyn FaceLandmarker,
    files: &[PathBuf],
    out_dir: &Path,
    opts: &AlignOptions,
) -> EyelockResult<BatchReport> {
    opts.validate()?;
    reset_dir(out_dir)?;

    let mut report = BatchReport::default();
    let mut reference: Option<EyePair> = None;

    for (index, source) in files.iter().enumerate() {
        match align_one(detector, source, index, out_dir, opts, &mut reference) {
            Ok(frame) => {
                tracing::debug!(index, path = %frame.path.display(), "aligned frame written");
                report.frames.push(frame);
            }
            Err(FrameError::Skip(reason)) => {
                tracing::warn!(index, source = %source.display(), %reason, "skipping frame");
                report.skipped.push(SkippedFrame {
                    index,
                    source: source.clone(),
                    reason,
                });
            }
            Err(FrameError::Fatal(e)) => return Err(e),
        }
    }

    report.reference = reference;
    tracing::info!(
        written = report.frames.len(),
        skipped = report.skipped.len(),
        "batch alignment finished"
    );
    Ok(report)
}

fn align_one(
    detector: &mut dyn FaceLandmarker,
    source: &Path,
    index: usize,
    out_dir: &Path,
    opts: &AlignOptions,
    reference: &mut Option<EyePair>,
) -> Result<AlignedFrame, FrameError> {
    let image = match image::open(source) {
        Ok(img) => img.to_rgb8(),
        Err(_) => return Err(FrameError::Skip(SkipReason::Undecodable)),
    };
    let (width, height) = image.dimensions();

    let faces = match detector.detect(&image) {
        Ok(faces) => faces,
        Err(e) => return Err(FrameError::Skip(SkipReason::Detector(e.to_string()))),
    };
    let face = match faces.as_slice() {
        [] => return Err(FrameError::Skip(SkipReason::NoFace)),
        [one] => one,
        many => return Err(FrameError::Skip(SkipReason::MultipleFaces(many.len()))),
    };

    let eyes = face
        .eye_pair(width, height)
        .ok_or(FrameError::Skip(SkipReason::MissingEyes))?;

    // A frame that fails the degeneracy check below must not become the
    // reference, so the candidate is only committed after alignment succeeds.
    let reference_pair = reference.unwrap_or(eyes);

    let alignment = match EyeAlignment::compute(eyes, reference_pair, opts.canvas_size) {
        Ok(a) => a,
        Err(e) => return Err(FrameError::Skip(SkipReason::DegenerateEyes(e.to_string()))),
    };
    let canvas = match warp_into_canvas(&image, &alignment, opts.canvas_size) {
        Ok(c) => c,
        Err(e) => return Err(FrameError::Skip(SkipReason::DegenerateEyes(e.to_string()))),
    };

    if reference.is_none() {
        *reference = Some(eyes);
    }

    let out_path = out_dir.join(format!("{index:04}.png"));
    canvas
        .save(&out_path)
        .with_context(|| format!("write frame '{}'", out_path.display()))
        .map_err(|e| FrameError::Fatal(e.into()))?;

    Ok(AlignedFrame {
        index,
        source: source.to_path_buf(),
        path: out_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "eyelock_batch_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn collect_filters_extensions_case_insensitively_and_sorts() {
        let dir = temp_dir("collect");
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.PNG", "a.jpg", "c.jpeg", "notes.txt", "d.gif"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let files = collect_image_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.jpeg"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_folder_is_fatal() {
        let err = collect_image_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("validation error:"));
    }

    #[test]
    fn odd_canvas_size_is_rejected() {
        assert!(AlignOptions { canvas_size: 1024 }.validate().is_ok());
        assert!(AlignOptions { canvas_size: 1023 }.validate().is_err());
        assert!(AlignOptions { canvas_size: 0 }.validate().is_err());
    }
}
