use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{RgbImage, imageops::FilterType};
use ndarray::Array4;
use ort::{GraphOptimizationLevel, Session, SessionOutputs, ValueType, inputs};

use crate::detect::landmarker::{FaceLandmarker, FaceLandmarks, RIGHT_EYE_CENTER};
use crate::foundation::core::Keypoint;
use crate::foundation::error::{EyelockError, EyelockResult};

/// Options for [`OnnxLandmarker`], fixed once per process.
#[derive(Clone, Debug)]
pub struct OnnxLandmarkerOptions {
    /// Path to the face-landmark ONNX model.
    pub model_path: PathBuf,
    /// Maximum number of faces reported per image.
    pub max_faces: usize,
    /// Minimum face-presence score for a detection to be reported, when the
    /// model exposes one as its second output.
    pub min_face_score: f32,
}

impl OnnxLandmarkerOptions {
    /// Defaults: at most 3 faces, presence threshold 0.5.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            max_faces: 3,
            min_face_score: 0.5,
        }
    }
}

/// Face-landmark detector backed by an ONNX model run through `ort`.
///
/// The model is expected to follow the attention-mesh contract: an NHWC
/// float input normalized to 0..1, a landmark tensor of `(x, y, z)` triples
/// in input-pixel units, and optionally a face-presence score as the second
/// output. One inference covers the whole frame, so at most one face is
/// reported per image; `max_faces` caps the reported set all the same.
pub struct OnnxLandmarker {
    session: Session,
    input_name: String,
    output_names: Vec<String>,
    input_size: u32,
    opts: OnnxLandmarkerOptions,
}

impl OnnxLandmarker {
    /// Load the model and read its input geometry.
    pub fn from_options(opts: OnnxLandmarkerOptions) -> EyelockResult<Self> {
        let session = build_session(&opts.model_path).with_context(|| {
            format!(
                "load onnx landmark model '{}'",
                opts.model_path.display()
            )
        })?;

        let input_info = session
            .inputs
            .first()
            .ok_or_else(|| EyelockError::detection("landmark model has no inputs"))?;
        let input_name = input_info.name.to_string();

        let input_size = match &input_info.input_type {
            ValueType::Tensor { dimensions, .. } => dimensions
                .get(1)
                .copied()
                .filter(|d| *d > 0)
                .map(|d| d as u32),
            _ => None,
        }
        .ok_or_else(|| {
            EyelockError::detection("unable to read landmark model input size (expected NHWC)")
        })?;

        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|o| o.name.to_string())
            .collect();
        if output_names.is_empty() {
            return Err(EyelockError::detection("landmark model has no outputs"));
        }

        Ok(Self {
            session,
            input_name,
            output_names,
            input_size,
            opts,
        })
    }

    /// Square model input edge, pixels.
    pub fn input_size(&self) -> u32 {
        self.input_size
    }
}

fn build_session(path: &Path) -> Result<Session, ort::Error> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(path)
}

impl FaceLandmarker for OnnxLandmarker {
    fn detect(&mut self, image: &RgbImage) -> EyelockResult<Vec<FaceLandmarks>> {
        let size = self.input_size;
        let resized = image::imageops::resize(image, size, size, FilterType::Lanczos3);
        let data: Vec<f32> = resized.iter().map(|&v| f32::from(v) / 255.0).collect();
        let input = Array4::from_shape_vec((1, size as usize, size as usize, 3), data)
            .map_err(|e| EyelockError::detection(format!("landmark input tensor shape: {e}")))?;

        let outputs: SessionOutputs = self
            .session
            .run(inputs![self.input_name.as_str() => input.view()].context("bind landmark input")?)
            .context("run landmark model")?;

        // Presence score, when the model provides one.
        if let Some(score_name) = self.output_names.get(1) {
            let binding = outputs[score_name.as_str()]
                .try_extract_tensor::<f32>()
                .context("extract face presence score")?;
            let score = binding.view().iter().copied().next().unwrap_or(0.0);
            if score < self.opts.min_face_score {
                return Ok(vec![]);
            }
        }

        let binding = outputs[self.output_names[0].as_str()]
            .try_extract_tensor::<f32>()
            .context("extract landmark tensor")?;
        let view = binding.view();
        let flat: Vec<f32> = view.iter().copied().collect();

        if flat.is_empty() || !flat.len().is_multiple_of(3) {
            return Err(EyelockError::detection(format!(
                "landmark tensor has {} values, expected (x, y, z) triples",
                flat.len()
            )));
        }
        let count = flat.len() / 3;
        if count <= RIGHT_EYE_CENTER {
            return Err(EyelockError::detection(format!(
                "landmark model returned {count} points, need at least {} for iris centers",
                RIGHT_EYE_CENTER + 1
            )));
        }

        let inv = 1.0 / size as f32;
        let points = flat
            .chunks_exact(3)
            .map(|c| Keypoint::new(c[0] * inv, c[1] * inv))
            .collect();

        let mut faces = vec![FaceLandmarks::new(points)];
        faces.truncate(self.opts.max_faces);
        Ok(faces)
    }
}
