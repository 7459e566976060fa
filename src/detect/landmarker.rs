use std::collections::VecDeque;

use image::RgbImage;

use crate::foundation::core::{EyePair, Keypoint};
use crate::foundation::error::EyelockResult;

/// Number of keypoints in the 478-point attention-mesh topology this crate
/// assumes. Models with fewer points cannot provide the iris centers below.
pub const LANDMARK_COUNT: usize = 478;

/// Keypoint index of the left iris center in the attention-mesh topology.
pub const LEFT_EYE_CENTER: usize = 468;

/// Keypoint index of the right iris center in the attention-mesh topology.
pub const RIGHT_EYE_CENTER: usize = 473;

/// One detected face's keypoint set, in normalized image coordinates.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FaceLandmarks {
    /// Keypoints indexed by the attention-mesh scheme.
    pub points: Vec<Keypoint>,
}

impl FaceLandmarks {
    /// Wrap a raw keypoint set.
    pub fn new(points: Vec<Keypoint>) -> Self {
        Self { points }
    }

    /// Synthetic landmark set with only the two iris centers populated.
    ///
    /// Intended for tests and scripted detectors.
    pub fn with_eyes(left: Keypoint, right: Keypoint) -> Self {
        let mut points = vec![Keypoint::new(0.0, 0.0); LANDMARK_COUNT];
        points[LEFT_EYE_CENTER] = left;
        points[RIGHT_EYE_CENTER] = right;
        Self { points }
    }

    /// The iris-center pair de-normalized into pixel coordinates, or `None`
    /// when the set is too small to contain the iris points.
    pub fn eye_pair(&self, width: u32, height: u32) -> Option<EyePair> {
        let left = self.points.get(LEFT_EYE_CENTER)?;
        let right = self.points.get(RIGHT_EYE_CENTER)?;
        Some(EyePair::new(
            left.to_pixels(width, height),
            right.to_pixels(width, height),
        ))
    }
}

/// Facial-keypoint detection capability.
///
/// Implementations are stateful (they hold loaded model weights) and are
/// reused sequentially across frames and runs; they are not required to be
/// thread-safe. An image with no face yields `Ok(vec![])`, never an error.
pub trait FaceLandmarker {
    /// Detect faces in a decoded image, one keypoint set per face.
    fn detect(&mut self, image: &RgbImage) -> EyelockResult<Vec<FaceLandmarks>>;
}

/// Scripted detector for tests and debugging.
///
/// Returns the queued result sets in call order; once the queue is exhausted
/// it reports no faces.
#[derive(Debug, Default)]
pub struct ScriptedLandmarker {
    queue: VecDeque<Vec<FaceLandmarks>>,
    calls: usize,
}

impl ScriptedLandmarker {
    /// Queue one result set per expected `detect` call.
    pub fn new(results: impl IntoIterator<Item = Vec<FaceLandmarks>>) -> Self {
        Self {
            queue: results.into_iter().collect(),
            calls: 0,
        }
    }

    /// Number of `detect` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FaceLandmarker for ScriptedLandmarker {
    fn detect(&mut self, _image: &RgbImage) -> EyelockResult<Vec<FaceLandmarks>> {
        self.calls += 1;
        Ok(self.queue.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Point;

    #[test]
    fn with_eyes_places_iris_centers() {
        let lm = FaceLandmarks::with_eyes(Keypoint::new(0.4, 0.5), Keypoint::new(0.6, 0.5));
        let eyes = lm.eye_pair(100, 100).unwrap();
        assert_eq!(eyes.left, Point::new(40.0, 50.0));
        assert_eq!(eyes.right, Point::new(60.0, 50.0));
    }

    #[test]
    fn eye_pair_requires_full_mesh() {
        let lm = FaceLandmarks::new(vec![Keypoint::new(0.5, 0.5); 100]);
        assert!(lm.eye_pair(100, 100).is_none());
    }

    #[test]
    fn scripted_detector_replays_in_order_then_reports_no_faces() {
        let face = FaceLandmarks::with_eyes(Keypoint::new(0.4, 0.5), Keypoint::new(0.6, 0.5));
        let mut det = ScriptedLandmarker::new([vec![face.clone()], vec![], vec![face.clone(), face]]);
        let img = RgbImage::new(2, 2);

        assert_eq!(det.detect(&img).unwrap().len(), 1);
        assert_eq!(det.detect(&img).unwrap().len(), 0);
        assert_eq!(det.detect(&img).unwrap().len(), 2);
        assert_eq!(det.detect(&img).unwrap().len(), 0);
        assert_eq!(det.calls(), 4);
    }
}
