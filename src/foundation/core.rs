pub use kurbo::{Affine, Point, Vec2};

/// Normalized (0..1) position of a facial keypoint within its source image.
///
/// Normalized coordinates are meaningless on their own; they must be
/// de-normalized with the originating image's dimensions before any geometry
/// is computed on them.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keypoint {
    /// Horizontal position as a fraction of image width.
    pub x: f32,
    /// Vertical position as a fraction of image height.
    pub y: f32,
}

impl Keypoint {
    /// Create a keypoint from normalized coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// De-normalize into pixel coordinates using the source image dimensions.
    pub fn to_pixels(self, width: u32, height: u32) -> Point {
        Point::new(
            f64::from(self.x) * f64::from(width),
            f64::from(self.y) * f64::from(height),
        )
    }
}

/// A left/right eye pair in absolute pixel coordinates.
///
/// The reference pair of a batch run is one of these, established from the
/// first usable frame and immutable for the rest of the run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EyePair {
    /// Left-eye pupil center.
    pub left: Point,
    /// Right-eye pupil center.
    pub right: Point,
}

impl EyePair {
    /// Create a pair from pixel positions.
    pub fn new(left: Point, right: Point) -> Self {
        Self { left, right }
    }

    /// Midpoint between the two eyes.
    pub fn midpoint(&self) -> Point {
        ((self.left.to_vec2() + self.right.to_vec2()) * 0.5).to_point()
    }

    /// Euclidean distance between the two eyes.
    pub fn distance(&self) -> f64 {
        self.left.distance(self.right)
    }

    /// Angle of the left-to-right eye vector in radians, `atan2(dy, dx)`.
    ///
    /// Zero means the eyes are level in image space.
    pub fn angle(&self) -> f64 {
        let v = self.right - self.left;
        v.y.atan2(v.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypoint_denormalizes_with_image_dimensions() {
        let kp = Keypoint::new(0.25, 0.5);
        let p = kp.to_pixels(400, 200);
        assert_eq!(p, Point::new(100.0, 100.0));
    }

    #[test]
    fn eye_pair_geometry() {
        let eyes = EyePair::new(Point::new(100.0, 200.0), Point::new(160.0, 280.0));
        assert_eq!(eyes.midpoint(), Point::new(130.0, 240.0));
        assert!((eyes.distance() - 100.0).abs() < 1e-12);
        assert!((eyes.angle() - (80.0f64).atan2(60.0)).abs() < 1e-12);
    }

    #[test]
    fn level_eyes_have_zero_angle() {
        let eyes = EyePair::new(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
        assert_eq!(eyes.angle(), 0.0);
    }
}
