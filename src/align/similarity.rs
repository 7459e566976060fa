use kurbo::{Affine, Point};

use crate::foundation::core::EyePair;
use crate::foundation::error::{EyelockError, EyelockResult};

/// Inter-eye distances below this many pixels are treated as detector
/// anomalies and rejected, rather than divided by.
pub const MIN_EYE_DISTANCE_PX: f64 = 1e-3;

/// Similarity transform that maps one frame's detected eyes onto the
/// reference pair and recenters the result on a square canvas.
///
/// Built and consumed within a single frame's processing; never reused
/// across frames.
#[derive(Clone, Copy, Debug)]
pub struct EyeAlignment {
    /// Tilt of the source eye vector in radians; the transform rotates by
    /// the opposite amount so the eyes come out level.
    pub angle: f64,
    /// Uniform scale factor: reference eye distance / source eye distance.
    pub scale: f64,
    /// Full source-to-canvas affine map.
    pub affine: Affine,
}

impl EyeAlignment {
    /// Compute the per-frame alignment.
    ///
    /// The affine composes right-to-left:
    /// 1. rotate and uniformly scale about the source eye midpoint, so the
    ///    eye vector becomes horizontal at the reference eye distance
    /// 2. translate the source eye midpoint onto the reference eye midpoint
    /// 3. translate the reference midpoint onto the canvas center, so the
    ///    eyes land at the same canvas pixels whichever frame set the
    ///    reference
    ///
    /// Frames whose inter-eye distance is below [`MIN_EYE_DISTANCE_PX`] are
    /// rejected; the returned coefficients are always finite.
    pub fn compute(eyes: EyePair, reference: EyePair, canvas_size: u32) -> EyelockResult<Self> {
        let eye_dist = eyes.distance();
        if !eye_dist.is_finite() || eye_dist < MIN_EYE_DISTANCE_PX {
            return Err(EyelockError::alignment(format!(
                "inter-eye distance {eye_dist:.6}px is below the {MIN_EYE_DISTANCE_PX}px minimum"
            )));
        }
        let ref_dist = reference.distance();
        if !ref_dist.is_finite() || ref_dist < MIN_EYE_DISTANCE_PX {
            return Err(EyelockError::alignment(format!(
                "reference inter-eye distance {ref_dist:.6}px is below the {MIN_EYE_DISTANCE_PX}px minimum"
            )));
        }

        let angle = eyes.angle();
        let scale = ref_dist / eye_dist;

        let mid = eyes.midpoint();
        let ref_mid = reference.midpoint();
        let center = Point::new(
            f64::from(canvas_size) / 2.0,
            f64::from(canvas_size) / 2.0,
        );

        // kurbo rotation is counter-clockwise in y-up coordinates; image
        // space is y-down, so -angle levels the eye vector.
        let affine = Affine::translate(center - ref_mid)
            * Affine::translate(ref_mid - mid)
            * Affine::rotate_about(-angle, mid)
            * Affine::scale_about(scale, mid);

        debug_assert!(affine.as_coeffs().iter().all(|c| c.is_finite()));
        Ok(Self {
            angle,
            scale,
            affine,
        })
    }

    /// Map a source-pixel position into canvas space.
    pub fn map(&self, p: Point) -> Point {
        self.affine * p
    }
}
