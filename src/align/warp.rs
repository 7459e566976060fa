use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::align::similarity::EyeAlignment;
use crate::foundation::error::{EyelockError, EyelockResult};

/// Resample `image` through the alignment onto a `canvas_size` square canvas.
///
/// Bicubic interpolation; canvas pixels with no source coverage stay black.
pub fn warp_into_canvas(
    image: &RgbImage,
    alignment: &EyeAlignment,
    canvas_size: u32,
) -> EyelockResult<RgbImage> {
    // kurbo coefficient order is [xx, yx, xy, yy, x0, y0]; Projection wants
    // a row-major 3x3 of the forward (source-to-canvas) map.
    let [xx, yx, xy, yy, x0, y0] = alignment.affine.as_coeffs();
    let matrix = [
        xx as f32, xy as f32, x0 as f32, //
        yx as f32, yy as f32, y0 as f32, //
        0.0, 0.0, 1.0,
    ];
    let projection = Projection::from_matrix(matrix)
        .ok_or_else(|| EyelockError::alignment("alignment transform is not invertible"))?;

    let mut canvas = RgbImage::new(canvas_size, canvas_size);
    warp_into(
        image,
        &projection,
        Interpolation::Bicubic,
        Rgb([0, 0, 0]),
        &mut canvas,
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{EyePair, Point};

    #[test]
    fn identity_scale_translation_moves_pixels_onto_canvas_center() {
        // Level eyes, reference equal to source: the map is a pure integer
        // translation of (+22, +22), so bicubic sampling is exact.
        let mut src = RgbImage::new(64, 64);
        src.put_pixel(10, 10, Rgb([255, 255, 255]));

        let eyes = EyePair::new(Point::new(8.0, 10.0), Point::new(12.0, 10.0));
        let a = EyeAlignment::compute(eyes, eyes, 64).unwrap();
        let out = warp_into_canvas(&src, &a, 64).unwrap();

        assert_eq!(out.dimensions(), (64, 64));
        assert_eq!(out.get_pixel(32, 32), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(10, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn uncovered_canvas_regions_are_background_fill() {
        let src = RgbImage::from_pixel(8, 8, Rgb([200, 10, 10]));
        let eyes = EyePair::new(Point::new(2.0, 4.0), Point::new(6.0, 4.0));
        let a = EyeAlignment::compute(eyes, eyes, 128).unwrap();
        let out = warp_into_canvas(&src, &a, 128).unwrap();

        // The 8x8 source lands near the center of the 128x128 canvas.
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(127, 127), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(64, 64), &Rgb([200, 10, 10]));
    }
}
