//! Pure calculation functions for proportional sizing.
//!
//! All spacing in the composed image — border thickness, banner line
//! offsets, inter-section whitespace — is derived from one reference canvas
//! so that output looks identical across resolutions. Every caller must go
//! through [`scale_to_reference`]; a second formula anywhere else would
//! break visual consistency between small exports and full-size scans.

use crate::types::AspectRatio;

/// Reference canvas: a 40 MP 3:2 frame. A border of 750 px on this canvas
/// is the baseline all other values scale against.
pub const REFERENCE_WIDTH: u32 = 7728;
pub const REFERENCE_HEIGHT: u32 = 5152;

/// Scale a reference measurement to an image's resolution.
///
/// The proportion is taken on the *shorter* dimension of each canvas, so a
/// crop or rotation does not change the result:
/// `floor(reference_value * min(w, h) / min(REF_W, REF_H))`.
pub fn scale_to_reference(image_width: u32, image_height: u32, reference_value: u32) -> u32 {
    let image_min = image_width.min(image_height) as f64;
    let ref_min = REFERENCE_WIDTH.min(REFERENCE_HEIGHT) as f64;
    (reference_value as f64 * (image_min / ref_min)) as u32
}

/// Reduce pixel dimensions to their simplest integer ratio.
pub fn reduced_aspect_ratio(width: u32, height: u32) -> AspectRatio {
    let d = gcd(width, height);
    AspectRatio::new(width / d, height / d)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_canvas_is_identity() {
        // The 40 MP reference frame gets the reference value back unchanged.
        assert_eq!(scale_to_reference(7728, 5152, 750), 750);
        assert_eq!(scale_to_reference(7728, 5152, 300), 300);
    }

    #[test]
    fn scales_linearly_with_shorter_dimension() {
        let half = scale_to_reference(3864, 2576, 750);
        let full = scale_to_reference(7728, 5152, 750);
        assert_eq!(full, half * 2);
    }

    #[test]
    fn doubling_dimensions_doubles_result() {
        let base = scale_to_reference(3000, 2000, 400);
        let doubled = scale_to_reference(6000, 4000, 400);
        // Within integer rounding of one unit.
        assert!((doubled as i64 - 2 * base as i64).abs() <= 1);
    }

    #[test]
    fn orientation_does_not_matter() {
        assert_eq!(
            scale_to_reference(5152, 7728, 600),
            scale_to_reference(7728, 5152, 600)
        );
    }

    #[test]
    fn truncates_toward_zero() {
        // 100/5152 * 750 = 14.557… → 14
        assert_eq!(scale_to_reference(100, 200, 750), 14);
    }

    #[test]
    fn reduces_common_sensor_ratios() {
        assert_eq!(reduced_aspect_ratio(7728, 5152), AspectRatio::new(3, 2));
        assert_eq!(reduced_aspect_ratio(4000, 3000), AspectRatio::new(4, 3));
        assert_eq!(reduced_aspect_ratio(1920, 1080), AspectRatio::new(16, 9));
    }

    #[test]
    fn reduce_of_coprime_pair_is_unchanged() {
        assert_eq!(reduced_aspect_ratio(1021, 769), AspectRatio::new(1021, 769));
    }
}
