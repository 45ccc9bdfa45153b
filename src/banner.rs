//! Metadata banner rendering.
//!
//! Produces the two-line text band that sits above the photo: title or
//! camera identification plus exposure settings on line one, lens and
//! timestamp on line two. Band height and font sizes are fractions of the
//! image dimensions so the banner reads the same at any resolution.
//!
//! The one non-trivial piece is overlap avoidance: text metrics depend on
//! the font, so the fit is a bounded linear search — shrink the bold size
//! one pixel at a time until the left and right runs of line one clear each
//! other (or the floor is reached), then scale the regular size by the same
//! factor so both lines shrink together.

use crate::geometry::scale_to_reference;
use crate::metadata::CameraMetadata;
use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("no usable font found (tried configured paths and system candidates)")]
    NoUsableFont,
}

/// Minimum pixel gap between line-one's left and right text runs.
const OVERLAP_GAP: f32 = 10.0;
/// The fit search never shrinks below this size.
const MIN_FONT_SIZE: u32 = 10;

/// Geometry reference values for the two line offsets (see
/// [`scale_to_reference`]).
const LINE1_REFERENCE: u32 = 50;
const LINE2_REFERENCE: u32 = 250;

/// Bold/regular font size fractions of the band's shorter dimension.
const LANDSCAPE_FRACTIONS: (f64, f64) = (0.30, 0.25);
const PORTRAIT_FRACTIONS: (f64, f64) = (0.236, 0.197);

/// System font fallbacks, tried in order when no font path is configured.
const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman Bold.ttf",
];
const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
];

/// The loaded bold/regular pair used for both banner lines.
pub struct FontSet {
    pub bold: Font<'static>,
    pub regular: Font<'static>,
}

impl FontSet {
    /// Load fonts from the configured paths, falling back through the
    /// system candidate lists. Total failure is recoverable at the caller:
    /// the banner degrades to an un-texted band.
    pub fn load(bold_path: Option<&Path>, regular_path: Option<&Path>) -> Result<Self, FontError> {
        let bold = load_first(bold_path, BOLD_CANDIDATES).ok_or(FontError::NoUsableFont)?;
        let regular = load_first(regular_path, REGULAR_CANDIDATES).ok_or(FontError::NoUsableFont)?;
        Ok(Self { bold, regular })
    }
}

fn load_first(configured: Option<&Path>, candidates: &[&str]) -> Option<Font<'static>> {
    let paths = configured
        .into_iter()
        .map(Path::to_path_buf)
        .chain(candidates.iter().copied().map(std::path::PathBuf::from));

    for path in paths {
        let Ok(data) = std::fs::read(&path) else {
            continue;
        };
        match Font::try_from_vec(data) {
            Some(font) => {
                log::info!("loaded banner font {}", path.display());
                return Some(font);
            }
            None => log::warn!("failed to parse font {}", path.display()),
        }
    }
    None
}

/// The four text runs of the banner, composed before any drawing happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerLines {
    pub first_left: String,
    pub first_right: String,
    pub second_left: String,
    pub second_right: String,
}

/// Compose the banner text from metadata and an optional photo title.
///
/// Line 1 left shows `title (lat° N, lon° E)` when both a title and a full
/// GPS quad exist, otherwise the camera make/model. Line 2 left repeats the
/// camera plus lens when a title claimed line 1, otherwise the lens alone.
/// Absent fields simply produce shorter strings.
pub fn compose_lines(metadata: &CameraMetadata, title: Option<&str>) -> BannerLines {
    let camera = [metadata.make.as_deref(), metadata.model.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let first_left = match (title, metadata.gps.as_ref()) {
        (Some(title), Some(gps)) => format!("{} ({})", title, gps.format_decimal()),
        _ => camera.clone(),
    };

    let mut exposure = Vec::new();
    if let Some(f) = &metadata.f_number {
        exposure.push(format!("f/{f}"));
    }
    if let Some(shutter) = &metadata.shutter_speed {
        exposure.push(format!("{shutter}s"));
    }
    if let Some(iso) = metadata.iso {
        exposure.push(format!("ISO{iso}"));
    }
    let first_right = exposure.join(" ");

    let second_left = match (title, metadata.lens_model.as_deref()) {
        (Some(_), Some(lens)) if !camera.is_empty() => format!("{camera} w/{lens}"),
        (_, Some(lens)) => lens.to_string(),
        (Some(_), None) => camera,
        (None, None) => String::new(),
    };

    let second_right = metadata.date_time_original.clone().unwrap_or_default();

    BannerLines {
        first_left,
        first_right,
        second_left,
        second_right,
    }
}

/// Height of the banner band for an image: 1/11 of the height for
/// landscape, 1/13 for portrait (the narrower width needs a taller band).
pub fn band_height(image_width: u32, image_height: u32) -> u32 {
    if image_width > image_height {
        (image_height / 11).max(1)
    } else {
        (image_height / 13).max(1)
    }
}

/// Shrink the bold font size until line one's runs no longer collide.
///
/// `measure` maps `(size, text)` to rendered width. Returns the final size
/// and the scale factor to apply to the regular font. The result is never
/// above `initial` and never below the floor.
pub fn fit_font_size<F>(
    measure: F,
    left: &str,
    right: &str,
    initial: u32,
    image_width: u32,
) -> (u32, f64)
where
    F: Fn(u32, &str) -> f32,
{
    let mut size = initial.max(1);
    loop {
        let left_end = measure(size, left);
        let right_start = image_width as f32 - measure(size, right);
        if left_end + OVERLAP_GAP < right_start || size <= MIN_FONT_SIZE {
            break;
        }
        size -= 1;
    }
    (size, size as f64 / initial.max(1) as f64)
}

/// Width of a text run at the given scale.
fn text_width(font: &Font, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Rasterize a text run onto the band at `(x, y)` (top-left of the run).
fn draw_text(canvas: &mut RgbImage, text: &str, font: &Font, scale: Scale, x: i32, y: i32) {
    let ascent = font.v_metrics(scale).ascent;
    for glyph in font.layout(text, scale, point(0.0, ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = x + gx as i32 + bb.min.x;
                let py = y + gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= canvas.width() as i32 || py >= canvas.height() as i32 {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                // Blend black text over the white band by coverage.
                for c in pixel.0.iter_mut() {
                    *c = (*c as f32 * (1.0 - coverage)) as u8;
                }
            });
        }
    }
}

/// Render the banner band for an image.
///
/// With no usable fonts the band is returned blank — a degraded but valid
/// banner; the caller has already logged the condition.
pub fn render_banner(
    metadata: &CameraMetadata,
    title: Option<&str>,
    image_width: u32,
    image_height: u32,
    fonts: Option<&FontSet>,
) -> RgbImage {
    let height = band_height(image_width, image_height);
    let mut band = RgbImage::from_pixel(image_width, height, Rgb([255, 255, 255]));

    let Some(fonts) = fonts else {
        return band;
    };

    let (bold_fraction, regular_fraction) = if image_width > image_height {
        LANDSCAPE_FRACTIONS
    } else {
        PORTRAIT_FRACTIONS
    };
    let band_min = image_width.min(height) as f64;
    let initial_bold = (band_min * bold_fraction) as u32;
    let initial_regular = (band_min * regular_fraction) as u32;

    let lines = compose_lines(metadata, title);
    log::debug!(
        "banner lines: {:?} | {:?} / {:?} | {:?}",
        lines.first_left,
        lines.first_right,
        lines.second_left,
        lines.second_right
    );

    let (bold_size, scale_factor) = fit_font_size(
        |size, text| text_width(&fonts.bold, Scale::uniform(size as f32), text),
        &lines.first_left,
        &lines.first_right,
        initial_bold,
        image_width,
    );
    let regular_size = ((initial_regular as f64 * scale_factor) as u32).max(MIN_FONT_SIZE);

    let bold_scale = Scale::uniform(bold_size as f32);
    let regular_scale = Scale::uniform(regular_size as f32);

    let line1_y = scale_to_reference(image_width, image_height, LINE1_REFERENCE) as i32;
    let line2_y = scale_to_reference(image_width, image_height, LINE2_REFERENCE) as i32;

    draw_text(&mut band, &lines.first_left, &fonts.bold, bold_scale, 0, line1_y);
    let right_width = text_width(&fonts.bold, bold_scale, &lines.first_right);
    draw_text(
        &mut band,
        &lines.first_right,
        &fonts.bold,
        bold_scale,
        image_width as i32 - right_width.ceil() as i32,
        line1_y,
    );

    draw_text(
        &mut band,
        &lines.second_left,
        &fonts.regular,
        regular_scale,
        0,
        line2_y,
    );
    let right_width = text_width(&fonts.regular, regular_scale, &lines.second_right);
    draw_text(
        &mut band,
        &lines.second_right,
        &fonts.regular,
        regular_scale,
        image_width as i32 - right_width.ceil() as i32,
        line2_y,
    );

    band
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_metadata;
    use crate::types::Coordinate;

    // =========================================================================
    // Text composition
    // =========================================================================

    #[test]
    fn title_with_gps_claims_first_line() {
        let meta = sample_metadata(Coordinate::new(46.4975, 7.7149));
        let lines = compose_lines(&meta, Some("Lake Oeschinensee"));
        assert!(lines.first_left.starts_with("Lake Oeschinensee (46.4975"));
        assert_eq!(lines.second_left, "FUJIFILM X-T5 w/XF16-55mmF2.8");
    }

    #[test]
    fn no_title_falls_back_to_camera() {
        let meta = sample_metadata(Coordinate::new(46.4975, 7.7149));
        let lines = compose_lines(&meta, None);
        assert_eq!(lines.first_left, "FUJIFILM X-T5");
        assert_eq!(lines.second_left, "XF16-55mmF2.8");
    }

    #[test]
    fn title_without_gps_falls_back_to_camera() {
        let meta = sample_metadata(None);
        let lines = compose_lines(&meta, Some("Lakeview"));
        assert_eq!(lines.first_left, "FUJIFILM X-T5");
        // The title was supplied, so line 2 still carries the full kit.
        assert_eq!(lines.second_left, "FUJIFILM X-T5 w/XF16-55mmF2.8");
    }

    #[test]
    fn exposure_line_format() {
        let meta = sample_metadata(None);
        let lines = compose_lines(&meta, None);
        assert_eq!(lines.first_right, "f/8 1/250s ISO125");
    }

    #[test]
    fn absent_fields_shorten_the_line() {
        let mut meta = sample_metadata(None);
        meta.f_number = None;
        meta.lens_model = None;
        let lines = compose_lines(&meta, None);
        assert_eq!(lines.first_right, "1/250s ISO125");
        assert_eq!(lines.second_left, "");
    }

    #[test]
    fn timestamp_fills_second_right() {
        let meta = sample_metadata(None);
        let lines = compose_lines(&meta, None);
        assert_eq!(lines.second_right, "2024:06:11 08:30:25");
    }

    // =========================================================================
    // Band geometry
    // =========================================================================

    #[test]
    fn band_height_by_orientation() {
        assert_eq!(band_height(7728, 5152), 5152 / 11);
        assert_eq!(band_height(5152, 7728), 7728 / 13);
    }

    #[test]
    fn blank_band_without_fonts() {
        let meta = sample_metadata(None);
        let band = render_banner(&meta, None, 1100, 733, None);
        assert_eq!(band.width(), 1100);
        assert_eq!(band.height(), 733 / 11);
        assert_eq!(*band.get_pixel(550, 20), Rgb([255, 255, 255]));
    }

    // =========================================================================
    // Overlap avoidance (font-independent via the measure seam)
    // =========================================================================

    /// Fake monospace metrics: each glyph is 60% of the size wide.
    fn mono(size: u32, text: &str) -> f32 {
        size as f32 * 0.6 * text.len() as f32
    }

    #[test]
    fn fit_keeps_initial_size_when_lines_clear() {
        let (size, factor) = fit_font_size(mono, "short", "also short", 40, 4000);
        assert_eq!(size, 40);
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn fit_shrinks_until_no_overlap() {
        let left = "a very long left hand run of banner text";
        let right = "f/8 1/250s ISO125";
        let (size, factor) = fit_font_size(mono, left, right, 40, 1200);
        assert!(size < 40);
        assert!(size >= MIN_FONT_SIZE);
        // The fitted size actually clears the gap.
        assert!(mono(size, left) + OVERLAP_GAP < 1200.0 - mono(size, right));
        assert!((factor - size as f64 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn fit_never_goes_below_floor() {
        let left = "x".repeat(500);
        let (size, _) = fit_font_size(mono, &left, &left, 60, 300);
        assert_eq!(size, MIN_FONT_SIZE);
    }

    #[test]
    fn fit_never_exceeds_initial() {
        let (size, factor) = fit_font_size(mono, "", "", 25, 10_000);
        assert_eq!(size, 25);
        assert!(factor <= 1.0);
    }
}
