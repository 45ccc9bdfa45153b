//! Compositing: stacking the three sections and applying the final border.
//!
//! The compositor owns the blank canvas. Sections are pasted at the offsets
//! recorded in the returned [`LayoutPlan`], which downstream code (and the
//! tests) can check against the no-overlap invariant without re-deriving
//! the arithmetic.

use crate::types::{LayoutPlan, PaddingPlan};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, imageops};
use std::io::BufWriter;
use std::path::Path;

/// Borders and section gaps are white, matching a gallery matte.
const MATTE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Stack banner, photo, and palette vertically on a white canvas, with a
/// whitespace gap between photo and palette.
pub fn stack(
    banner: &RgbImage,
    photo: &RgbImage,
    palette: &RgbImage,
    gap: u32,
) -> (RgbImage, LayoutPlan) {
    let width = photo.width();
    let plan = LayoutPlan {
        canvas_width: width,
        canvas_height: banner.height() + photo.height() + gap + palette.height(),
        banner_y: 0,
        photo_y: banner.height(),
        palette_y: banner.height() + photo.height() + gap,
    };

    let mut canvas = RgbImage::from_pixel(plan.canvas_width, plan.canvas_height, MATTE_COLOR);
    imageops::overlay(&mut canvas, banner, 0, plan.banner_y as i64);
    imageops::overlay(&mut canvas, photo, 0, plan.photo_y as i64);
    imageops::overlay(&mut canvas, palette, 0, plan.palette_y as i64);

    (canvas, plan)
}

/// Expand the canvas by the padding plan, filling the new border white.
pub fn add_border(image: &RgbImage, plan: PaddingPlan) -> RgbImage {
    let (width, height) = plan.apply_to(image.width(), image.height());
    let mut bordered = RgbImage::from_pixel(width, height, MATTE_COLOR);
    imageops::overlay(
        &mut bordered,
        image,
        plan.horizontal as i64,
        plan.vertical as i64,
    );
    bordered
}

/// Persist the composed image as a maximum-quality JPEG.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), image::ImageError> {
    let file = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
    let writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(writer, quality).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )
}
