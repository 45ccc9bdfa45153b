//! Dominant-color palette extraction and swatch rendering.
//!
//! Extraction is pluggable behind [`PaletteAlgorithm`]: anything that turns
//! an image into `k` ranked RGB triples is acceptable. The production
//! implementation is a deterministic k-means over a subsampled pixel set.
//!
//! Swatch rendering is an owned function of this module — the palette value
//! goes in, an image comes out — so it is unit-testable and there is no
//! global state anywhere.

use image::{Rgb, RgbImage};

/// Ordered dominant colors; index 0 is the most dominant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<[u8; 3]>,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// A dominant-color extraction strategy.
///
/// Must return exactly `count` colors, ordered by dominance rank.
pub trait PaletteAlgorithm: Send + Sync {
    fn extract(&self, image: &RgbImage, count: usize) -> Vec<[u8; 3]>;
}

/// Deterministic k-means clustering in RGB space.
///
/// Pixels are subsampled with a fixed stride (capped at `sample_cap`
/// samples) and centroids are seeded evenly across the sample sequence, so
/// the same image always produces the same palette.
pub struct KMeans {
    pub max_iterations: usize,
    pub sample_cap: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            sample_cap: 16_384,
        }
    }
}

impl PaletteAlgorithm for KMeans {
    fn extract(&self, image: &RgbImage, count: usize) -> Vec<[u8; 3]> {
        let samples = subsample(image, self.sample_cap);
        if samples.is_empty() || count == 0 {
            return Vec::new();
        }

        // Seed centroids evenly across the sample sequence, endpoints included.
        let mut centroids: Vec<[f64; 3]> = (0..count)
            .map(|i| {
                let idx = if count == 1 {
                    0
                } else {
                    i * (samples.len() - 1) / (count - 1)
                };
                let p = samples[idx];
                [p[0] as f64, p[1] as f64, p[2] as f64]
            })
            .collect();

        let mut assignment = vec![0usize; samples.len()];
        for _ in 0..self.max_iterations {
            let mut moved = false;
            for (i, pixel) in samples.iter().enumerate() {
                let nearest = nearest_centroid(pixel, &centroids);
                if assignment[i] != nearest {
                    assignment[i] = nearest;
                    moved = true;
                }
            }

            let mut sums = vec![[0.0f64; 3]; count];
            let mut counts = vec![0usize; count];
            for (pixel, &cluster) in samples.iter().zip(&assignment) {
                for c in 0..3 {
                    sums[cluster][c] += pixel[c] as f64;
                }
                counts[cluster] += 1;
            }
            for (cluster, count) in counts.iter().enumerate() {
                if *count > 0 {
                    for c in 0..3 {
                        centroids[cluster][c] = sums[cluster][c] / *count as f64;
                    }
                }
            }

            if !moved {
                break;
            }
        }

        // Rank clusters by population: most dominant first.
        let mut populations = vec![0usize; count];
        for &cluster in &assignment {
            populations[cluster] += 1;
        }
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| populations[b].cmp(&populations[a]));

        order
            .into_iter()
            .map(|i| {
                [
                    centroids[i][0].round() as u8,
                    centroids[i][1].round() as u8,
                    centroids[i][2].round() as u8,
                ]
            })
            .collect()
    }
}

fn subsample(image: &RgbImage, cap: usize) -> Vec<[u8; 3]> {
    let total = (image.width() as usize) * (image.height() as usize);
    let stride = (total / cap).max(1);
    image
        .pixels()
        .step_by(stride)
        .map(|p| [p[0], p[1], p[2]])
        .collect()
}

fn nearest_centroid(pixel: &[u8; 3], centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (i, c) in centroids.iter().enumerate() {
        let dr = pixel[0] as f64 - c[0];
        let dg = pixel[1] as f64 - c[1];
        let db = pixel[2] as f64 - c[2];
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Extract a `count`-color palette from an image.
pub fn extract_palette(
    image: &RgbImage,
    count: usize,
    algorithm: &dyn PaletteAlgorithm,
) -> Palette {
    Palette {
        colors: algorithm.extract(image, count),
    }
}

/// Render a palette as a horizontal swatch strip sized against the source
/// photo: full image width, 10% of image height.
///
/// Each swatch is `floor(width / k)` pixels wide, drawn left-to-right in
/// rank order; the integer-division remainder extends the last swatch so
/// the strip always spans the full width.
pub fn render_swatch(palette: &Palette, image_width: u32, image_height: u32) -> RgbImage {
    let strip_height = ((image_height as f64) * 0.10).round().max(1.0) as u32;
    let mut strip = RgbImage::from_pixel(image_width, strip_height, Rgb([255, 255, 255]));

    let k = palette.len() as u32;
    if k == 0 {
        return strip;
    }
    let swatch_width = image_width / k;

    for (i, color) in palette.colors.iter().enumerate() {
        let x0 = i as u32 * swatch_width;
        let x1 = if i as u32 == k - 1 {
            image_width
        } else {
            x0 + swatch_width
        };
        for x in x0..x1 {
            for y in 0..strip_height {
                strip.put_pixel(x, y, Rgb(*color));
            }
        }
    }

    strip
}
