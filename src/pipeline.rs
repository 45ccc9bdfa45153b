//! The per-photo pipeline and its batch driver.
//!
//! A single photo flows strictly sequentially:
//!
//! ```text
//! load + orient → resolve coordinate → metadata → banner
//!                                    ↘ palette  ↗
//!                      stack → padding solve → border → save
//! ```
//!
//! Batches are embarrassingly parallel: photos share no mutable state, so
//! they run on a bounded rayon pool with per-photo failure isolation — one
//! photo's error is reported alongside its siblings' successes and never
//! aborts the batch. Each worker writes its transient palette swatch to its
//! own unique temporary path.

use crate::banner::{self, FontSet};
use crate::compose;
use crate::config::MatteConfig;
use crate::geocode::{GeocodeError, Geocoder, NominatimGeocoder};
use crate::geometry;
use crate::layout::{self, LayoutError};
use crate::metadata::{self, MetadataError};
use crate::naming;
use crate::palette::{KMeans, PaletteAlgorithm};
use crate::types::{Coordinate, PaddingPlan, RatioParseError, RatioRequest};
use image::RgbImage;
use image::imageops;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Structured failure taxonomy for one photo. Fatal per photo; a batch
/// catches these per item.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("metadata: {0}")]
    Metadata(#[from] MetadataError),
    #[error("geocoding: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("{0}")]
    Ratio(#[from] RatioParseError),
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the caller can say about one photo.
#[derive(Debug, Clone)]
pub struct PhotoRequest {
    pub source: PathBuf,
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub title: Option<String>,
    pub ratio: RatioRequest,
    /// Print mode solves for a standard print ratio; plain mode applies a
    /// uniform proportional border instead.
    pub for_print: bool,
}

impl PhotoRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            coordinate: None,
            address: None,
            title: None,
            ratio: RatioRequest::Default,
            for_print: true,
        }
    }
}

/// A successfully composed photo.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPhoto {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Per-photo result distinguishing a write from a policy skip.
#[derive(Debug)]
pub enum PhotoOutcome {
    Written(ProcessedPhoto),
    /// The output path existed and the collision policy said to leave it.
    SkippedExisting,
}

/// Batch result: successes, skips, and failures, each preserving the input
/// order of their members.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub written: Vec<ProcessedPhoto>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, PipelineError)>,
}

/// The composition engine: configuration plus the long-lived collaborators
/// (fonts, geocoder, palette algorithm) shared by all workers.
pub struct Engine {
    config: MatteConfig,
    fonts: Option<FontSet>,
    geocoder: Box<dyn Geocoder>,
    palette: Box<dyn PaletteAlgorithm>,
}

impl Engine {
    /// Build an engine with the production collaborators.
    pub fn new(config: MatteConfig) -> Result<Self, GeocodeError> {
        let geocoder = NominatimGeocoder::new(
            &config.geocoder.endpoint,
            Duration::from_secs(config.geocoder.timeout_secs),
        )?;
        Ok(Self::with_collaborators(
            config,
            Box::new(geocoder),
            Box::new(KMeans::default()),
        ))
    }

    /// Build an engine with injected collaborators.
    pub fn with_collaborators(
        config: MatteConfig,
        geocoder: Box<dyn Geocoder>,
        palette: Box<dyn PaletteAlgorithm>,
    ) -> Self {
        let fonts = match FontSet::load(
            config.fonts.bold.as_deref(),
            config.fonts.regular.as_deref(),
        ) {
            Ok(fonts) => Some(fonts),
            Err(e) => {
                log::warn!("{e}; banners will be rendered without text");
                None
            }
        };
        Self {
            config,
            fonts,
            geocoder,
            palette,
        }
    }

    /// Process one photo into `destination`.
    pub fn process_photo(
        &self,
        request: &PhotoRequest,
        destination: &Path,
    ) -> Result<PhotoOutcome, PipelineError> {
        let source = &request.source;
        log::info!("processing {}", source.display());

        let decoded = image::open(source)?;
        let orientation = metadata::read_orientation(source);
        let photo = apply_orientation(decoded.into_rgb8(), orientation);
        let (width, height) = photo.dimensions();

        // An explicit coordinate pair wins; an address is only geocoded when
        // no pair was given. Neither is fine — the banner degrades.
        let coordinate = match (request.coordinate, request.address.as_deref()) {
            (Some(c), _) => Some(c),
            (None, Some(address)) => Some(self.geocoder.coordinates(address)?),
            (None, None) => None,
        };

        let camera = metadata::read_metadata(source, coordinate)?;

        let banner = banner::render_banner(
            &camera,
            request.title.as_deref(),
            width,
            height,
            self.fonts.as_ref(),
        );

        let palette =
            crate::palette::extract_palette(&photo, self.config.palette_size, self.palette.as_ref());
        let swatch = crate::palette::render_swatch(&palette, width, height);

        // Transient working file, unique per worker; removed on drop.
        let swatch_file = tempfile::Builder::new()
            .prefix("palette-")
            .suffix(".jpg")
            .tempfile()?;
        compose::save_jpeg(&swatch, swatch_file.path(), self.config.jpeg_quality)?;

        let gap = geometry::scale_to_reference(width, height, self.config.stack_gap);
        let (stacked, plan) = compose::stack(&banner, &photo, &swatch, gap);
        log::debug!(
            "stacked {}x{} (banner at {}, photo at {}, palette at {})",
            plan.canvas_width,
            plan.canvas_height,
            plan.banner_y,
            plan.photo_y,
            plan.palette_y
        );

        let padding = if request.for_print {
            let requested = match request.ratio {
                RatioRequest::Default => geometry::reduced_aspect_ratio(width, height),
                RatioRequest::Exact(ratio) => ratio,
            };
            layout::print_padding(
                (width, height),
                (stacked.width(), stacked.height()),
                self.config.print_base_pad,
                Some(requested),
            )?
        } else {
            PaddingPlan::uniform(geometry::scale_to_reference(
                width,
                height,
                self.config.plain_border,
            ))
        };

        let bordered = compose::add_border(&stacked, padding);

        let Some(output_path) =
            naming::resolve_output_path(destination, source, self.config.on_collision)
        else {
            log::info!("skipping {}: output exists", source.display());
            return Ok(PhotoOutcome::SkippedExisting);
        };
        compose::save_jpeg(&bordered, &output_path, self.config.jpeg_quality)?;
        log::info!(
            "wrote {} ({}x{})",
            output_path.display(),
            bordered.width(),
            bordered.height()
        );

        Ok(PhotoOutcome::Written(ProcessedPhoto {
            source: source.clone(),
            output: output_path,
            width: bordered.width(),
            height: bordered.height(),
        }))
    }

    /// Process a batch on the rayon pool with per-photo failure isolation.
    pub fn process_batch(&self, requests: &[PhotoRequest], destination: &Path) -> BatchOutcome {
        let results: Vec<Result<PhotoOutcome, PipelineError>> = requests
            .par_iter()
            .map(|request| self.process_photo(request, destination))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(PhotoOutcome::Written(photo)) => outcome.written.push(photo),
                Ok(PhotoOutcome::SkippedExisting) => outcome.skipped.push(request.source.clone()),
                Err(e) => {
                    log::error!("failed {}: {e}", request.source.display());
                    outcome.failures.push((request.source.clone(), e));
                }
            }
        }
        outcome
    }
}

/// Apply the eight EXIF orientations. Value 1 (and anything unknown) is a
/// no-op; 90° rotations are clockwise.
fn apply_orientation(image: RgbImage, orientation: u16) -> RgbImage {
    match orientation {
        2 => imageops::flip_horizontal(&image),
        3 => imageops::rotate180(&image),
        4 => imageops::flip_vertical(&image),
        5 => imageops::flip_horizontal(&imageops::rotate90(&image)),
        6 => imageops::rotate90(&image),
        7 => imageops::flip_horizontal(&imageops::rotate270(&image)),
        8 => imageops::rotate270(&image),
        _ => image,
    }
}
