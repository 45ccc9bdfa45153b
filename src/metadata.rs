//! Camera metadata extraction and normalization.
//!
//! Reads the embedded EXIF block and produces a [`CameraMetadata`] record
//! with an explicit `Option` per field — absence is typed, never a missing
//! key, so every consumer handles it at compile time.
//!
//! Three normalizations happen here and nowhere else:
//!
//! - **Printable strings**: every text field is filtered to printable ASCII.
//!   Camera firmware pads tags with NULs and other control bytes that would
//!   otherwise leak into the rendered banner.
//! - **Shutter speed**: the raw `ExposureTime` rational is snapped to the
//!   nearest entry in the standard photographic speed table and formatted as
//!   photographers write it (`"1/250"`, `"2"`). The derived string is the
//!   only shutter representation the rest of the pipeline ever sees.
//! - **Timestamp**: when a coordinate is known, `DateTimeOriginal` — assumed
//!   authored in the camera owner's home timezone — is reinterpreted in the
//!   photo location's timezone and reformatted. Lookup failure keeps the raw
//!   string; it is a degradation, not an error.
//!
//! A photo with no readable tag block at all is a hard
//! [`MetadataError::NoTagBlock`]; everything less than that is tolerated.

use crate::gps::{DmsRational, GpsRecord};
use crate::types::Coordinate;
use chrono::offset::LocalResult;
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use exif::{In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tzf_rs::DefaultFinder;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no readable metadata block in {0}")]
    NoTagBlock(PathBuf),
}

/// Timezone the camera clock is assumed to be set to. `DateTimeOriginal`
/// carries no zone of its own, so localization needs a fixed baseline.
const BASELINE_TZ: Tz = chrono_tz::America::New_York;

/// The coordinate→timezone index is expensive to build; share one per process.
static TZ_FINDER: LazyLock<DefaultFinder> = LazyLock::new(DefaultFinder::new);

/// Standard shutter speeds, fastest first, paired with their display form.
/// Snapping never emits a value outside this table.
const STANDARD_SHUTTER_SPEEDS: &[(f64, &str)] = &[
    (1.0 / 8000.0, "1/8000"),
    (1.0 / 6400.0, "1/6400"),
    (1.0 / 5000.0, "1/5000"),
    (1.0 / 4000.0, "1/4000"),
    (1.0 / 3200.0, "1/3200"),
    (1.0 / 2500.0, "1/2500"),
    (1.0 / 2000.0, "1/2000"),
    (1.0 / 1600.0, "1/1600"),
    (1.0 / 1250.0, "1/1250"),
    (1.0 / 1000.0, "1/1000"),
    (1.0 / 800.0, "1/800"),
    (1.0 / 640.0, "1/640"),
    (1.0 / 500.0, "1/500"),
    (1.0 / 400.0, "1/400"),
    (1.0 / 320.0, "1/320"),
    (1.0 / 250.0, "1/250"),
    (1.0 / 200.0, "1/200"),
    (1.0 / 160.0, "1/160"),
    (1.0 / 125.0, "1/125"),
    (1.0 / 100.0, "1/100"),
    (1.0 / 80.0, "1/80"),
    (1.0 / 60.0, "1/60"),
    (1.0 / 50.0, "1/50"),
    (1.0 / 40.0, "1/40"),
    (1.0 / 30.0, "1/30"),
    (1.0 / 25.0, "1/25"),
    (1.0 / 20.0, "1/20"),
    (1.0 / 15.0, "1/15"),
    (1.0 / 13.0, "1/13"),
    (1.0 / 10.0, "1/10"),
    (1.0 / 8.0, "1/8"),
    (1.0 / 6.0, "1/6"),
    (1.0 / 5.0, "1/5"),
    (1.0 / 4.0, "1/4"),
    (1.0 / 3.0, "1/3"),
    (1.0 / 2.5, "1/2.5"),
    (1.0 / 2.0, "1/2"),
    (1.0 / 1.6, "1/1.6"),
    (1.0 / 1.3, "1/1.3"),
    (1.0, "1"),
    (1.3, "1.3"),
    (1.6, "1.6"),
    (2.0, "2"),
    (2.5, "2.5"),
    (3.0, "3"),
    (4.0, "4"),
    (5.0, "5"),
    (6.0, "6"),
    (8.0, "8"),
    (10.0, "10"),
    (13.0, "13"),
    (15.0, "15"),
    (20.0, "20"),
    (25.0, "25"),
    (30.0, "30"),
];

/// Camera and GPS metadata for one photo. Every field is optional; the
/// extractor never invents a value for a tag the file does not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraMetadata {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    /// Aperture formatted for display (`"1.8"`, `"8"`), no `f/` prefix.
    pub f_number: Option<String>,
    pub iso: Option<u32>,
    /// Raw exposure time in seconds.
    pub exposure_time: Option<f64>,
    /// Derived, snapped shutter display string — never the raw tag.
    pub shutter_speed: Option<String>,
    /// Capture timestamp, localized to the photo's timezone when possible.
    pub date_time_original: Option<String>,
    pub gps: Option<GpsRecord>,
}

/// Read and normalize the metadata of one photo.
///
/// When `coordinate` is supplied and the file has no GPS block of its own, a
/// GPS record is synthesized from it (used for banner text and timezone
/// lookup only — nothing is written back to the file).
pub fn read_metadata(
    path: &Path,
    coordinate: Option<Coordinate>,
) -> Result<CameraMetadata, MetadataError> {
    let file = File::open(path)?;
    let exif = exif::Reader::new()
        .read_from_container(&mut BufReader::new(&file))
        .map_err(|_| MetadataError::NoTagBlock(path.to_path_buf()))?;

    let mut meta = CameraMetadata {
        make: ascii_field(&exif, Tag::Make),
        model: ascii_field(&exif, Tag::Model),
        lens_model: ascii_field(&exif, Tag::LensModel),
        f_number: rational_field(&exif, Tag::FNumber).map(format_f_number),
        iso: uint_field(&exif, Tag::PhotographicSensitivity),
        exposure_time: rational_field(&exif, Tag::ExposureTime),
        shutter_speed: None,
        date_time_original: ascii_field(&exif, Tag::DateTimeOriginal),
        gps: read_gps(&exif),
    };

    if meta.gps.is_none() {
        if let Some(c) = coordinate {
            meta.gps = Some(GpsRecord::from_decimal(c));
        }
    }

    meta.shutter_speed = meta.exposure_time.map(format_shutter_speed);

    // Supplied coordinate wins; the photo's own GPS block is the fallback.
    let location = coordinate.or_else(|| meta.gps.as_ref().map(GpsRecord::to_decimal));
    if let (Some(location), Some(raw)) = (location, meta.date_time_original.as_deref()) {
        match localize_timestamp(location, raw) {
            Some(local) => meta.date_time_original = Some(local),
            None => log::warn!(
                "could not resolve timezone for {}; keeping camera timestamp",
                path.display()
            ),
        }
    }

    Ok(meta)
}

/// EXIF orientation value (1–8) for a file, defaulting to 1 (normal) when
/// the file has no EXIF or no orientation tag.
pub fn read_orientation(path: &Path) -> u16 {
    let Ok(file) = File::open(path) else { return 1 };
    let Ok(exif) = exif::Reader::new().read_from_container(&mut BufReader::new(&file)) else {
        return 1;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .map(|v| v as u16)
        .unwrap_or(1)
}

/// Snap a raw exposure time to the nearest standard shutter speed and
/// format it. Ties keep the earlier (faster) table entry.
pub fn format_shutter_speed(exposure_time: f64) -> String {
    let mut best = &STANDARD_SHUTTER_SPEEDS[0];
    for entry in STANDARD_SHUTTER_SPEEDS {
        if (entry.0 - exposure_time).abs() < (best.0 - exposure_time).abs() {
            best = entry;
        }
    }
    best.1.to_string()
}

/// Keep only printable ASCII; camera firmware pads with NULs and other
/// control bytes.
fn strip_unprintable(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

fn format_f_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as u32)
    } else {
        format!("{}", (value * 10.0).round() / 10.0)
    }
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(groups) => groups.first().map(|bytes| {
            strip_unprintable(&String::from_utf8_lossy(bytes))
                .trim()
                .to_string()
        }),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

fn rational_field(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.num as f64 / r.denom as f64),
        _ => None,
    }
}

fn uint_field(exif: &exif::Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
}

fn dms_field(exif: &exif::Exif, tag: Tag) -> Option<[DmsRational; 3]> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(values) if values.len() >= 3 => Some([
            (values[0].num, values[0].denom),
            (values[1].num, values[1].denom),
            (values[2].num, values[2].denom),
        ]),
        _ => None,
    }
}

fn hemisphere_field(exif: &exif::Exif, tag: Tag) -> Option<char> {
    ascii_field(exif, tag).and_then(|s| s.chars().next())
}

/// A GPS record only exists when the full quad is present; the partial case
/// is treated as absent.
fn read_gps(exif: &exif::Exif) -> Option<GpsRecord> {
    Some(GpsRecord {
        latitude: dms_field(exif, Tag::GPSLatitude)?,
        latitude_ref: hemisphere_field(exif, Tag::GPSLatitudeRef)?,
        longitude: dms_field(exif, Tag::GPSLongitude)?,
        longitude_ref: hemisphere_field(exif, Tag::GPSLongitudeRef)?,
    })
}

/// Reinterpret a camera timestamp in the photo location's timezone.
///
/// Returns `None` when anything along the way cannot be resolved (parse
/// failure, no timezone at the coordinate, ambiguous local time around DST
/// transitions); the caller keeps the raw string.
fn localize_timestamp(coordinate: Coordinate, raw: &str) -> Option<String> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S").ok()?;

    let zone_name = TZ_FINDER.get_tz_name(coordinate.longitude, coordinate.latitude);
    if zone_name.is_empty() {
        return None;
    }
    let zone: Tz = zone_name.parse().ok()?;

    let baseline = match BASELINE_TZ.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        _ => return None,
    };
    Some(
        baseline
            .with_timezone(&zone)
            .format("%m/%d/%Y %H:%M:%S")
            .to_string(),
    )
}
