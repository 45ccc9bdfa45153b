//! GPS coordinate codec: decimal degrees ⇄ the degrees/minutes/seconds
//! rational triples EXIF GPS tags use.
//!
//! EXIF stores each coordinate as three unsigned rationals. Degrees and
//! minutes are exact integers over 1; seconds are scaled by 100 so that two
//! decimal places survive the rational encoding. The sign lives in the
//! hemisphere reference (`N`/`S`, `E`/`W`), never in the numbers.

use crate::types::Coordinate;

/// One DMS component as an EXIF rational: `(numerator, denominator)`.
pub type DmsRational = (u32, u32);

/// Convert a non-negative decimal coordinate to EXIF DMS rationals.
///
/// Seconds are rounded to 5 decimals before scaling, matching the precision
/// the round-trip law in [`dms_to_decimal`] is stated against.
pub fn decimal_to_dms(value: f64) -> [DmsRational; 3] {
    let degrees = value.trunc();
    let minutes = ((value - degrees) * 60.0).trunc();
    let seconds = (value - degrees - minutes / 60.0) * 3600.0;
    let seconds = (seconds * 100_000.0).round() / 100_000.0;
    [
        (degrees as u32, 1),
        (minutes as u32, 1),
        ((seconds * 100.0).round() as u32, 100),
    ]
}

/// Convert EXIF DMS rationals back to signed decimal degrees.
///
/// Negative for the `S` and `W` hemispheres.
pub fn dms_to_decimal(dms: &[DmsRational; 3], reference: char) -> f64 {
    let degrees = dms[0].0 as f64 / dms[0].1 as f64;
    let minutes = dms[1].0 as f64 / dms[1].1 as f64;
    let seconds = dms[2].0 as f64 / dms[2].1 as f64;

    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference {
        'S' | 'W' => -decimal,
        _ => decimal,
    }
}

/// The GPS sub-record of camera metadata: both coordinates in EXIF DMS form
/// plus their hemisphere references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsRecord {
    pub latitude: [DmsRational; 3],
    pub latitude_ref: char,
    pub longitude: [DmsRational; 3],
    pub longitude_ref: char,
}

impl GpsRecord {
    /// Synthesize a GPS record from a decimal coordinate, as if the camera
    /// had written it: hemisphere from the sign, magnitude through the codec.
    pub fn from_decimal(coordinate: Coordinate) -> Self {
        Self {
            latitude: decimal_to_dms(coordinate.latitude.abs()),
            latitude_ref: if coordinate.latitude >= 0.0 { 'N' } else { 'S' },
            longitude: decimal_to_dms(coordinate.longitude.abs()),
            longitude_ref: if coordinate.longitude >= 0.0 { 'E' } else { 'W' },
        }
    }

    /// Decode back to signed decimal degrees.
    pub fn to_decimal(&self) -> Coordinate {
        Coordinate {
            latitude: dms_to_decimal(&self.latitude, self.latitude_ref),
            longitude: dms_to_decimal(&self.longitude, self.longitude_ref),
        }
    }

    /// Human-readable decimal rendering for the banner, e.g.
    /// `46.4975° N, 7.7149° E`.
    pub fn format_decimal(&self) -> String {
        let c = self.to_decimal();
        format!(
            "{:.4}\u{b0} {}, {:.4}\u{b0} {}",
            c.latitude.abs(),
            self.latitude_ref,
            c.longitude.abs(),
            self.longitude_ref
        )
    }
}
