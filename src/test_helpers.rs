//! Shared test utilities for the photo-matte test suite.
//!
//! Provides synthetic image fixtures: plain JPEGs, JPEGs carrying a real
//! EXIF block (written with kamadak-exif's experimental writer and spliced
//! into the JPEG as an APP1 segment), and a pre-populated [`CameraMetadata`]
//! record for stages that sit above extraction.
//!
//! Everything is generated programmatically — no binary fixture files.

use crate::gps::GpsRecord;
use crate::metadata::CameraMetadata;
use crate::types::Coordinate;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

/// Encode a gradient test image as baseline JPEG bytes.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Write a JPEG with no EXIF segment at all.
pub fn write_plain_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Write a JPEG carrying a realistic EXIF block: camera, lens, exposure,
/// timestamp, and optionally a GPS IFD for `gps_location`.
///
/// Fixture values: FUJIFILM X-T5, XF16-55mmF2.8, f/8, 1/250s, ISO 125,
/// taken 2024:06:11 08:30:25.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, gps_location: Option<Coordinate>) {
    let jpeg = jpeg_bytes(width, height);

    let mut fields = vec![
        Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"FUJIFILM".to_vec()]),
        },
        Field {
            tag: Tag::Model,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"X-T5".to_vec()]),
        },
        Field {
            tag: Tag::LensModel,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"XF16-55mmF2.8".to_vec()]),
        },
        Field {
            tag: Tag::FNumber,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 8, denom: 1 }]),
        },
        Field {
            tag: Tag::ExposureTime,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![Rational { num: 1, denom: 250 }]),
        },
        Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![125]),
        },
        Field {
            tag: Tag::DateTimeOriginal,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"2024:06:11 08:30:25".to_vec()]),
        },
    ];

    if let Some(location) = gps_location {
        let record = GpsRecord::from_decimal(location);
        fields.push(Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![vec![record.latitude_ref as u8]]),
        });
        fields.push(Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(
                record
                    .latitude
                    .iter()
                    .map(|&(num, denom)| Rational { num, denom })
                    .collect(),
            ),
        });
        fields.push(Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![vec![record.longitude_ref as u8]]),
        });
        fields.push(Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(
                record
                    .longitude
                    .iter()
                    .map(|&(num, denom)| Rational { num, denom })
                    .collect(),
            ),
        });
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut payload = std::io::Cursor::new(Vec::new());
    writer.write(&mut payload, false).unwrap();
    let payload = payload.into_inner();

    // Splice an APP1 "Exif" segment directly after SOI.
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 8) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// A fully populated metadata record matching [`write_jpeg_with_exif`],
/// for stages that consume metadata without reading a file.
pub fn sample_metadata(gps_location: Option<Coordinate>) -> CameraMetadata {
    CameraMetadata {
        make: Some("FUJIFILM".to_string()),
        model: Some("X-T5".to_string()),
        lens_model: Some("XF16-55mmF2.8".to_string()),
        f_number: Some("8".to_string()),
        iso: Some(125),
        exposure_time: Some(1.0 / 250.0),
        shutter_speed: Some("1/250".to_string()),
        date_time_original: Some("2024:06:11 08:30:25".to_string()),
        gps: gps_location.map(GpsRecord::from_decimal),
    }
}
