//! Shared types used across all pipeline stages.
//!
//! These are the values handed from stage to stage (metadata → banner →
//! compositor → padding solver) and must mean the same thing everywhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RatioParseError {
    #[error("malformed aspect ratio {0:?} (expected WIDTH:HEIGHT)")]
    Malformed(String),
    #[error("aspect ratio members must be positive: {0:?}")]
    NonPositive(String),
}

/// A geographic coordinate. Both members are always present — a partial
/// coordinate is unrepresentable; use `Option<Coordinate>` for absence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, validating the WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// A reduced integer aspect ratio: `gcd(width, height) == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Construct without reducing. Callers that start from pixel dimensions
    /// should use [`crate::geometry::reduced_aspect_ratio`] instead.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_f64(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// How the caller names the target print ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioRequest {
    /// Use the source image's own reduced ratio.
    Default,
    /// An explicit `W:H` pair (a named standard ratio or a custom one).
    Exact(AspectRatio),
}

impl RatioRequest {
    /// Parse the CLI/form representation: `"Default"` or `"W:H"`.
    pub fn parse(s: &str) -> Result<Self, RatioParseError> {
        if s.eq_ignore_ascii_case("default") {
            return Ok(Self::Default);
        }
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| RatioParseError::Malformed(s.to_string()))?;
        let w: u32 = w
            .trim()
            .parse()
            .map_err(|_| RatioParseError::Malformed(s.to_string()))?;
        let h: u32 = h
            .trim()
            .parse()
            .map_err(|_| RatioParseError::Malformed(s.to_string()))?;
        if w == 0 || h == 0 {
            return Err(RatioParseError::NonPositive(s.to_string()));
        }
        Ok(Self::Exact(AspectRatio::new(w, h)))
    }
}

/// Border amounts to add to each side of a canvas.
///
/// `horizontal` is added to the left and right edges, `vertical` to the top
/// and bottom, so the canvas grows by twice each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingPlan {
    pub horizontal: u32,
    pub vertical: u32,
}

impl PaddingPlan {
    pub const fn uniform(pad: u32) -> Self {
        Self {
            horizontal: pad,
            vertical: pad,
        }
    }

    /// Dimensions of `(width, height)` after the plan is applied.
    pub fn apply_to(self, width: u32, height: u32) -> (u32, u32) {
        (width + 2 * self.horizontal, height + 2 * self.vertical)
    }
}

/// Vertical placement of the three sections inside the stacked canvas.
///
/// Offsets are monotonically increasing and the sections never overlap:
/// the photo starts where the banner ends, and the palette starts a
/// whitespace gap below the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub banner_y: u32,
    pub photo_y: u32,
    pub palette_y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_valid_ranges() {
        assert!(Coordinate::new(45.9845, 7.7654).is_some());
        assert!(Coordinate::new(-90.0, 180.0).is_some());
        assert!(Coordinate::new(0.0, 0.0).is_some());
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(-91.0, 200.0).is_none());
    }

    #[test]
    fn ratio_request_parses_default_case_insensitively() {
        assert_eq!(RatioRequest::parse("Default"), Ok(RatioRequest::Default));
        assert_eq!(RatioRequest::parse("default"), Ok(RatioRequest::Default));
    }

    #[test]
    fn ratio_request_parses_pair() {
        assert_eq!(
            RatioRequest::parse("2:3"),
            Ok(RatioRequest::Exact(AspectRatio::new(2, 3)))
        );
        assert_eq!(
            RatioRequest::parse("16 : 9"),
            Ok(RatioRequest::Exact(AspectRatio::new(16, 9)))
        );
    }

    #[test]
    fn ratio_request_rejects_malformed() {
        assert!(matches!(
            RatioRequest::parse("16x9"),
            Err(RatioParseError::Malformed(_))
        ));
        assert!(matches!(
            RatioRequest::parse("a:b"),
            Err(RatioParseError::Malformed(_))
        ));
    }

    #[test]
    fn ratio_request_rejects_zero_members() {
        assert!(matches!(
            RatioRequest::parse("0:3"),
            Err(RatioParseError::NonPositive(_))
        ));
        assert!(matches!(
            RatioRequest::parse("4:0"),
            Err(RatioParseError::NonPositive(_))
        ));
    }

    #[test]
    fn padding_plan_applies_to_both_sides() {
        let plan = PaddingPlan {
            horizontal: 10,
            vertical: 25,
        };
        assert_eq!(plan.apply_to(100, 200), (120, 250));
    }

    #[test]
    fn aspect_ratio_displays_as_pair() {
        assert_eq!(AspectRatio::new(5, 4).to_string(), "5:4");
    }
}
