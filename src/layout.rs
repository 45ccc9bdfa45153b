//! Aspect-ratio padding solver.
//!
//! Given the stacked composite's dimensions and a target print ratio, this
//! module determines the exact border amounts that bring the canvas to that
//! ratio. Two modes:
//!
//! - **Fixed-ratio**: the caller chooses a base pad for one axis; the other
//!   axis' pad is derived so the padded canvas hits the ratio exactly.
//! - **Best-fit search**: evaluate every standard print ratio for the
//!   composite's orientation, compute the padding each would need, and rank
//!   them by total padding. The caller picks a requested ratio out of the
//!   ranked list, or the orientation default.
//!
//! The automatic vertical pad starts from a geometry reference value and,
//! for landscape composites, shrinks in steps of 50 reference units until
//! the padded canvas keeps its landscape orientation. The base value only
//! ever decreases and bottoms out at zero, so the search terminates within
//! `base / 50 + 1` steps. Portrait composites satisfy the invariant from
//! the start and keep the initial pad.

use crate::geometry::scale_to_reference;
use crate::types::{AspectRatio, PaddingPlan};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("requested ratio {0} is not a supported print ratio for this orientation")]
    UnsupportedRatio(AspectRatio),
}

/// Standard print ratios evaluated for portrait composites.
pub const PORTRAIT_PRINT_RATIOS: [AspectRatio; 6] = [
    AspectRatio::new(4, 5),
    AspectRatio::new(2, 3),
    AspectRatio::new(3, 4),
    AspectRatio::new(9, 16),
    AspectRatio::new(8, 10),
    AspectRatio::new(11, 14),
];

/// Standard print ratios evaluated for landscape composites — the
/// reciprocals of the portrait set.
pub const LANDSCAPE_PRINT_RATIOS: [AspectRatio; 6] = [
    AspectRatio::new(5, 4),
    AspectRatio::new(3, 2),
    AspectRatio::new(4, 3),
    AspectRatio::new(16, 9),
    AspectRatio::new(10, 8),
    AspectRatio::new(14, 11),
];

/// Reference-unit step the convergence search shrinks the base pad by.
const BASE_PAD_STEP: u32 = 50;

/// One evaluated print-ratio candidate: the extra width or height (never
/// both, beyond rounding) needed to reach it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioPadding {
    pub ratio: AspectRatio,
    pub width_padding: u32,
    pub height_padding: u32,
    pub total_padding: u32,
}

/// Evaluate every standard print ratio for the canvas orientation and rank
/// the results by total padding, least first.
///
/// The sort is stable, so candidates with equal totals keep their
/// candidate-set order.
pub fn best_ratios_for_padding(width: u32, height: u32) -> Vec<RatioPadding> {
    let ratios: &[AspectRatio] = if height > width {
        &PORTRAIT_PRINT_RATIOS
    } else {
        &LANDSCAPE_PRINT_RATIOS
    };

    let mut options: Vec<RatioPadding> = ratios
        .iter()
        .map(|&ratio| {
            let target = ratio.as_f64();
            let (width_padding, height_padding) = if (width as f64 / height as f64) < target {
                // Canvas too tall for this ratio: widen it.
                let target_width = (height as f64 * target) as u32;
                (target_width.saturating_sub(width), 0)
            } else {
                // Canvas too wide: make it taller.
                let target_height = (width as f64 / target) as u32;
                (0, target_height.saturating_sub(height))
            };
            RatioPadding {
                ratio,
                width_padding,
                height_padding,
                total_padding: width_padding + height_padding,
            }
        })
        .collect();

    options.sort_by_key(|option| option.total_padding);
    options
}

/// Fixed-ratio mode: the base pad sits on the axis perpendicular to the
/// longer dimension (vertical for landscape, horizontal for portrait); the
/// other axis' pad is derived so the padded canvas reaches `ratio` exactly.
/// Integer truncation is tolerated.
pub fn padding_for_ratio(
    width: u32,
    height: u32,
    ratio: AspectRatio,
    base_pad: u32,
) -> PaddingPlan {
    if width >= height {
        let padded_height = height + 2 * base_pad;
        let target_width = (padded_height as u64 * ratio.width as u64 / ratio.height as u64) as u32;
        PaddingPlan {
            horizontal: target_width.saturating_sub(width) / 2,
            vertical: base_pad,
        }
    } else {
        let padded_width = width + 2 * base_pad;
        let target_height = (padded_width as u64 * ratio.height as u64 / ratio.width as u64) as u32;
        PaddingPlan {
            horizontal: base_pad,
            vertical: target_height.saturating_sub(height) / 2,
        }
    }
}

/// Automatic vertical pad for the stacked composite, scaled from the
/// original image and shrunk until it cannot flip a landscape composite
/// into portrait orientation.
fn auto_vertical_pad(original: (u32, u32), stacked: (u32, u32), base_pad: u32) -> u32 {
    let (original_width, original_height) = original;
    let (stacked_width, stacked_height) = stacked;

    let mut base = base_pad;
    let mut pad = scale_to_reference(original_width, original_height, base);
    if stacked_width > stacked_height {
        while base > 0 && stacked_height + 2 * pad > stacked_width {
            base = base.saturating_sub(BASE_PAD_STEP);
            pad = scale_to_reference(original_width, original_height, base);
        }
    }
    pad
}

/// Best-fit search mode: compute the final padding plan for a print.
///
/// `original` is the source photo (drives proportional scaling and the
/// orientation default), `stacked` the banner+photo+palette composite.
/// `requested` of `None` selects the orientation default (5:4 landscape,
/// 2:3 portrait); a requested ratio outside the candidate set is a
/// configuration error, never a silent fallback.
pub fn print_padding(
    original: (u32, u32),
    stacked: (u32, u32),
    base_pad: u32,
    requested: Option<AspectRatio>,
) -> Result<PaddingPlan, LayoutError> {
    let auto_pad = auto_vertical_pad(original, stacked, base_pad);
    log::debug!("auto vertical pad: {auto_pad}");

    let (stacked_width, stacked_height) = stacked;
    let candidates = best_ratios_for_padding(stacked_width, stacked_height + 2 * auto_pad);

    let target = requested.unwrap_or(if original.0 > original.1 {
        AspectRatio::new(5, 4)
    } else {
        AspectRatio::new(2, 3)
    });

    let selected = candidates
        .iter()
        .find(|candidate| candidate.ratio == target)
        .ok_or(LayoutError::UnsupportedRatio(target))?;

    // The height share is zero whenever the convergence invariant held;
    // folding it in keeps the exact-ratio contract for extreme panoramas.
    Ok(PaddingPlan {
        horizontal: selected.width_padding / 2,
        vertical: auto_pad + selected.height_padding / 2,
    })
}
