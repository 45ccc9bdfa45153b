//! # Photo Matte
//!
//! A photo annotation and layout-composition engine. Given a source
//! photograph, an optional location, and a target print aspect ratio, it
//! composes a gallery-style matte: a metadata banner above the photo, a
//! dominant-color palette strip below it, and a white border solved to an
//! exact print ratio.
//!
//! # Architecture: One Pipeline, Six Stages
//!
//! ```text
//! load + orient ─→ metadata ─→ banner ─┐
//!              └─→ palette ───────────┤
//!                                     ├─→ stack ─→ pad solve ─→ border ─→ save
//!                          photo ─────┘
//! ```
//!
//! Metadata and palette extraction are independent reads of the source;
//! the banner consumes metadata; the compositor consumes all three images;
//! the padding solver runs on the stacked composite before the final
//! border. Batches fan the whole pipeline out per photo on a rayon pool
//! with per-photo failure isolation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Proportional scaling against the reference canvas; ratio reduction |
//! | [`gps`] | Decimal ⇄ DMS codec and the GPS metadata record |
//! | [`metadata`] | EXIF extraction, shutter snapping, timestamp localization |
//! | [`palette`] | Pluggable dominant-color extraction + swatch rendering |
//! | [`banner`] | Two-line text band with overlap-avoiding font fitting |
//! | [`layout`] | Aspect-ratio padding solver (fixed-ratio and best-fit modes) |
//! | [`compose`] | Canvas stacking, border application, JPEG persistence |
//! | [`naming`] | Output file naming and collision policy |
//! | [`geocode`] | Address → coordinate collaborator behind a trait |
//! | [`pipeline`] | The per-photo flow, the engine, and the batch driver |
//! | [`config`] | TOML configuration with full defaults |
//! | [`output`] | CLI batch-summary formatting and the JSON report |
//! | [`types`] | Shared value types (coordinates, ratios, plans) |
//!
//! # Design Decisions
//!
//! ## Typed Metadata, Not a Tag Map
//!
//! Camera metadata is a struct of `Option` fields, not a string-keyed map.
//! A photo without a lens tag is `lens_model: None`, and every consumer has
//! to decide what that means for it — the compiler keeps the honest.
//!
//! ## One Scaling Formula
//!
//! All spacing — border, banner offsets, section gap — goes through
//! [`geometry::scale_to_reference`] against a single 7728×5152 reference
//! canvas. Output composed from a phone export and from a full-resolution
//! scan look identical because nothing computes spacing any other way.
//!
//! ## Collaborators Behind Traits
//!
//! Geocoding ([`geocode::Geocoder`]) and palette extraction
//! ([`palette::PaletteAlgorithm`]) are trait seams with production
//! implementations (Nominatim over HTTP, deterministic k-means). Tests
//! inject mocks; the pipeline code never knows the difference.
//!
//! ## Degradation Over Failure
//!
//! Only three things are fatal for a photo: an unreadable metadata block,
//! an unresolvable address, and an unsupported print ratio. Everything
//! else degrades: unknown timezone keeps the camera timestamp, a missing
//! font renders an un-texted band, and an output-name collision follows
//! the configured policy. A batch never aborts on one photo's failure.

pub mod banner;
pub mod compose;
pub mod config;
pub mod geocode;
pub mod geometry;
pub mod gps;
pub mod layout;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
