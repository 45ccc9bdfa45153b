//! Engine configuration.
//!
//! Loaded from an optional TOML file; every field has a default, so an
//! empty or absent file yields a fully working configuration. The file
//! shape mirrors the struct:
//!
//! ```toml
//! palette_size = 7
//! jpeg_quality = 100
//! print_base_pad = 400
//! plain_border = 600
//! stack_gap = 300
//! on_collision = "suffix"
//! threads = 0
//!
//! [fonts]
//! bold = "/usr/share/fonts/truetype/times/timesbd.ttf"
//! regular = "/usr/share/fonts/truetype/times/times.ttf"
//!
//! [geocoder]
//! endpoint = "https://nominatim.openstreetmap.org/search"
//! timeout_secs = 5
//! ```
//!
//! The reference values (`print_base_pad`, `plain_border`, `stack_gap`) are
//! expressed against the geometry reference canvas and scaled per image by
//! [`crate::geometry::scale_to_reference`].

use crate::naming::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatteConfig {
    /// Number of palette colors to extract.
    pub palette_size: usize,
    /// JPEG encoding quality for the composed output (1–100).
    pub jpeg_quality: u8,
    /// Reference value for the automatic print pad.
    pub print_base_pad: u32,
    /// Reference value for the uniform border in plain (non-print) mode.
    pub plain_border: u32,
    /// Reference value for the whitespace between photo and palette.
    pub stack_gap: u32,
    /// What to do when the output file already exists.
    pub on_collision: CollisionPolicy,
    /// Worker threads for batch processing; 0 means all available cores.
    pub threads: usize,
    pub fonts: FontConfig,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Bold TTF for banner line one; system fallbacks are tried when unset.
    pub bold: Option<PathBuf>,
    /// Regular TTF for banner line two.
    pub regular: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for MatteConfig {
    fn default() -> Self {
        Self {
            palette_size: 7,
            jpeg_quality: 100,
            print_base_pad: 400,
            plain_border: 600,
            stack_gap: 300,
            on_collision: CollisionPolicy::default(),
            threads: 0,
            fonts: FontConfig::default(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Load the configuration, or the defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<MatteConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(MatteConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Worker thread count: the configured value capped at the machine's
/// available cores; 0 means use them all.
pub fn effective_threads(config: &MatteConfig) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if config.threads == 0 {
        available
    } else {
        config.threads.min(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_reference_values() {
        let config = MatteConfig::default();
        assert_eq!(config.palette_size, 7);
        assert_eq!(config.jpeg_quality, 100);
        assert_eq!(config.print_base_pad, 400);
        assert_eq!(config.plain_border, 600);
        assert_eq!(config.stack_gap, 300);
        assert_eq!(config.on_collision, CollisionPolicy::Suffix);
        assert_eq!(config.geocoder.timeout_secs, 5);
        assert!(config.fonts.bold.is_none());
    }

    #[test]
    fn absent_path_yields_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config.palette_size, 7);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("matte.toml");
        fs::write(
            &path,
            "palette_size = 5\non_collision = \"overwrite\"\n\n[geocoder]\ntimeout_secs = 2\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.palette_size, 5);
        assert_eq!(config.on_collision, CollisionPolicy::Overwrite);
        assert_eq!(config.geocoder.timeout_secs, 2);
        // Untouched fields keep their defaults.
        assert_eq!(config.jpeg_quality, 100);
        assert_eq!(
            config.geocoder.endpoint,
            "https://nominatim.openstreetmap.org/search"
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("matte.toml");
        fs::write(&path, "palete_size = 5\n").unwrap();
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load(Some(Path::new("/nonexistent/matte.toml"))),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn effective_threads_caps_at_available() {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let mut config = MatteConfig::default();
        config.threads = 10_000;
        assert_eq!(effective_threads(&config), available);
        config.threads = 0;
        assert_eq!(effective_threads(&config), available);
        config.threads = 1;
        assert_eq!(effective_threads(&config), 1);
    }
}
