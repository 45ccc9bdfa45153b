//! Output file naming and collision handling.
//!
//! Composed images are written next to (or into) the destination directory
//! as `{stem}-matte.jpg`. What happens when that name is taken is a policy
//! choice the caller makes, not an error: suffix with a counter, overwrite,
//! or skip.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = "-matte";

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Append an incrementing counter: `photo-matte_1.jpg`, `photo-matte_2.jpg`…
    #[default]
    Suffix,
    /// Replace the existing file.
    Overwrite,
    /// Leave the existing file alone and report the photo as skipped.
    Skip,
}

/// Output file name for a source photo: `DSCF0297.jpg` → `DSCF0297-matte.jpg`.
pub fn output_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    format!("{stem}{OUTPUT_SUFFIX}.jpg")
}

/// Resolve the path a composed image should be written to, applying the
/// collision policy against the filesystem. `None` means skip.
pub fn resolve_output_path(
    destination: &Path,
    source: &Path,
    policy: CollisionPolicy,
) -> Option<PathBuf> {
    let candidate = destination.join(output_file_name(source));
    if !candidate.exists() {
        return Some(candidate);
    }

    match policy {
        CollisionPolicy::Overwrite => Some(candidate),
        CollisionPolicy::Skip => None,
        CollisionPolicy::Suffix => {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("photo");
            let mut counter = 1u32;
            loop {
                let next = destination.join(format!("{stem}{OUTPUT_SUFFIX}_{counter}.jpg"));
                if !next.exists() {
                    return Some(next);
                }
                counter += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn output_name_appends_suffix() {
        assert_eq!(
            output_file_name(Path::new("/photos/DSCF0297.jpg")),
            "DSCF0297-matte.jpg"
        );
        assert_eq!(
            output_file_name(Path::new("shot.tiff")),
            "shot-matte.jpg"
        );
    }

    #[test]
    fn free_path_is_used_directly() {
        let tmp = TempDir::new().unwrap();
        let path =
            resolve_output_path(tmp.path(), Path::new("a.jpg"), CollisionPolicy::Suffix).unwrap();
        assert_eq!(path, tmp.path().join("a-matte.jpg"));
    }

    #[test]
    fn suffix_policy_counts_upward() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a-matte.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("a-matte_1.jpg"), b"x").unwrap();

        let path =
            resolve_output_path(tmp.path(), Path::new("a.jpg"), CollisionPolicy::Suffix).unwrap();
        assert_eq!(path, tmp.path().join("a-matte_2.jpg"));
    }

    #[test]
    fn overwrite_policy_reuses_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a-matte.jpg"), b"x").unwrap();

        let path =
            resolve_output_path(tmp.path(), Path::new("a.jpg"), CollisionPolicy::Overwrite)
                .unwrap();
        assert_eq!(path, tmp.path().join("a-matte.jpg"));
    }

    #[test]
    fn skip_policy_returns_none() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a-matte.jpg"), b"x").unwrap();

        assert_eq!(
            resolve_output_path(tmp.path(), Path::new("a.jpg"), CollisionPolicy::Skip),
            None
        );
    }
}
