//! CLI output formatting for batch results.
//!
//! Each `format_*` function is pure (returns `Vec<String>`, no I/O) so the
//! display contract is testable; `print_*` wrappers write to stdout. The
//! optional JSON report mirrors the same data for machine consumers.

use crate::pipeline::{BatchOutcome, ProcessedPhoto};
use serde::Serialize;
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format one composed photo as a header line plus source context.
fn photo_lines(index: usize, photo: &ProcessedPhoto) -> Vec<String> {
    vec![
        format!(
            "{:03} {} ({}x{})",
            index + 1,
            file_name(&photo.output),
            photo.width,
            photo.height
        ),
        format!("    Source: {}", file_name(&photo.source)),
    ]
}

/// Format the full batch summary.
pub fn format_batch_output(outcome: &BatchOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "Composed {} photo(s), {} skipped, {} failed",
        outcome.written.len(),
        outcome.skipped.len(),
        outcome.failures.len()
    )];

    for (index, photo) in outcome.written.iter().enumerate() {
        lines.extend(photo_lines(index, photo));
    }

    if !outcome.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for source in &outcome.skipped {
            lines.push(format!("    {} (output exists)", file_name(source)));
        }
    }

    if !outcome.failures.is_empty() {
        lines.push("Failures".to_string());
        for (source, error) in &outcome.failures {
            lines.push(format!("    {}: {}", file_name(source), error));
        }
    }

    lines
}

pub fn print_batch_output(outcome: &BatchOutcome) {
    for line in format_batch_output(outcome) {
        println!("{line}");
    }
}

/// Machine-readable batch report.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub written: Vec<ProcessedPhoto>,
    pub skipped: Vec<String>,
    pub failures: Vec<FailureReport>,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub source: String,
    pub error: String,
}

pub fn batch_report(outcome: &BatchOutcome) -> BatchReport {
    BatchReport {
        written: outcome.written.clone(),
        skipped: outcome
            .skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        failures: outcome
            .failures
            .iter()
            .map(|(source, error)| FailureReport {
                source: source.display().to_string(),
                error: error.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_outcome() -> BatchOutcome {
        BatchOutcome {
            written: vec![ProcessedPhoto {
                source: PathBuf::from("/in/DSCF0297.jpg"),
                output: PathBuf::from("/out/DSCF0297-matte.jpg"),
                width: 10852,
                height: 7235,
            }],
            skipped: vec![PathBuf::from("/in/DSCF0298.jpg")],
            failures: vec![(
                PathBuf::from("/in/corrupt.jpg"),
                crate::metadata::MetadataError::NoTagBlock(PathBuf::from("/in/corrupt.jpg"))
                    .into(),
            )],
        }
    }

    #[test]
    fn summary_counts_all_buckets() {
        let lines = format_batch_output(&sample_outcome());
        assert_eq!(lines[0], "Composed 1 photo(s), 1 skipped, 1 failed");
    }

    #[test]
    fn written_photos_show_resolution_and_source() {
        let lines = format_batch_output(&sample_outcome());
        assert_eq!(lines[1], "001 DSCF0297-matte.jpg (10852x7235)");
        assert_eq!(lines[2], "    Source: DSCF0297.jpg");
    }

    #[test]
    fn skips_and_failures_get_their_sections() {
        let lines = format_batch_output(&sample_outcome());
        assert!(lines.contains(&"Skipped".to_string()));
        assert!(lines.contains(&"Failures".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("    corrupt.jpg: metadata:"))
        );
    }

    #[test]
    fn empty_outcome_is_one_line() {
        let lines = format_batch_output(&BatchOutcome::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "Composed 0 photo(s), 0 skipped, 0 failed");
    }

    #[test]
    fn report_serializes_failures_as_strings() {
        let report = batch_report(&sample_outcome());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["written"][0]["width"], 10852);
        assert!(
            json["failures"][0]["error"]
                .as_str()
                .unwrap()
                .contains("no readable metadata block")
        );
    }
}
