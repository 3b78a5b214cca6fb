use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use cvmatch_core::{format_score, MatchResult};
use cvmatch_logging::{cvm_debug, cvm_info};

use crate::persist::{AtomicFileWriter, PersistError};

pub const EXPORT_FILENAME: &str = "match_results.csv";

pub const EXPORT_HEADERS: [&str; 8] = [
    "Candidate",
    "Job",
    "Industry",
    "Total Score",
    "Industry Score",
    "Skills Score",
    "Description Score",
    "Date",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub row_count: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Encodes the rows as CSV with a header line. Quoting follows RFC 4180.
pub fn encode_matches_csv(items: &[MatchResult]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for item in items {
        writer.write_record(row_for(item))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.error().to_string()))
}

/// Writes `match_results.csv` into `dir`. An empty page writes nothing.
pub fn export_matches(
    dir: &Path,
    items: &[MatchResult],
) -> Result<Option<ExportSummary>, ExportError> {
    if items.is_empty() {
        cvm_debug!("Nothing to export");
        return Ok(None);
    }
    let bytes = encode_matches_csv(items)?;
    let output_path = AtomicFileWriter::new(dir).write(EXPORT_FILENAME, &bytes)?;
    cvm_info!("Exported {} match(es) to {}", items.len(), output_path.display());
    Ok(Some(ExportSummary {
        row_count: items.len(),
        output_path,
    }))
}

fn row_for(item: &MatchResult) -> [String; 8] {
    let candidate = item
        .cv
        .as_ref()
        .map(|cv| cv.name.clone())
        .unwrap_or_default();
    let (job, industry) = item
        .job
        .as_ref()
        .map(|job| (job.title.clone(), job.industry.clone().unwrap_or_default()))
        .unwrap_or_default();
    [
        candidate,
        job,
        industry,
        format_score(item.total_score),
        format_score(item.industry_score),
        format_score(item.tech_skills_score),
        format_score(item.description_match_score),
        format_date(item.matched_at.as_deref()),
    ]
}

fn format_date(raw: Option<&str>) -> String {
    match raw {
        None => "N/A".to_string(),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            Err(_) => raw.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_garbled_dates() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("yesterday")), "yesterday");
    }

    #[test]
    fn parsed_dates_use_the_fixed_layout() {
        let formatted = format_date(Some("2024-03-01T12:30:00Z"));
        assert_eq!(formatted.len(), "2024-03-01 12:30:00".len());
        assert!(formatted.starts_with("2024-0"));
    }
}
