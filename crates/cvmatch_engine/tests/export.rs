use std::fs;

use cvmatch_core::{CandidateRef, JobRef, MatchResult};
use cvmatch_engine::{encode_matches_csv, export_matches, EXPORT_FILENAME};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn scored(name: &str, title: &str, industry: Option<&str>, total: f64) -> MatchResult {
    MatchResult {
        id: Some(1),
        cv: Some(CandidateRef {
            id: 1,
            name: name.to_string(),
        }),
        job: Some(JobRef {
            id: 2,
            title: title.to_string(),
            industry: industry.map(str::to_string),
        }),
        total_score: total,
        industry_score: 0.5,
        tech_skills_score: 0.123,
        description_match_score: 1.0,
        matched_at: None,
        explanation: None,
    }
}

#[test]
fn header_and_percent_rows() {
    let bytes = encode_matches_csv(&[scored("Ada", "Engineer", Some("IT"), 0.876)]).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(
        text,
        "Candidate,Job,Industry,Total Score,Industry Score,Skills Score,Description Score,Date\n\
         Ada,Engineer,IT,88%,50%,12%,100%,N/A\n"
    );
}

#[test]
fn delimiters_and_quotes_inside_fields_are_quoted() {
    let bytes =
        encode_matches_csv(&[scored("Lovelace, Ada", "The \"Analyst\"", None, 0.5)]).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let row = text.lines().nth(1).unwrap();

    assert_eq!(
        row,
        "\"Lovelace, Ada\",\"The \"\"Analyst\"\"\",,50%,50%,12%,100%,N/A"
    );

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "Lovelace, Ada");
    assert_eq!(&record[1], "The \"Analyst\"");
}

#[test]
fn export_writes_the_named_file() {
    let temp = TempDir::new().unwrap();
    let items = vec![
        scored("Ada", "Engineer", Some("IT"), 0.9),
        scored("Grace", "Admiral", None, 0.4),
    ];

    let summary = export_matches(temp.path(), &items).unwrap().unwrap();

    assert_eq!(summary.row_count, 2);
    assert_eq!(summary.output_path, temp.path().join(EXPORT_FILENAME));
    let written = fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(written.lines().count(), 3);
}

#[test]
fn empty_page_produces_no_file() {
    let temp = TempDir::new().unwrap();

    let summary = export_matches(temp.path(), &[]).unwrap();

    assert!(summary.is_none());
    assert!(!temp.path().join(EXPORT_FILENAME).exists());
}
