//! Parsers for the creative dataset files and the ingestion body.
//!
//! - creatives_rating.csv: header, then `user_id,creative_id,nbr_success`
//! - creatives.csv: header, then `creative_id,creative_name`
//! - POST body: newline-separated `creative_id,nbr_success`, no header

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

/// Label used in errors raised while parsing an ingestion body
pub const REQUEST_BODY_LABEL: &str = "request body";

/// Read a whole file, mapping a missing file to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// File name used as the label in parse errors
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Yields `(line_no, trimmed_line)` for every non-empty data row.
///
/// The first line is the header and is always skipped.
fn data_rows(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Pull the next comma-separated field or fail with `Missing <name>`
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    name: &str,
    file: &str,
    line: usize,
) -> Result<&'a str> {
    parts
        .next()
        .map(str::trim)
        .ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Missing {}", name),
        })
}

/// Parse a field into `T`, wrapping the parse error with its location
fn parse_field<T>(value: &str, name: &str, file: &str, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {} '{}': {}", name, value, e),
    })
}

/// Parse `nbr_success`, rejecting NaN and infinities (including overflow)
fn parse_nbr_success(value: &str, file: &str, line: usize) -> Result<f32> {
    let nbr_success: f32 = parse_field(value, "nbr_success", file, line)?;
    if !nbr_success.is_finite() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("nbr_success must be finite, got '{}'", value),
        });
    }
    Ok(nbr_success)
}

/// Reject rows with more fields than expected
fn ensure_exhausted<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    expected: usize,
    file: &str,
    line: usize,
) -> Result<()> {
    if parts.next().is_some() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Expected {} fields", expected),
        });
    }
    Ok(())
}

/// Parse the contents of creatives_rating.csv
pub fn parse_success_events_str(content: &str, file: &str) -> Result<Vec<SuccessEvent>> {
    let mut events = Vec::new();

    for (line_no, line) in data_rows(content) {
        let mut parts = line.split(',');

        let user_id = next_field(&mut parts, "user_id", file, line_no)?;
        let creative_id = next_field(&mut parts, "creative_id", file, line_no)?;
        let nbr_success = next_field(&mut parts, "nbr_success", file, line_no)?;
        ensure_exhausted(&mut parts, 3, file, line_no)?;

        events.push(SuccessEvent {
            user_id: parse_field(user_id, "user_id", file, line_no)?,
            creative_id: parse_field(creative_id, "creative_id", file, line_no)?,
            nbr_success: parse_nbr_success(nbr_success, file, line_no)?,
        });
    }

    Ok(events)
}

/// Parse the contents of creatives.csv
///
/// The name is everything after the first comma.
pub fn parse_creatives_str(content: &str, file: &str) -> Result<Vec<Creative>> {
    let mut creatives = Vec::new();

    for (line_no, line) in data_rows(content) {
        let mut parts = line.splitn(2, ',');

        let creative_id = next_field(&mut parts, "creative_id", file, line_no)?;
        let name = next_field(&mut parts, "creative_name", file, line_no)?;

        creatives.push(Creative {
            id: parse_field(creative_id, "creative_id", file, line_no)?,
            name: name.to_string(),
        });
    }

    Ok(creatives)
}

/// Parse the creatives_rating.csv file
pub fn parse_success_events(path: &Path) -> Result<Vec<SuccessEvent>> {
    let content = read_file(path)?;
    parse_success_events_str(&content, &file_label(path))
}

/// Parse the creatives.csv file
pub fn parse_creatives(path: &Path) -> Result<Vec<Creative>> {
    let content = read_file(path)?;
    parse_creatives_str(&content, &file_label(path))
}

/// Parse an ingestion body into events bound to `user_id`.
///
/// Format: one `creative_id,nbr_success` pair per line, no header.
/// Blank lines are skipped; a body without any row is rejected.
pub fn parse_user_success_body(user_id: UserId, body: &str) -> Result<Vec<SuccessEvent>> {
    let file = REQUEST_BODY_LABEL;
    let mut events = Vec::new();

    for (idx, line) in body.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split(',');
        let creative_id = next_field(&mut parts, "creative_id", file, line_no)?;
        let nbr_success = next_field(&mut parts, "nbr_success", file, line_no)?;
        ensure_exhausted(&mut parts, 2, file, line_no)?;

        events.push(SuccessEvent {
            user_id,
            creative_id: parse_field(creative_id, "creative_id", file, line_no)?,
            nbr_success: parse_nbr_success(nbr_success, file, line_no)?,
        });
    }

    if events.is_empty() {
        return Err(DataLoadError::EmptyInput {
            file: file.to_string(),
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_events_skips_header() {
        let content = "user_id,creative_id,nbr_success\n1,10,55.5\n2,11,3\n";
        let events = parse_success_events_str(content, "creatives_rating.csv").unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SuccessEvent::new(1, 10, 55.5));
        assert_eq!(events[1], SuccessEvent::new(2, 11, 3.0));
    }

    #[test]
    fn test_parse_success_events_skips_blank_lines() {
        let content = "header\n\n1,10,5\n   \n2,10,7\n";
        let events = parse_success_events_str(content, "creatives_rating.csv").unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_success_events_reports_line_number() {
        let content = "header\n1,10,5\n2,abc,7\n";
        let err = parse_success_events_str(content, "creatives_rating.csv").unwrap_err();

        match err {
            DataLoadError::ParseError { file, line, reason } => {
                assert_eq!(file, "creatives_rating.csv");
                assert_eq!(line, 3);
                assert!(reason.contains("creative_id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_success_events_missing_field() {
        let err = parse_success_events_str("header\n1,10\n", "ratings").unwrap_err();
        assert!(err.to_string().contains("Missing nbr_success"));
    }

    #[test]
    fn test_parse_success_events_too_many_fields() {
        let err = parse_success_events_str("header\n1,10,5,9\n", "ratings").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_parse_creatives_keeps_commas_in_name() {
        let content = "creative_id,creative_name\n7,Summer Sale, 50% off\n8,Banner\n";
        let creatives = parse_creatives_str(content, "creatives.csv").unwrap();

        assert_eq!(creatives.len(), 2);
        assert_eq!(creatives[0].id, 7);
        assert_eq!(creatives[0].name, "Summer Sale, 50% off");
        assert_eq!(creatives[1].name, "Banner");
    }

    #[test]
    fn test_parse_user_success_body() {
        let events = parse_user_success_body(42, "10,60\n11,3.5\n\n").unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.user_id == 42));
        assert_eq!(events[1], SuccessEvent::new(42, 11, 3.5));
    }

    #[test]
    fn test_parse_user_success_body_rejects_empty() {
        let err = parse_user_success_body(1, "\n  \n").unwrap_err();
        assert!(matches!(err, DataLoadError::EmptyInput { .. }));
    }

    #[test]
    fn test_parse_user_success_body_rejects_garbage() {
        let err = parse_user_success_body(1, "10,60\nnot a row\n").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_non_finite_nbr_success_is_rejected() {
        for value in ["nan", "NaN", "inf", "-inf", "1e39"] {
            let body = format!("10,{value}\n");
            let err = parse_user_success_body(1, &body).unwrap_err();
            assert!(
                err.to_string().contains("nbr_success must be finite"),
                "{value}: {err}"
            );

            let content = format!("header\n1,10,5\n2,10,{value}\n");
            let err = parse_success_events_str(&content, "creatives_rating.csv").unwrap_err();
            assert!(matches!(err, DataLoadError::ParseError { line: 3, .. }), "{value}");
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_creatives(Path::new("/definitely/not/here/creatives.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
