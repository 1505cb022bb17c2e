//! Newline-delimited JSON decoding.
//!
//! Full-scan artifact streams and the batch package endpoint answer with one
//! JSON object per line. Lines are decoded independently so that one bad line
//! does not hide the rest; callers decide whether a partial batch is usable.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::Artifact;

/// A line that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineError {
    /// 1-based line number in the body
    pub line: usize,
    pub reason: String,
}

/// Result of decoding an NDJSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct NdjsonBatch<T> {
    pub items: Vec<T>,
    pub errors: Vec<LineError>,
}

impl<T> NdjsonBatch<T> {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// All items, or `InvalidResponse` naming the first bad line.
    pub fn into_strict(self) -> Result<Vec<T>, ApiError> {
        match self.errors.first() {
            None => Ok(self.items),
            Some(first) => Err(ApiError::InvalidResponse {
                cause: format!(
                    "line {}: {} ({} of {} lines unparsable)",
                    first.line,
                    first.reason,
                    self.errors.len(),
                    self.errors.len() + self.items.len()
                ),
            }),
        }
    }
}

/// Decodes every non-blank line of `body` as a `T`.
pub fn parse_ndjson<T: DeserializeOwned>(body: &str) -> NdjsonBatch<T> {
    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (idx, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::debug!(line = idx + 1, error = %e, "skipping unparsable NDJSON line");
                errors.push(LineError {
                    line: idx + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    NdjsonBatch { items, errors }
}

/// Decodes a full-scan body.
///
/// The endpoint normally streams NDJSON, but some deployments answer with a
/// single JSON array. A JSON scalar (or `null`) is never a valid scan.
pub fn parse_scan_document(body: &str) -> Result<NdjsonBatch<Artifact>, ApiError> {
    let trimmed = body.trim_start();

    if trimmed.starts_with('[') {
        let items: Vec<Artifact> =
            serde_json::from_str(trimmed).map_err(|e| ApiError::InvalidResponse {
                cause: format!("scan body is not an artifact array: {e}"),
            })?;
        return Ok(NdjsonBatch {
            items,
            errors: Vec::new(),
        });
    }

    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return Err(ApiError::InvalidResponse {
                cause: format!("expected a non-array scan body of objects, got `{value}`"),
            });
        }
    }

    Ok(parse_ndjson(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"id":"1","type":"npm","name":"left-pad","version":"1.3.0"}"#;

    #[test]
    fn parses_every_line() {
        let body = format!("{GOOD}\n\n{GOOD}\n");
        let batch: NdjsonBatch<Artifact> = parse_ndjson(&body);
        assert_eq!(batch.items.len(), 2);
        assert!(batch.is_complete());
    }

    #[test]
    fn collects_bad_lines_and_keeps_good_ones() {
        let body = format!("{GOOD}\nnot json\n{GOOD}\n{{\"type\":\"npm\"}}");
        let batch: NdjsonBatch<Artifact> = parse_ndjson(&body);
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.errors.len(), 2);
        assert_eq!(batch.errors[0].line, 2);
        assert_eq!(batch.errors[1].line, 4);
    }

    #[test]
    fn strict_mode_reports_first_bad_line() {
        let body = format!("{GOOD}\n{{oops");
        let err = parse_ndjson::<Artifact>(&body).into_strict().unwrap_err();
        match err {
            ApiError::InvalidResponse { cause } => {
                assert!(cause.starts_with("line 2:"), "cause: {cause}");
                assert!(cause.contains("1 of 2 lines"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scan_document_accepts_json_array() {
        let body = format!("[{GOOD},{GOOD}]");
        let batch = parse_scan_document(&body).unwrap();
        assert_eq!(batch.items.len(), 2);
    }

    #[test]
    fn scan_document_rejects_scalars() {
        for body in ["42", "\"text\"", "null", "true"] {
            let err = parse_scan_document(body).unwrap_err();
            assert!(matches!(err, ApiError::InvalidResponse { .. }), "{body}");
        }
    }

    #[test]
    fn scan_document_rejects_malformed_array() {
        let err = parse_scan_document("[{\"type\":").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    #[test]
    fn scan_document_error_object_is_a_bad_line() {
        let batch = parse_scan_document(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert!(batch.items.is_empty());
        assert_eq!(batch.errors.len(), 1);
        assert!(batch.into_strict().is_err());
    }

    #[test]
    fn empty_body_is_an_empty_scan() {
        let batch = parse_scan_document("").unwrap();
        assert!(batch.items.is_empty());
        assert!(batch.is_complete());
    }
}
