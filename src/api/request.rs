//! Inbound request type.

use serde::{Deserialize, Serialize};

use crate::core::errors::{PyshapeError, Result};
use crate::traversal::Mode;

/// A single analysis request: `{"code": "...", "mode": "..."}`.
///
/// `mode` is kept as the raw string so that an unknown name is reported only
/// after the code has been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Python source text
    pub code: String,
    /// Traversal mode name; the configured default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ParseRequest {
    /// Request for `code` with an explicit mode.
    pub fn new(code: impl Into<String>, mode: Mode) -> Self {
        Self {
            code: code.into(),
            mode: Some(mode.to_string()),
        }
    }

    /// Parse one line of JSON from the request channel.
    pub fn from_json_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim_end_matches(['\r', '\n']))
            .map_err(|e| PyshapeError::invalid_request(e.to_string()))
    }

    /// Resolve the requested mode, falling back to `default`.
    pub fn resolve_mode(&self, default: Mode) -> Result<Mode> {
        match self.mode.as_deref() {
            Some(name) => name.parse(),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_request() {
        let request =
            ParseRequest::from_json_line(r#"{"code": "x = 1", "mode": "complex"}"#).unwrap();
        assert_eq!(request.code, "x = 1");
        assert_eq!(request.resolve_mode(Mode::Simple).unwrap(), Mode::Complex);
    }

    #[test]
    fn test_mode_defaults() {
        let request = ParseRequest::from_json_line("{\"code\": \"\"}\n").unwrap();
        assert_eq!(request.mode, None);
        assert_eq!(request.resolve_mode(Mode::Simple).unwrap(), Mode::Simple);
        assert_eq!(
            request.resolve_mode(Mode::Concepts).unwrap(),
            Mode::Concepts
        );

        let null_mode = ParseRequest::from_json_line(r#"{"code": "", "mode": null}"#).unwrap();
        assert_eq!(null_mode.mode, None);
    }

    #[test]
    fn test_unknown_mode_is_deferred() {
        let request = ParseRequest::from_json_line(r#"{"code": "x", "mode": "tree"}"#).unwrap();
        assert!(matches!(
            request.resolve_mode(Mode::Simple),
            Err(PyshapeError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_malformed_requests() {
        for line in ["", "not json", r#"{"mode": "simple"}"#, r#"{"code": 5}"#] {
            let err = ParseRequest::from_json_line(line).unwrap_err();
            assert!(
                matches!(err, PyshapeError::InvalidRequest { .. }),
                "{line:?}: {err}"
            );
        }
    }

    #[test]
    fn test_new_serializes_mode_name() {
        let request = ParseRequest::new("pass", Mode::Hierarchical);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"code":"pass","mode":"hierarchical"}"#);
    }
}
