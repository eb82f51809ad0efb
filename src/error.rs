//! Crate-level error types and the host-facing error note
//!
//! Internal failures stay typed (`thiserror` enums per module); what crosses
//! into the host after a submit-path failure is an [`ErrorNote`], with its
//! message passed through a sanitizer so credential material from remote
//! error bodies never reaches end users.

use crate::config::ConfigError;
use crate::crm::CrmError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for formbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("CRM error: {0}")]
    Crm(#[from] CrmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for formbridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Note severity. Only `error` exists today; the host renders it as a
/// user-visible submission note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Error,
}

/// Structured result a processor hands the host when a submit-path write
/// fails: a human-readable message plus optional diagnostic detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNote {
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(rename = "type")]
    pub kind: NoteKind,
}

impl ErrorNote {
    /// Create an error note; the message is sanitized before storage.
    pub fn error(note: impl Into<String>) -> Self {
        Self {
            note: sanitize_note(&note.into()),
            detail: None,
            kind: NoteKind::Error,
        }
    }

    /// Attach diagnostic detail (also sanitized).
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(sanitize_note(&detail.into()));
        self
    }
}

/// Redact credential-shaped substrings and bound the message length.
/// Remote error bodies occasionally echo request headers back.
pub fn sanitize_note(message: &str) -> String {
    let mut sanitized = regex::Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+")
        .unwrap()
        .replace_all(message, "${1}=***")
        .to_string();

    if sanitized.len() > 500 {
        let truncate_suffix = "...[truncated]";
        let max_content_len = 500 - truncate_suffix.len();
        sanitized = format!("{}{}", &sanitized[..max_content_len], truncate_suffix);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_note_serializes_with_type_tag() {
        let note = ErrorNote::error("CRM rejected the address");
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["note"], "CRM rejected the address");
        assert_eq!(json["type"], "error");
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_error_note_detail_round_trip() {
        let note = ErrorNote::error("save failed").with_detail("Api { status: 500 }");
        let json = serde_json::to_string(&note).unwrap();
        let decoded: ErrorNote = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, note);
        assert_eq!(decoded.detail.as_deref(), Some("Api { status: 500 }"));
    }

    #[test]
    fn test_sanitize_redacts_credentials() {
        let note = ErrorNote::error("auth failed: api_key=abc123 token: xyz789");

        assert!(!note.note.contains("abc123"));
        assert!(!note.note.contains("xyz789"));
        assert!(note.note.contains("key=***"));
        assert!(note.note.contains("token=***"));
    }

    #[test]
    fn test_sanitize_is_case_insensitive() {
        let sanitized = sanitize_note("PASSWORD=hunter2 Secret: deep");
        assert!(!sanitized.contains("hunter2"));
        assert!(!sanitized.contains("deep"));
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let sanitized = sanitize_note(&"x".repeat(600));
        assert!(sanitized.len() <= 500);
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[test]
    fn test_sanitize_leaves_exact_limit_alone() {
        let sanitized = sanitize_note(&"x".repeat(500));
        assert_eq!(sanitized.len(), 500);
        assert!(!sanitized.contains("truncated"));
    }

    #[test]
    fn test_bridge_error_wraps_crm_error() {
        let error: BridgeError = CrmError::Network("connection refused".to_string()).into();
        assert!(matches!(error, BridgeError::Crm(_)));
        assert!(error.to_string().contains("connection refused"));
    }
}
