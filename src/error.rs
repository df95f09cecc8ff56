//! Structured error types for the study sheet engine.
//!
//! Overflow and malformed note content are handled inside the engine and
//! never surface here. What remains are the real failure sources: request
//! parsing, font loading/validation, and the footer timestamp.

use thiserror::Error;

/// Result alias used by every public entry point.
pub type Result<T> = std::result::Result<T, StudySheetError>;

/// The unified error type returned by the public studysheet API.
#[derive(Debug, Error)]
pub enum StudySheetError {
    /// JSON input failed to parse as a valid render request.
    #[error("Failed to parse render request: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A custom font could not be decoded, or a theme references a font
    /// family that is not registered.
    #[error("Font error: {0}")]
    Font(String),
    /// The `generatedAt` option is not a valid RFC 3339 timestamp.
    #[error("Invalid timestamp: {0}")]
    Timestamp(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for StudySheetError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the note schema. Expected {\"note\": {\"title\": ...}, \"options\": {...}}.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        StudySheetError::Parse { source: e, hint }
    }
}
