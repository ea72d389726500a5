//! Structured error types for the textflow layout engine.
//!
//! Argument and range errors are raised at the public API boundary before any
//! state changes. Metrics failures come from the measurement collaborator and
//! are passed through untouched.

use thiserror::Error;

/// The unified error type returned by all public textflow API functions.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A setter or query received a value it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// An offset or line index lies outside the current text.
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    /// The layout was used after `dispose()`.
    #[error("Text layout has been disposed")]
    Disposed,
    /// The metrics provider could not measure some text.
    #[error("Metrics failure: {0}")]
    MetricsFailure(String),
    /// A font file could not be loaded or parsed.
    #[error("Font error: {0}")]
    FontLoad(String),
    /// JSON input failed to parse as a layout document.
    #[error("Failed to parse layout document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

/// Error reported by a [`MetricsProvider`](crate::font::MetricsProvider).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct MetricsError {
    pub message: String,
}

impl MetricsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<MetricsError> for LayoutError {
    fn from(e: MetricsError) -> Self {
        LayoutError::MetricsFailure(e.message)
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the layout document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_carries_hint() {
        let err: LayoutError = serde_json::from_str::<serde_json::Value>("{ \"text\": }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint: Check for trailing commas"), "got: {msg}");
    }

    #[test]
    fn test_metrics_error_converts() {
        let err: LayoutError = MetricsError::new("no glyphs").into();
        assert!(matches!(err, LayoutError::MetricsFailure(ref m) if m == "no glyphs"));
    }
}
