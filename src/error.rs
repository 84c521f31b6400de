//! Error types for the sentence typing library.
//!
//! Only malformed input is an error here. Heuristic misses (no abstract heading,
//! no caption match) leave blocks in their default type and are not reported.

use crate::document::Layer;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while typing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A span whose start lies after its end
    #[error("Invalid span: start {start} is greater than end {end}")]
    InvalidSpan {
        /// Start offset of the offending span
        start: usize,
        /// End offset of the offending span
        end: usize,
    },

    /// A span group with no spans where at least one is required
    #[error("Span group has no spans: {0}")]
    EmptySpanGroup(String),

    /// Geometry merge requested without a document to look tokens up in
    #[error("A document is required to merge boxes for a span group")]
    MissingDocument,

    /// A document collection needed by an operation has not been attached
    #[error("Document layer not available: {0}")]
    MissingLayer(Layer),

    /// A configured caption label produced an invalid pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A type label outside the closed label set
    #[error("Unknown span type: {0}")]
    UnknownSpanType(String),

    /// Malformed serialized document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_span_error() {
        let err = Error::InvalidSpan { start: 10, end: 4 };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid span"));
        assert!(msg.contains("10"));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_missing_layer_error() {
        let err = Error::MissingLayer(Layer::TypedBlocks);
        let msg = format!("{}", err);
        assert!(msg.contains("typed_blocks"));
    }

    #[test]
    fn test_invalid_pattern_from_regex() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: Error = regex_err.into();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
