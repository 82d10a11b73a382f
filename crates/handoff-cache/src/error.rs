//! Handoff error types.

/// Result type for handoff operations.
pub type HandoffResult<T> = Result<T, HandoffError>;

/// A request component or response could not be serialized canonically.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode {what}: {source}")]
pub struct EncodingError {
    what: &'static str,
    #[source]
    source: serde_json::Error,
}

impl EncodingError {
    pub(crate) fn new(what: &'static str, source: serde_json::Error) -> Self {
        Self { what, source }
    }

    /// Which input failed to encode (e.g. `"params"`).
    pub fn component(&self) -> &'static str {
        self.what
    }
}

/// An exclusion pattern is not a valid regular expression.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid exclusion pattern `{pattern}`: {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

impl PatternError {
    pub(crate) fn new(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self {
            pattern: pattern.into(),
            source,
        }
    }

    /// The pattern as configured, including its slashes.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Errors raised by the handoff layer.
///
/// Errors of the wrapped request itself are never converted into this type.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A boxed payload did not decode into the requested type.
    #[error("corrupt payload for key {key}: {source}")]
    CorruptPayload {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The transferred shoebox document could not be parsed.
    #[error("invalid shoebox document: {0}")]
    Shoebox(#[source] serde_json::Error),
}
