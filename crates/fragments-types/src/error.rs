use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed content type {value:?}: {reason}")]
    MalformedContentType { value: String, reason: String },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("unknown extension: {0:?}")]
    UnknownExtension(String),

    #[error("invalid {kind}: {reason}")]
    InvalidId { kind: &'static str, reason: String },
}
