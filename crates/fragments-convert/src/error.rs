use fragments_types::{Extension, MediaType};
use thiserror::Error;

/// Errors produced while converting a payload.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The source type does not list the target extension.
    #[error("{from} cannot be converted to {to}")]
    Unsupported { from: MediaType, to: Extension },

    /// The payload could not be decoded as its declared image type.
    #[error("failed to decode {from} payload: {reason}")]
    Decode { from: MediaType, reason: String },

    /// The decoded image could not be encoded in the target format.
    #[error("failed to encode {to} output: {reason}")]
    Encode { to: Extension, reason: String },

    /// The blocking codec task was cancelled or panicked.
    #[error("conversion task failed: {0}")]
    Task(String),
}

impl ConvertError {
    /// `true` for errors caused by the request rather than by the codec.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
