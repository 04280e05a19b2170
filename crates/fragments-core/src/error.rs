use fragments_convert::ConvertError;
use fragments_store::StoreError;
use fragments_types::{FragmentId, TypeError};
use thiserror::Error;

/// Failures that are the server's fault rather than the caller's.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("conversion error: {0}")]
    Convert(ConvertError),

    #[error("metadata for {0} exists but its data is missing")]
    MissingData(FragmentId),
}

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("invalid fragment: {0}")]
    Validation(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("fragment {0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl FragmentError {
    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::UnsupportedMediaType(_) => 415,
            Self::Internal(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<StoreError> for FragmentError {
    fn from(e: StoreError) -> Self {
        Self::Internal(InternalError::Store(e))
    }
}

impl From<ConvertError> for FragmentError {
    fn from(e: ConvertError) -> Self {
        if e.is_unsupported() {
            Self::UnsupportedMediaType(e.to_string())
        } else {
            Self::Internal(InternalError::Convert(e))
        }
    }
}

impl From<TypeError> for FragmentError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::MalformedContentType { .. }
            | TypeError::UnsupportedMediaType(_)
            | TypeError::UnknownExtension(_) => Self::UnsupportedMediaType(e.to_string()),
            TypeError::InvalidId { .. } => Self::Validation(e.to_string()),
        }
    }
}

pub type FragmentResult<T> = Result<T, FragmentError>;
