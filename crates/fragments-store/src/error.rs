/// Errors from storage backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record passed to `put` does not belong to the key it was written under.
    #[error("record key mismatch: expected {expected}, got {actual}")]
    KeyMismatch { expected: String, actual: String },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// The backend has been shut down.
    #[error("store is unavailable")]
    Unavailable,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
