use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::{StoreError, StoreResult};
use crate::filesystem::{FilesystemBlobStore, FilesystemMetadataStore};
use crate::memory::{InMemoryBlobStore, InMemoryMetadataStore};
use crate::traits::{BlobStore, MetadataStore};

/// The pair of stores a fragment is persisted to.
///
/// Constructed once at process start and shared by reference (`Arc`) with
/// every request. Both halves must be safe for concurrent use.
pub struct Backend {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    kind: &'static str,
    closed: AtomicBool,
}

impl Backend {
    /// Assemble a backend from explicit halves.
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_kind(metadata, blobs, "custom")
    }

    fn with_kind(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        kind: &'static str,
    ) -> Self {
        Self {
            metadata,
            blobs,
            kind,
            closed: AtomicBool::new(false),
        }
    }

    /// A fresh in-memory backend.
    pub fn memory() -> Self {
        Self::with_kind(
            Arc::new(InMemoryMetadataStore::new()),
            Arc::new(InMemoryBlobStore::new()),
            "memory",
        )
    }

    /// Open the backend described by `config`.
    pub async fn init(config: &StorageConfig) -> StoreResult<Self> {
        let backend = match config {
            StorageConfig::Memory => Self::memory(),
            StorageConfig::Filesystem { root } => {
                let metadata = FilesystemMetadataStore::new(root.join("metadata")).await?;
                let blobs = FilesystemBlobStore::new(root.join("data")).await?;
                Self::with_kind(Arc::new(metadata), Arc::new(blobs), "filesystem")
            }
        };
        tracing::info!(backend = backend.kind, "storage backend initialized");
        Ok(backend)
    }

    /// The metadata half.
    pub fn metadata(&self) -> StoreResult<&dyn MetadataStore> {
        self.ensure_open()?;
        Ok(self.metadata.as_ref())
    }

    /// The payload half.
    pub fn blobs(&self) -> StoreResult<&dyn BlobStore> {
        self.ensure_open()?;
        Ok(self.blobs.as_ref())
    }

    /// Short backend name for logs.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drop every record and payload. Intended for tests.
    pub async fn reset(&self) -> StoreResult<()> {
        self.ensure_open()?;
        self.metadata.clear().await?;
        self.blobs.clear().await?;
        tracing::debug!(backend = self.kind, "storage backend reset");
        Ok(())
    }

    /// Stop accepting operations and release both halves.
    ///
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&self) -> StoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let metadata = self.metadata.shutdown().await;
        let blobs = self.blobs.shutdown().await;
        tracing::info!(backend = self.kind, "storage backend shut down");
        metadata.and(blobs)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("closed", &self.is_closed())
            .finish()
    }
}
