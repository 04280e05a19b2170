//! Storage backends for fragments.
//!
//! Fragment state lives in two halves that are written and read by
//! separate calls:
//!
//! - a [`MetadataStore`] holding one [`FragmentRecord`] per `(owner, id)`
//! - a [`BlobStore`] holding the raw payload bytes per `(owner, id)`
//!
//! # Storage Backends
//!
//! - [`InMemoryMetadataStore`] / [`InMemoryBlobStore`] -- map-based stores for tests and development
//! - [`FilesystemMetadataStore`] / [`FilesystemBlobStore`] -- durable stores rooted at a directory
//!
//! [`Backend`] bundles one of each and owns their lifecycle.
//!
//! # Design Rules
//!
//! 1. Per-key last write wins. There is no optimistic concurrency check.
//! 2. `get` on an absent key returns `Ok(None)`, never an empty value.
//! 3. `query` is scoped to one owner and has no defined order.
//! 4. Deleting an absent key is not an error; it reports `false`.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod backend;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod memory;
pub mod record;
pub mod traits;

pub use backend::Backend;
pub use config::StorageConfig;
pub use error::{StoreError, StoreResult};
pub use filesystem::{FilesystemBlobStore, FilesystemMetadataStore};
pub use memory::{InMemoryBlobStore, InMemoryMetadataStore};
pub use record::FragmentRecord;
pub use traits::{BlobStore, MetadataStore};
