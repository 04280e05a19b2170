use async_trait::async_trait;
use bytes::Bytes;

use fragments_types::{FragmentId, OwnerId};

use crate::error::StoreResult;
use crate::record::FragmentRecord;

/// Structured metadata storage, partitioned by owner.
///
/// All implementations must satisfy these invariants:
/// - Per-key last write wins.
/// - `get` returns `Ok(None)` for an absent key.
/// - `query` returns only the given owner's records, in no defined order.
/// - Safe for concurrent use by many in-flight operations.
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Write (create or overwrite) the record for `(owner, id)`.
    ///
    /// Fails with [`StoreError::KeyMismatch`](crate::StoreError::KeyMismatch)
    /// if the record's own owner/id differ from the key.
    async fn put(&self, owner: &OwnerId, id: &FragmentId, record: &FragmentRecord)
        -> StoreResult<()>;

    /// Read the record for `(owner, id)`.
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<FragmentRecord>>;

    /// All records belonging to `owner`.
    async fn query(&self, owner: &OwnerId) -> StoreResult<Vec<FragmentRecord>>;

    /// Delete the record for `(owner, id)`. Returns `true` if it existed.
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool>;

    /// Remove every record. Intended for resetting state between tests.
    async fn clear(&self) -> StoreResult<()>;

    /// Release any held resources. The default does nothing.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Raw payload storage keyed by `(owner, id)`.
///
/// The store never interprets payload bytes. A zero-length payload is a
/// present value and is distinct from `Ok(None)`.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Write (create or overwrite) the payload for `(owner, id)`.
    async fn put(&self, owner: &OwnerId, id: &FragmentId, data: Bytes) -> StoreResult<()>;

    /// Read the payload for `(owner, id)`.
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<Bytes>>;

    /// Delete the payload for `(owner, id)`. Returns `true` if it existed.
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool>;

    /// Remove every payload. Intended for resetting state between tests.
    async fn clear(&self) -> StoreResult<()>;

    /// Release any held resources. The default does nothing.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Verify that `record` is being stored under its own key.
pub(crate) fn check_key(owner: &OwnerId, id: &FragmentId, record: &FragmentRecord) -> StoreResult<()> {
    if &record.owner_id != owner || &record.id != id {
        return Err(crate::error::StoreError::KeyMismatch {
            expected: crate::record::storage_key(owner, id),
            actual: record.key(),
        });
    }
    Ok(())
}
