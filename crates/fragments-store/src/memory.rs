use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::instrument;

use fragments_types::{FragmentId, OwnerId};

use crate::error::{StoreError, StoreResult};
use crate::record::FragmentRecord;
use crate::traits::{check_key, BlobStore, MetadataStore};

/// Two-level map `owner -> id -> value` behind a `RwLock`.
///
/// Values are cloned on read and write. Locks are never held across an
/// `.await`.
struct OwnerMap<V> {
    entries: RwLock<HashMap<OwnerId, BTreeMap<FragmentId, V>>>,
}

impl<V: Clone> OwnerMap<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn put(&self, owner: &OwnerId, id: &FragmentId, value: V) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.entry(owner.clone()).or_default().insert(id.clone(), value);
        Ok(())
    }

    fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<V>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(owner).and_then(|values| values.get(id)).cloned())
    }

    fn query(&self, owner: &OwnerId) -> StoreResult<Vec<V>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map
            .get(owner)
            .map(|values| values.values().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(values) = map.get_mut(owner) else {
            return Ok(false);
        };
        let existed = values.remove(id).is_some();
        if values.is_empty() {
            map.remove(owner);
        }
        Ok(existed)
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .map(|map| map.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }
}

/// In-memory metadata store for tests and development.
pub struct InMemoryMetadataStore {
    records: OwnerMap<FragmentRecord>,
}

impl InMemoryMetadataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: OwnerMap::new(),
        }
    }

    /// Number of records across all owners.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    #[instrument(skip(self, record), fields(backend = "memory"))]
    async fn put(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        record: &FragmentRecord,
    ) -> StoreResult<()> {
        check_key(owner, id, record)?;
        self.records.put(owner, id, record.clone())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<FragmentRecord>> {
        self.records.get(owner, id)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn query(&self, owner: &OwnerId) -> StoreResult<Vec<FragmentRecord>> {
        self.records.query(owner)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool> {
        self.records.delete(owner, id)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.records.clear()
    }
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMetadataStore")
            .field("record_count", &self.len())
            .finish()
    }
}

/// In-memory payload store for tests and development.
pub struct InMemoryBlobStore {
    blobs: OwnerMap<Bytes>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blobs: OwnerMap::new(),
        }
    }

    /// Number of payloads across all owners.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` if no payloads are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put(&self, owner: &OwnerId, id: &FragmentId, data: Bytes) -> StoreResult<()> {
        self.blobs.put(owner, id, data)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<Bytes>> {
        self.blobs.get(owner, id)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool> {
        self.blobs.delete(owner, id)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.blobs.clear()
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
