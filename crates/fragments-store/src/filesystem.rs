//! Durable storage rooted at a local directory.
//!
//! Layout under the root:
//!
//! ```text
//! {root}/{ownerId}/{id}.json   metadata record (FilesystemMetadataStore)
//! {root}/{ownerId}/{id}        payload bytes   (FilesystemBlobStore)
//! ```
//!
//! The two stores are normally given different roots. Every write goes to a
//! uniquely named temporary file which is synced and then renamed over the
//! target, so readers never observe a partially written value.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use fragments_types::{FragmentId, OwnerId};

use crate::error::StoreResult;
use crate::record::FragmentRecord;
use crate::traits::{check_key, BlobStore, MetadataStore};

const RECORD_SUFFIX: &str = ".json";
const TEMP_PREFIX: &str = ".tmp.";

/// Write `data` to `path` through a synced temporary file and a rename.
async fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{TEMP_PREFIX}{}.{file_name}", Uuid::new_v4()));
    {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
    }
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file, mapping "not found" to `false`.
async fn remove_optional(path: &Path) -> StoreResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Empty `root`, leaving the directory itself in place.
async fn reset_dir(root: &Path) -> StoreResult<()> {
    match fs::remove_dir_all(root).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(root).await?;
    Ok(())
}

/// Metadata records stored as one JSON document per fragment.
pub struct FilesystemMetadataStore {
    root: PathBuf,
}

impl FilesystemMetadataStore {
    /// Open (creating if needed) a metadata store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner: &OwnerId) -> PathBuf {
        self.root.join(owner.as_str())
    }

    fn record_path(&self, owner: &OwnerId, id: &FragmentId) -> PathBuf {
        self.owner_dir(owner)
            .join(format!("{}{RECORD_SUFFIX}", id.as_str()))
    }
}

#[async_trait]
impl MetadataStore for FilesystemMetadataStore {
    #[instrument(skip(self, record), fields(backend = "filesystem"))]
    async fn put(
        &self,
        owner: &OwnerId,
        id: &FragmentId,
        record: &FragmentRecord,
    ) -> StoreResult<()> {
        check_key(owner, id, record)?;
        let data = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.record_path(owner, id), &data).await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<FragmentRecord>> {
        match read_optional(&self.record_path(owner, id)).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn query(&self, owner: &OwnerId) -> StoreResult<Vec<FragmentRecord>> {
        let mut entries = match fs::read_dir(self.owner_dir(owner)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(TEMP_PREFIX) || !name.ends_with(RECORD_SUFFIX) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // A record deleted between listing and reading is skipped.
            if let Some(data) = read_optional(&entry.path()).await? {
                records.push(serde_json::from_slice(&data)?);
            }
        }
        Ok(records)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool> {
        remove_optional(&self.record_path(owner, id)).await
    }

    async fn clear(&self) -> StoreResult<()> {
        reset_dir(&self.root).await
    }
}

impl std::fmt::Debug for FilesystemMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemMetadataStore")
            .field("root", &self.root)
            .finish()
    }
}

/// Payloads stored as one file per fragment, keyed `{ownerId}/{id}`.
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Open (creating if needed) a blob store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, owner: &OwnerId, id: &FragmentId) -> PathBuf {
        self.root.join(owner.as_str()).join(id.as_str())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put(&self, owner: &OwnerId, id: &FragmentId, data: Bytes) -> StoreResult<()> {
        write_atomic(&self.blob_path(owner, id), &data).await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<Option<Bytes>> {
        Ok(read_optional(&self.blob_path(owner, id)).await?.map(Bytes::from))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, owner: &OwnerId, id: &FragmentId) -> StoreResult<bool> {
        remove_optional(&self.blob_path(owner, id)).await
    }

    async fn clear(&self) -> StoreResult<()> {
        reset_dir(&self.root).await
    }
}

impl std::fmt::Debug for FilesystemBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemBlobStore")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::error::StoreError;
    use fragments_types::MediaType;

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    fn fid(s: &str) -> FragmentId {
        FragmentId::new(s).unwrap()
    }

    fn record(o: &str, id: &str) -> FragmentRecord {
        let now = Utc::now();
        FragmentRecord {
            id: fid(id),
            owner_id: owner(o),
            created: now,
            updated: now,
            content_type: MediaType::TextMarkdown.into(),
            size: 7,
        }
    }

    #[tokio::test]
    async fn record_is_written_under_owner_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemMetadataStore::new(dir.path()).await.unwrap();
        let rec = record("o1", "f1");
        store.put(&owner("o1"), &fid("f1"), &rec).await.unwrap();

        assert!(dir.path().join("o1").join("f1.json").is_file());
        let back = store.get(&owner("o1"), &fid("f1")).await.unwrap();
        assert_eq!(back, Some(rec));
    }

    #[tokio::test]
    async fn query_skips_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemMetadataStore::new(dir.path()).await.unwrap();
        store.put(&owner("o1"), &fid("f1"), &record("o1", "f1")).await.unwrap();
        std::fs::write(dir.path().join("o1").join(".tmp.junk.json"), b"{").unwrap();

        let records = store.query(&owner("o1")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(store.query(&owner("o2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemMetadataStore::new(dir.path()).await.unwrap();
        std::fs::create_dir_all(dir.path().join("o1")).unwrap();
        std::fs::write(dir.path().join("o1").join("bad.json"), b"not json").unwrap();

        let err = store.get(&owner("o1"), &fid("bad")).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn blob_key_is_owner_slash_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        store
            .put(&owner("o1"), &fid("f1"), Bytes::from_static(b"payload"))
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("o1/f1")).unwrap(), b"payload");
        let data = store.get(&owner("o1"), &fid("f1")).await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        for body in [&b"one"[..], &b"two"[..]] {
            store
                .put(&owner("o1"), &fid("f1"), Bytes::copy_from_slice(body))
                .await
                .unwrap();
        }
        let names: Vec<_> = std::fs::read_dir(dir.path().join("o1"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        let data = store.get(&owner("o1"), &fid("f1")).await.unwrap().unwrap();
        assert_eq!(&data[..], b"two");
    }

    #[tokio::test]
    async fn clear_empties_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path().join("blobs")).await.unwrap();
        store.put(&owner("o1"), &fid("f1"), Bytes::new()).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.root().is_dir());
        assert!(store.get(&owner("o1"), &fid("f1")).await.unwrap().is_none());
    }
}
