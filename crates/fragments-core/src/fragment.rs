use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fragments_convert::Converted;
use fragments_store::{Backend, FragmentRecord, StoreResult};
use fragments_types::{ContentType, Extension, FragmentId, MediaType, OwnerId};

use crate::directory::{self, Listing};
use crate::error::{FragmentError, FragmentResult, InternalError};

/// Log a failed storage call with its context and convert the error.
pub(crate) fn storage<T>(
    op: &'static str,
    owner: &OwnerId,
    id: Option<&FragmentId>,
    result: StoreResult<T>,
) -> FragmentResult<T> {
    result.map_err(|e| {
        tracing::error!(
            op,
            owner = owner.short(),
            id = id.map(FragmentId::as_str),
            error = %e,
            "storage operation failed"
        );
        e.into()
    })
}

/// A typed, owned unit of content.
///
/// Holds the metadata record only. The payload lives in the backend's blob
/// store and is read and written through [`get_data`](Self::get_data) and
/// [`set_data`](Self::set_data).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fragment {
    record: FragmentRecord,
}

/// Builder for a fragment from unvalidated parts.
#[derive(Clone, Debug)]
pub struct FragmentBuilder {
    owner_id: String,
    content_type: String,
    id: Option<String>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    size: u64,
}

impl FragmentBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Validate every part and produce an unsaved fragment.
    pub fn build(self) -> FragmentResult<Fragment> {
        let invalid = |msg: String| {
            tracing::debug!(reason = %msg, "fragment construction rejected");
            FragmentError::Validation(msg)
        };
        if self.owner_id.is_empty() {
            return Err(invalid("ownerId is required".into()));
        }
        if self.content_type.trim().is_empty() {
            return Err(invalid("type is required".into()));
        }
        let owner_id = OwnerId::new(self.owner_id).map_err(|e| invalid(e.to_string()))?;
        let content_type =
            ContentType::parse(&self.content_type).map_err(|e| invalid(e.to_string()))?;
        let id = match self.id {
            Some(id) => FragmentId::new(id).map_err(|e| invalid(e.to_string()))?,
            None => FragmentId::generate(),
        };
        let created = self.created.unwrap_or_else(Utc::now);
        let updated = self.updated.unwrap_or(created);
        Ok(Fragment {
            record: FragmentRecord {
                id,
                owner_id,
                created,
                updated,
                content_type,
                size: self.size,
            },
        })
    }
}

/// Wire shape accepted by [`Fragment::from_json`]; optional fields take
/// their construction defaults.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FragmentInput {
    owner_id: String,
    #[serde(rename = "type")]
    content_type: String,
    id: Option<String>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    size: Option<u64>,
}

impl Fragment {
    /// A fresh fragment with a generated id and zero size.
    pub fn new(owner_id: OwnerId, content_type: ContentType) -> Self {
        let now = Utc::now();
        Self {
            record: FragmentRecord {
                id: FragmentId::generate(),
                owner_id,
                created: now,
                updated: now,
                content_type,
                size: 0,
            },
        }
    }

    pub fn builder(owner_id: impl Into<String>, content_type: impl Into<String>) -> FragmentBuilder {
        FragmentBuilder {
            owner_id: owner_id.into(),
            content_type: content_type.into(),
            id: None,
            created: None,
            updated: None,
            size: 0,
        }
    }

    /// Construct from a JSON object such as `{"ownerId": .., "type": ..}`.
    ///
    /// A missing owner or type, an unsupported type, or a size that is not
    /// a non-negative integer is a validation error.
    pub fn from_json(value: serde_json::Value) -> FragmentResult<Self> {
        let input: FragmentInput = serde_json::from_value(value)
            .map_err(|e| FragmentError::Validation(e.to_string()))?;
        let mut builder = Self::builder(input.owner_id, input.content_type)
            .size(input.size.unwrap_or(0));
        if let Some(id) = input.id {
            builder = builder.id(id);
        }
        if let Some(created) = input.created {
            builder = builder.created(created);
        }
        if let Some(updated) = input.updated {
            builder = builder.updated(updated);
        }
        builder.build()
    }

    /// Rebuild an entity from a stored record.
    pub fn from_record(record: FragmentRecord) -> Self {
        Self { record }
    }

    // ---- Accessors ----

    pub fn id(&self) -> &FragmentId {
        &self.record.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.record.owner_id
    }

    pub fn content_type(&self) -> &ContentType {
        &self.record.content_type
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.record.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.record.updated
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    pub fn record(&self) -> &FragmentRecord {
        &self.record
    }

    pub fn into_record(self) -> FragmentRecord {
        self.record
    }

    // ---- Type predicates ----

    /// The base MIME type, parameters stripped.
    pub fn mime_type(&self) -> MediaType {
        self.record.content_type.media_type()
    }

    pub fn is_text(&self) -> bool {
        self.mime_type().is_text()
    }

    pub fn is_image(&self) -> bool {
        self.mime_type().is_image()
    }

    /// Canonical MIME types this fragment can be served as.
    pub fn formats(&self) -> Vec<MediaType> {
        self.mime_type()
            .conversions()
            .iter()
            .map(Extension::media_type)
            .collect()
    }

    /// Returns `true` if `value` is a content type the store accepts.
    pub fn is_supported_type(value: &str) -> bool {
        fragments_types::is_supported_type(value)
    }

    /// Returns `true` if this fragment can be served as `ext` (`.html`,
    /// `png`, ...). Unknown extensions are never convertible.
    pub fn is_convertible_to(&self, ext: &str) -> bool {
        Extension::parse(ext).is_some_and(|e| fragments_convert::is_convertible(self.mime_type(), e))
    }

    // ---- Directory ----

    /// List `owner`'s fragments as ids, or as full records when `expand`.
    pub async fn by_user(backend: &Backend, owner: &OwnerId, expand: bool) -> FragmentResult<Listing> {
        directory::list_fragments(backend, owner, expand).await
    }

    /// Load one fragment's metadata.
    pub async fn by_id(backend: &Backend, owner: &OwnerId, id: &FragmentId) -> FragmentResult<Self> {
        let metadata = storage("get", owner, Some(id), backend.metadata())?;
        let record = storage("get", owner, Some(id), metadata.get(owner, id).await)?;
        record
            .map(Self::from_record)
            .ok_or_else(|| FragmentError::NotFound(id.to_string()))
    }

    /// Remove both the metadata record and the payload.
    ///
    /// Halves that are already absent count as removed. Both removals are
    /// attempted; the first error is returned and nothing is rolled back.
    pub async fn delete(backend: &Backend, owner: &OwnerId, id: &FragmentId) -> FragmentResult<()> {
        let metadata = match backend.metadata() {
            Ok(store) => store.delete(owner, id).await,
            Err(e) => Err(e),
        };
        let blob = match backend.blobs() {
            Ok(store) => store.delete(owner, id).await,
            Err(e) => Err(e),
        };
        // Both halves are logged before the first error is returned.
        let metadata = storage("delete metadata", owner, Some(id), metadata);
        let blob = storage("delete data", owner, Some(id), blob);
        let (meta_removed, blob_removed) = (metadata?, blob?);
        tracing::debug!(
            owner = owner.short(),
            id = %id,
            meta_removed,
            blob_removed,
            "fragment deleted"
        );
        Ok(())
    }

    // ---- Persistence ----

    /// Refresh `updated` and write the metadata record. Last write wins.
    pub async fn save(&mut self, backend: &Backend) -> FragmentResult<()> {
        self.record.updated = Utc::now();
        let (owner, id) = (&self.record.owner_id, &self.record.id);
        let metadata = storage("save", owner, Some(id), backend.metadata())?;
        storage("save", owner, Some(id), metadata.put(owner, id, &self.record).await)
    }

    /// Read the payload.
    pub async fn get_data(&self, backend: &Backend) -> FragmentResult<Bytes> {
        let (owner, id) = (&self.record.owner_id, &self.record.id);
        let blobs = storage("get_data", owner, Some(id), backend.blobs())?;
        match storage("get_data", owner, Some(id), blobs.get(owner, id).await)? {
            Some(data) => Ok(data),
            None => {
                tracing::error!(owner = owner.short(), id = %id, op = "get_data", "payload missing");
                Err(InternalError::MissingData(id.clone()).into())
            }
        }
    }

    /// Write the payload, recompute `size`, and refresh `updated`.
    ///
    /// Does not write metadata; call [`save`](Self::save) afterwards.
    pub async fn set_data(&mut self, backend: &Backend, data: Bytes) -> FragmentResult<()> {
        let size = data.len() as u64;
        {
            let (owner, id) = (&self.record.owner_id, &self.record.id);
            let blobs = storage("set_data", owner, Some(id), backend.blobs())?;
            storage("set_data", owner, Some(id), blobs.put(owner, id, data).await)?;
        }
        self.record.size = size;
        self.record.updated = Utc::now();
        Ok(())
    }

    // ---- Conversion ----

    /// Produce the payload as `ext`. The stored payload is not modified.
    pub async fn convert_to(&self, backend: &Backend, ext: &str) -> FragmentResult<Converted> {
        let target = Extension::parse(ext).ok_or_else(|| {
            FragmentError::UnsupportedMediaType(format!("unknown extension {ext:?}"))
        })?;
        fragments_convert::plan(self.mime_type(), target)?;
        let data = self.get_data(backend).await?;
        Ok(fragments_convert::convert(self.mime_type(), target, data).await?)
    }
}
