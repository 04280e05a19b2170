use std::sync::Arc;

use bytes::Bytes;

use fragments_store::Backend;
use fragments_types::{ContentType, Extension, FragmentId, OwnerId};

use crate::directory::{self, Listing};
use crate::error::{FragmentError, FragmentResult};
use crate::fragment::Fragment;

/// A payload ready to be returned, with the content type to label it with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentData {
    pub data: Bytes,
    pub content_type: String,
}

/// The operations the HTTP layer exposes, each a single call.
///
/// Writes store the payload before the metadata record, so an interrupted
/// write can orphan a blob but never leaves a record describing bytes that
/// were not written.
#[derive(Clone, Debug)]
pub struct FragmentService {
    backend: Arc<Backend>,
}

impl FragmentService {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Store a new fragment.
    pub async fn create(
        &self,
        owner: &OwnerId,
        content_type: &str,
        data: Bytes,
    ) -> FragmentResult<Fragment> {
        let content_type = ContentType::parse(content_type)?;
        let mut fragment = Fragment::new(owner.clone(), content_type);
        fragment.set_data(&self.backend, data).await?;
        fragment.save(&self.backend).await?;
        tracing::info!(
            owner = owner.short(),
            id = %fragment.id(),
            content_type = %fragment.content_type(),
            size = fragment.size(),
            "fragment created"
        );
        Ok(fragment)
    }

    pub async fn list(&self, owner: &OwnerId, expand: bool) -> FragmentResult<Listing> {
        directory::list_fragments(&self.backend, owner, expand).await
    }

    pub async fn get_metadata(&self, owner: &OwnerId, id: &str) -> FragmentResult<Fragment> {
        Fragment::by_id(&self.backend, owner, &parse_id(id)?).await
    }

    /// Fetch a fragment's payload, converted to `ext` when one is given.
    ///
    /// Raw data is labelled with the stored content type; converted data
    /// with the extension's canonical type.
    pub async fn get_data(
        &self,
        owner: &OwnerId,
        id: &str,
        ext: Option<&str>,
    ) -> FragmentResult<FragmentData> {
        let target = match ext {
            Some(ext) => Some(
                Extension::parse(ext).ok_or_else(|| {
                    FragmentError::UnsupportedMediaType(format!("unknown extension {ext:?}"))
                })?,
            ),
            None => None,
        };
        let fragment = self.get_metadata(owner, id).await?;
        match target {
            None => Ok(FragmentData {
                data: fragment.get_data(&self.backend).await?,
                content_type: fragment.content_type().to_string(),
            }),
            Some(target) => {
                let converted = fragment.convert_to(&self.backend, target.as_str()).await?;
                Ok(FragmentData {
                    data: converted.data,
                    content_type: converted.media_type.to_string(),
                })
            }
        }
    }

    /// Replace a fragment's payload. The content type must match the
    /// stored type's base MIME.
    pub async fn update(
        &self,
        owner: &OwnerId,
        id: &str,
        content_type: &str,
        data: Bytes,
    ) -> FragmentResult<Fragment> {
        let content_type = ContentType::parse(content_type)?;
        let mut fragment = self.get_metadata(owner, id).await?;
        if content_type.media_type() != fragment.mime_type() {
            return Err(FragmentError::BadRequest(
                "Content-Type does not match existing fragment's content type".into(),
            ));
        }
        fragment.set_data(&self.backend, data).await?;
        fragment.save(&self.backend).await?;
        tracing::info!(owner = owner.short(), id = %fragment.id(), size = fragment.size(), "fragment updated");
        Ok(fragment)
    }

    /// Delete a fragment that must currently exist.
    pub async fn delete(&self, owner: &OwnerId, id: &str) -> FragmentResult<()> {
        let fragment = self.get_metadata(owner, id).await?;
        Fragment::delete(&self.backend, owner, fragment.id()).await?;
        tracing::info!(owner = owner.short(), id = %fragment.id(), "fragment deleted");
        Ok(())
    }
}

/// An id that cannot be valid cannot exist either.
fn parse_id(id: &str) -> FragmentResult<FragmentId> {
    FragmentId::new(id).map_err(|_| FragmentError::NotFound(id.to_string()))
}
