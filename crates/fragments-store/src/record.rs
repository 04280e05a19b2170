use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fragments_types::{ContentType, FragmentId, OwnerId};

/// Persisted metadata for one fragment.
///
/// Field names match the wire format (`ownerId`, `type`), so a record can be
/// returned to HTTP callers as-is. Timestamps serialize as ISO-8601.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: FragmentId,
    pub owner_id: OwnerId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub size: u64,
}

impl FragmentRecord {
    /// Storage key in `{ownerId}/{id}` form.
    pub fn key(&self) -> String {
        storage_key(&self.owner_id, &self.id)
    }
}

/// The `{ownerId}/{id}` key both halves of a fragment are stored under.
pub fn storage_key(owner: &OwnerId, id: &FragmentId) -> String {
    format!("{owner}/{id}")
}
