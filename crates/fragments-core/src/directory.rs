use serde::Serialize;

use fragments_store::{Backend, FragmentRecord};
use fragments_types::{FragmentId, OwnerId};

use crate::error::FragmentResult;
use crate::fragment::storage;

/// One owner's fragments, as bare ids or as full metadata records.
///
/// Serializes as a plain JSON array either way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Ids(Vec<FragmentId>),
    Expanded(Vec<FragmentRecord>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Expanded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The listed ids, whichever form the listing is in.
    pub fn ids(&self) -> Vec<&FragmentId> {
        match self {
            Self::Ids(ids) => ids.iter().collect(),
            Self::Expanded(records) => records.iter().map(|r| &r.id).collect(),
        }
    }
}

/// List every fragment belonging to `owner`. No order is guaranteed.
pub async fn list_fragments(
    backend: &Backend,
    owner: &OwnerId,
    expand: bool,
) -> FragmentResult<Listing> {
    let metadata = storage("query", owner, None, backend.metadata())?;
    let records = storage("query", owner, None, metadata.query(owner).await)?;
    Ok(if expand {
        Listing::Expanded(records)
    } else {
        Listing::Ids(records.into_iter().map(|r| r.id).collect())
    })
}
