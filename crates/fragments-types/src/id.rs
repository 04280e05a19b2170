use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Check that `value` is safe to use as one segment of a storage key.
fn validate_segment(kind: &'static str, value: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidId {
        kind,
        reason: reason.to_string(),
    };
    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(invalid("must not be a relative path component"));
    }
    if value.contains(['/', '\\']) {
        return Err(invalid("must not contain path separators"));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    Ok(())
}

/// Opaque identifier of a fragment, unique within its owner.
///
/// Generated identifiers are UUID v4 strings. Caller-supplied identifiers
/// are accepted as long as they are a single key segment without a `.`,
/// since `.` separates an id from a conversion extension in URLs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FragmentId(String);

impl FragmentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap a caller-supplied identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        validate_segment("fragment id", &value)?;
        if value.contains('.') {
            return Err(TypeError::InvalidId {
                kind: "fragment id",
                reason: "must not contain '.'".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FragmentId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FragmentId> for String {
    fn from(id: FragmentId) -> Self {
        id.0
    }
}

impl fmt::Debug for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FragmentId({})", self.0)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque tenant identifier.
///
/// The core never interprets an owner id. The HTTP layer derives one from
/// an authenticated identity with [`OwnerId::derive`] so that raw
/// credentials never reach storage keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an already-opaque owner string.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        validate_segment("owner id", &value)?;
        Ok(Self(value))
    }

    /// Derive an owner id from an authenticated identity (e.g. an email).
    ///
    /// The result is the hex BLAKE3 digest of the domain-separated
    /// identity, so the same identity always maps to the same owner.
    pub fn derive(identity: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"fragments-owner-v1:");
        hasher.update(identity.as_bytes());
        Self(hex::encode(hasher.finalize().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for logs (first 8 characters).
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for OwnerId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.short())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_uuids() {
        let id = FragmentId::generate();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<FragmentId> = (0..1000).map(|_| FragmentId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn caller_supplied_id_is_kept() {
        let id = FragmentId::new("id").unwrap();
        assert_eq!(id.as_str(), "id");
    }

    #[test]
    fn fragment_id_rejects_unsafe_values() {
        for bad in ["", ".", "..", "a/b", "a\\b", "a.txt", "a\nb"] {
            assert!(FragmentId::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn owner_id_rejects_unsafe_values() {
        for bad in ["", "..", "x/y"] {
            assert!(OwnerId::new(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(OwnerId::new("1234").is_ok());
    }

    #[test]
    fn derive_is_deterministic() {
        let a = OwnerId::derive("user1@email.com");
        let b = OwnerId::derive("user1@email.com");
        let c = OwnerId::derive("user2@email.com");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
        assert!(OwnerId::new(a.as_str()).is_ok());
    }

    #[test]
    fn short_owner_is_eight_chars() {
        let owner = OwnerId::derive("someone");
        assert_eq!(owner.short().len(), 8);
        let tiny = OwnerId::new("ab").unwrap();
        assert_eq!(tiny.short(), "ab");
    }

    #[test]
    fn serde_roundtrip_validates() {
        let id = FragmentId::new("abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: FragmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<FragmentId>("\"a/b\"").is_err());
    }
}
