use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which storage backend to run with.
///
/// In TOML:
///
/// ```toml
/// [storage]
/// kind = "filesystem"
/// root = "/var/lib/fragments"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local maps. Everything is lost on exit.
    #[default]
    Memory,
    /// Metadata under `{root}/metadata`, payloads under `{root}/data`.
    Filesystem { root: PathBuf },
}

impl StorageConfig {
    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::Filesystem { root: root.into() }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Filesystem { .. } => "filesystem",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        storage: StorageConfig,
    }

    #[test]
    fn default_is_memory() {
        assert_eq!(StorageConfig::default(), StorageConfig::Memory);
        assert_eq!(StorageConfig::default().kind(), "memory");
    }

    #[test]
    fn filesystem_from_json() {
        let w: Wrapper =
            serde_json::from_str(r#"{"storage":{"kind":"filesystem","root":"/tmp/frag"}}"#).unwrap();
        assert_eq!(w.storage, StorageConfig::filesystem("/tmp/frag"));
    }

    #[test]
    fn memory_from_json() {
        let w: Wrapper = serde_json::from_str(r#"{"storage":{"kind":"memory"}}"#).unwrap();
        assert_eq!(w.storage, StorageConfig::Memory);
    }
}
