use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fragments_store::StorageConfig;

use crate::error::{ServerError, ServerResult};

/// Largest accepted request body: 5 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Public base URL used to build `Location` headers.
    pub api_url: String,
    pub max_body_bytes: usize,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_url: "http://localhost:8080".into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// `{api_url}/v1/fragments/{id}`.
    pub fn fragment_url(&self, id: &str) -> String {
        format!("{}/v1/fragments/{id}", self.api_url.trim_end_matches('/'))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// HTTP Basic against the configured users.
    #[default]
    Basic,
    /// Accept every request. For local development only.
    AllowAll,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub users: Vec<UserEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub email: String,
    /// Argon2id PHC string, as printed by `fragments hash-password`.
    pub password_hash: String,
}
