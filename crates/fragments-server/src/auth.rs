use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use fragments_types::OwnerId;

use crate::config::{AuthConfig, AuthMode};
use crate::error::{ApiError, ServerError, ServerResult};
use crate::state::AppState;

/// Identity used by [`AllowAllAuth`] when a request carries no credentials.
pub const DEV_IDENTITY: &str = "dev@localhost";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn user(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The tenant this identity owns fragments as.
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::derive(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Basic { user: String, password: String },
    Malformed,
    Anonymous,
}

impl Credentials {
    /// Read credentials from the `Authorization` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Self::Anonymous;
        };
        let Ok(value) = value.to_str() else {
            return Self::Malformed;
        };
        // The scheme name is case-insensitive.
        match value.split_once(' ') {
            Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("basic") => {
                Self::decode_basic(encoded.trim()).unwrap_or(Self::Malformed)
            }
            _ => Self::Malformed,
        }
    }

    fn decode_basic(encoded: &str) -> Option<Self> {
        let decoded = STANDARD.decode(encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some(Self::Basic {
            user: user.to_string(),
            password: password.to_string(),
        })
    }
}

/// Salted Argon2id PHC string for [`UserEntry::password_hash`](crate::config::UserEntry).
pub fn hash_password(password: &str) -> ServerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServerError::PasswordHash(e.to_string()))
}

/// Check `password` against a PHC string. Comparison is constant-time.
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts every request. Basic credentials pick the identity; anything
/// else maps to [`DEV_IDENTITY`].
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Basic { user, .. } if !user.is_empty() => Ok(Identity::user(user.as_str())),
            _ => Ok(Identity::user(DEV_IDENTITY)),
        }
    }
}

/// HTTP Basic against a fixed user list.
pub struct BasicAuth {
    users: HashMap<String, Arc<str>>,
}

impl BasicAuth {
    /// Build from config. Entries with an unparseable hash are skipped.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut users = HashMap::new();
        for entry in &config.users {
            let phc = entry.password_hash.trim();
            match PasswordHash::new(phc) {
                Ok(_) => {
                    users.insert(entry.email.clone(), Arc::from(phc));
                }
                Err(e) => {
                    tracing::warn!(email = %entry.email, error = %e, "ignoring user with invalid password hash");
                }
            }
        }
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl AuthProvider for BasicAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        let Credentials::Basic { user, password } = credentials else {
            return Err(ServerError::AuthFailed("missing basic credentials".into()));
        };
        let expected = self
            .users
            .get(user)
            .cloned()
            .ok_or_else(|| ServerError::AuthFailed("unknown user".into()))?;
        // Argon2 verification is CPU-bound.
        let password = password.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &expected))
            .await
            .map_err(|e| ServerError::AuthFailed(format!("verification task failed: {e}")))?;
        if verified {
            Ok(Identity::user(user.as_str()))
        } else {
            Err(ServerError::AuthFailed("wrong password".into()))
        }
    }
}

/// The provider selected by `config.mode`.
pub fn provider_for(config: &AuthConfig) -> Arc<dyn AuthProvider> {
    match config.mode {
        AuthMode::AllowAll => {
            tracing::warn!("authentication disabled: every request is accepted");
            Arc::new(AllowAllAuth)
        }
        AuthMode::Basic => {
            let provider = BasicAuth::from_config(config);
            if provider.is_empty() {
                tracing::warn!("basic auth has no users configured; every request will be rejected");
            }
            Arc::new(provider)
        }
    }
}

/// The caller's resolved tenant, inserted by [`require_owner`].
#[derive(Clone, Debug)]
pub struct Owner(pub OwnerId);

/// Middleware: authenticate the request and attach its [`Owner`].
pub async fn require_owner(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = Credentials::from_headers(req.headers());
    let identity = state.auth.authenticate(&credentials).await.map_err(|e| {
        tracing::warn!(error = %e, "rejected request");
        ApiError::unauthorized()
    })?;
    let owner = identity.owner_id();
    tracing::debug!(owner = owner.short(), "authenticated");
    req.extensions_mut().insert(Owner(owner));
    Ok(next.run(req).await)
}
