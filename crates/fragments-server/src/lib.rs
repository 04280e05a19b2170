//! HTTP server for the fragments store.
//!
//! Wraps [`FragmentService`](fragments_core::FragmentService) in a REST API
//! under `/v1/fragments`. Every fragment route requires authentication; the
//! authenticated identity is hashed into the caller's owner id. Responses
//! use a `{"status": "ok" | "error", ...}` JSON envelope.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{hash_password, verify_password, AllowAllAuth, AuthProvider, BasicAuth, Credentials, Identity, Owner};
pub use config::{AuthConfig, AuthMode, ServerConfig, UserEntry};
pub use error::{ApiError, ApiResult, ServerError, ServerResult};
pub use router::build_router;
pub use server::FragmentsServer;
pub use state::AppState;
