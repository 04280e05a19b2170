//! Foundation types for the fragments object store.
//!
//! Every other fragments crate depends on `fragments-types`. It holds the
//! static type registry and the identifiers that key persisted state.
//!
//! # Key Types
//!
//! - [`MediaType`] -- Closed set of supported base MIME types
//! - [`Extension`] -- Conversion targets addressed by file extension
//! - [`ContentType`] -- A validated `Content-Type` value (base MIME plus parameters)
//! - [`FragmentId`] -- Opaque fragment identifier (UUID v4 when generated)
//! - [`OwnerId`] -- Opaque tenant identifier

pub mod error;
pub mod id;
pub mod media;

pub use error::TypeError;
pub use id::{FragmentId, OwnerId};
pub use media::{is_supported_type, ContentType, Extension, MediaType};
