//! Fragment lifecycle for the fragments object store.
//!
//! - [`Fragment`] -- the entity: validated metadata plus payload access
//! - [`list_fragments`] / [`Listing`] -- per-owner directory
//! - [`FragmentService`] -- single-call create, read, update, and delete
//!
//! All operations take the [`Backend`](fragments_store::Backend) explicitly
//! and report failures as [`FragmentError`].

pub mod directory;
pub mod error;
pub mod fragment;
pub mod service;

pub use directory::{list_fragments, Listing};
pub use error::{FragmentError, FragmentResult, InternalError};
pub use fragment::{Fragment, FragmentBuilder};
pub use service::{FragmentData, FragmentService};

pub use fragments_convert::Converted;
