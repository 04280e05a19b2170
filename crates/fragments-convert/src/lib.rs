//! Conversion engine for fragments.
//!
//! Given a fragment's media type and a requested [`Extension`], decides
//! whether the conversion is allowed (see
//! [`MediaType::conversions`](fragments_types::MediaType::conversions)) and
//! produces the converted payload. The stored original is never modified.
//!
//! Dispatch, in order:
//!
//! 1. Target not listed for the source type: [`ConvertError::Unsupported`].
//! 2. Target's media type equals the source: bytes returned unchanged.
//! 3. Text or JSON to `.txt`: bytes returned unchanged.
//! 4. Markdown to `.html`: rendered with a CommonMark renderer.
//! 5. Image to another image format: decoded and re-encoded.
//! 6. Anything else: bytes returned unchanged.

pub mod engine;
pub mod error;
pub mod image_codec;
pub mod markdown;

pub use engine::{convert, is_convertible, plan, Conversion, Converted};
pub use error::{ConvertError, ConvertResult};
