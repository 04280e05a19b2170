use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A supported base MIME type.
///
/// This is the type registry: a fragment can only be created with a
/// `Content-Type` whose `type/subtype` essence maps to one of these
/// variants. The set of extensions each type converts to is fixed by
/// [`MediaType::conversions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "text/markdown")]
    TextMarkdown,
    #[serde(rename = "text/html")]
    TextHtml,
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/webp")]
    ImageWebp,
    #[serde(rename = "image/gif")]
    ImageGif,
}

const IMAGE_TARGETS: &[Extension] = &[
    Extension::Png,
    Extension::Jpg,
    Extension::Webp,
    Extension::Gif,
];

impl MediaType {
    /// Every supported media type, in registry order.
    pub const ALL: [MediaType; 8] = [
        MediaType::TextPlain,
        MediaType::TextMarkdown,
        MediaType::TextHtml,
        MediaType::ApplicationJson,
        MediaType::ImagePng,
        MediaType::ImageJpeg,
        MediaType::ImageWebp,
        MediaType::ImageGif,
    ];

    /// The `type/subtype` essence, e.g. `"text/plain"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextMarkdown => "text/markdown",
            Self::TextHtml => "text/html",
            Self::ApplicationJson => "application/json",
            Self::ImagePng => "image/png",
            Self::ImageJpeg => "image/jpeg",
            Self::ImageWebp => "image/webp",
            Self::ImageGif => "image/gif",
        }
    }

    /// Look up a media type by its essence. Matching is case-insensitive.
    pub fn from_essence(essence: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(essence.trim()))
    }

    /// The top-level type (`text`, `application`, `image`).
    pub fn major(&self) -> &'static str {
        let s = self.as_str();
        match s.split_once('/') {
            Some((major, _)) => major,
            None => s,
        }
    }

    /// Returns `true` for `text/*` types.
    pub fn is_text(&self) -> bool {
        self.major() == "text"
    }

    /// Returns `true` for `image/*` types.
    pub fn is_image(&self) -> bool {
        self.major() == "image"
    }

    /// The extensions a fragment of this type can be converted to,
    /// including its own.
    pub fn conversions(&self) -> &'static [Extension] {
        match self {
            Self::TextPlain => &[Extension::Txt],
            Self::TextMarkdown => &[Extension::Md, Extension::Html, Extension::Txt],
            Self::TextHtml => &[Extension::Html, Extension::Txt],
            Self::ApplicationJson => &[Extension::Json, Extension::Txt],
            Self::ImagePng | Self::ImageJpeg | Self::ImageWebp | Self::ImageGif => IMAGE_TARGETS,
        }
    }

    /// Returns `true` if this type lists `ext` in its conversion set.
    pub fn can_convert_to(&self, ext: Extension) -> bool {
        self.conversions().contains(&ext)
    }

    /// The extension whose canonical media type is this type.
    pub fn extension(&self) -> Extension {
        match self {
            Self::TextPlain => Extension::Txt,
            Self::TextMarkdown => Extension::Md,
            Self::TextHtml => Extension::Html,
            Self::ApplicationJson => Extension::Json,
            Self::ImagePng => Extension::Png,
            Self::ImageJpeg => Extension::Jpg,
            Self::ImageWebp => Extension::Webp,
            Self::ImageGif => Extension::Gif,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_essence(s).ok_or_else(|| TypeError::UnsupportedMediaType(s.to_string()))
    }
}

/// A conversion target, addressed by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    Txt,
    Md,
    Html,
    Json,
    Png,
    Jpg,
    Webp,
    Gif,
}

impl Extension {
    /// Every known extension.
    pub const ALL: [Extension; 8] = [
        Extension::Txt,
        Extension::Md,
        Extension::Html,
        Extension::Json,
        Extension::Png,
        Extension::Jpg,
        Extension::Webp,
        Extension::Gif,
    ];

    /// Parse an extension such as `".txt"`, `"txt"` or `".JPEG"`.
    ///
    /// Returns `None` for empty or unknown input.
    pub fn parse(value: &str) -> Option<Self> {
        let bare = value.strip_prefix('.').unwrap_or(value);
        match bare.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Md),
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// The dotted form, e.g. `".txt"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => ".txt",
            Self::Md => ".md",
            Self::Html => ".html",
            Self::Json => ".json",
            Self::Png => ".png",
            Self::Jpg => ".jpg",
            Self::Webp => ".webp",
            Self::Gif => ".gif",
        }
    }

    /// The canonical media type for data in this format.
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Txt => MediaType::TextPlain,
            Self::Md => MediaType::TextMarkdown,
            Self::Html => MediaType::TextHtml,
            Self::Json => MediaType::ApplicationJson,
            Self::Png => MediaType::ImagePng,
            Self::Jpg => MediaType::ImageJpeg,
            Self::Webp => MediaType::ImageWebp,
            Self::Gif => MediaType::ImageGif,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Extension {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::UnknownExtension(s.to_string()))
    }
}

/// A validated `Content-Type` value.
///
/// Keeps the value exactly as supplied (parameters such as `charset`
/// included) alongside the registry entry its essence resolved to.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentType {
    raw: String,
    media: MediaType,
}

impl ContentType {
    /// Parse a `Content-Type` header value.
    ///
    /// Fails with [`TypeError::MalformedContentType`] if the value is not a
    /// syntactically valid media type, and with
    /// [`TypeError::UnsupportedMediaType`] if its essence is not registered.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let parsed: mime::Mime =
            value
                .trim()
                .parse()
                .map_err(|e: mime::FromStrError| TypeError::MalformedContentType {
                    value: value.to_string(),
                    reason: e.to_string(),
                })?;
        let essence = parsed.essence_str().to_ascii_lowercase();
        let media = MediaType::from_essence(&essence)
            .ok_or(TypeError::UnsupportedMediaType(essence))?;
        Ok(Self {
            raw: value.trim().to_string(),
            media,
        })
    }

    /// The registry entry for this content type.
    pub fn media_type(&self) -> MediaType {
        self.media
    }

    /// The base MIME type with parameters stripped.
    pub fn essence(&self) -> &'static str {
        self.media.as_str()
    }

    /// The value as originally supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<MediaType> for ContentType {
    fn from(media: MediaType) -> Self {
        Self {
            raw: media.as_str().to_string(),
            media,
        }
    }
}

impl TryFrom<String> for ContentType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        ct.raw
    }
}

impl FromStr for ContentType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentType({})", self.raw)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns `true` if `value` is a `Content-Type` whose base MIME type is
/// registered. Malformed input yields `false`.
pub fn is_supported_type(value: &str) -> bool {
    ContentType::parse(value).is_ok()
}
