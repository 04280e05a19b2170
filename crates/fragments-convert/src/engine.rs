use bytes::Bytes;

use fragments_types::{Extension, MediaType};

use crate::error::{ConvertError, ConvertResult};
use crate::{image_codec, markdown};

/// How a payload will be turned into the requested representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// Return the stored bytes unchanged.
    PassThrough,
    /// Render markdown to HTML.
    RenderMarkdown,
    /// Decode the image and re-encode it as `Extension`.
    Transcode(Extension),
}

/// A converted payload and the media type it should be served as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Converted {
    pub data: Bytes,
    pub media_type: MediaType,
}

/// Returns `true` if `from` lists `to` in its conversion set.
pub fn is_convertible(from: MediaType, to: Extension) -> bool {
    from.can_convert_to(to)
}

/// Decide how to convert `from` into `to` without touching any payload.
pub fn plan(from: MediaType, to: Extension) -> ConvertResult<Conversion> {
    if !is_convertible(from, to) {
        return Err(ConvertError::Unsupported { from, to });
    }
    let target = to.media_type();
    if target == from {
        return Ok(Conversion::PassThrough);
    }
    if (from.is_text() || from == MediaType::ApplicationJson) && to == Extension::Txt {
        return Ok(Conversion::PassThrough);
    }
    if from == MediaType::TextMarkdown && to == Extension::Html {
        return Ok(Conversion::RenderMarkdown);
    }
    if from.is_image() && target.is_image() {
        return Ok(Conversion::Transcode(to));
    }
    Ok(Conversion::PassThrough)
}

/// Convert `data` (of type `from`) into the representation named by `to`.
///
/// Image codec work runs on the blocking thread pool.
pub async fn convert(from: MediaType, to: Extension, data: Bytes) -> ConvertResult<Converted> {
    let media_type = to.media_type();
    let data = match plan(from, to)? {
        Conversion::PassThrough => data,
        Conversion::RenderMarkdown => Bytes::from(markdown::render_html(&data)),
        Conversion::Transcode(target) => {
            let result =
                tokio::task::spawn_blocking(move || image_codec::transcode(&data, from, target))
                    .await
                    .map_err(|e| ConvertError::Task(e.to_string()))
                    .and_then(|r| r);
            match result {
                Ok(out) => Bytes::from(out),
                Err(e) => {
                    tracing::error!(
                        source_type = %from,
                        target = %to,
                        error = %e,
                        "image conversion failed"
                    );
                    return Err(e);
                }
            }
        }
    };
    tracing::debug!(source_type = %from, target = %to, size = data.len(), "converted payload");
    Ok(Converted { data, media_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Bytes {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 200, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    #[test]
    fn same_type_is_pass_through() {
        for m in MediaType::ALL {
            assert_eq!(plan(m, m.extension()).unwrap(), Conversion::PassThrough, "{m}");
        }
    }

    #[test]
    fn text_and_json_to_txt_are_pass_through() {
        for m in [
            MediaType::TextMarkdown,
            MediaType::TextHtml,
            MediaType::ApplicationJson,
        ] {
            assert_eq!(plan(m, Extension::Txt).unwrap(), Conversion::PassThrough);
        }
    }

    #[test]
    fn markdown_to_html_renders() {
        assert_eq!(
            plan(MediaType::TextMarkdown, Extension::Html).unwrap(),
            Conversion::RenderMarkdown
        );
    }

    #[test]
    fn image_change_transcodes() {
        assert_eq!(
            plan(MediaType::ImagePng, Extension::Webp).unwrap(),
            Conversion::Transcode(Extension::Webp)
        );
    }

    #[test]
    fn unlisted_pairs_are_unsupported() {
        for (from, to) in [
            (MediaType::TextPlain, Extension::Md),
            (MediaType::TextPlain, Extension::Json),
            (MediaType::TextHtml, Extension::Md),
            (MediaType::ApplicationJson, Extension::Html),
            (MediaType::ImageGif, Extension::Txt),
            (MediaType::TextMarkdown, Extension::Png),
        ] {
            let err = plan(from, to).unwrap_err();
            assert!(err.is_unsupported(), "{from} -> {to}");
            assert!(!is_convertible(from, to));
        }
    }

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn markdown_scenario() {
        let data = Bytes::from_static(b"# Title");
        let html = convert(MediaType::TextMarkdown, Extension::Html, data.clone())
            .await
            .unwrap();
        assert_eq!(&html.data[..], b"<h1>Title</h1>\n");
        assert_eq!(html.media_type, MediaType::TextHtml);

        let txt = convert(MediaType::TextMarkdown, Extension::Txt, data.clone())
            .await
            .unwrap();
        assert_eq!(txt.data, data);
        assert_eq!(txt.media_type, MediaType::TextPlain);
    }

    #[tokio::test]
    async fn json_is_not_reformatted() {
        let data = Bytes::from_static(b"{ \"a\" :   1 }");
        let out = convert(MediaType::ApplicationJson, Extension::Txt, data.clone())
            .await
            .unwrap();
        assert_eq!(out.data, data);
    }

    fn encoded(format: image::ImageFormat) -> Bytes {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            5,
            4,
            image::Rgba([10, 200, 30, 255]),
        ));
        let img = match format {
            image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn images_convert_to_all_formats() {
        let formats = [
            (MediaType::ImagePng, Extension::Png, image::ImageFormat::Png),
            (MediaType::ImageJpeg, Extension::Jpg, image::ImageFormat::Jpeg),
            (MediaType::ImageWebp, Extension::Webp, image::ImageFormat::WebP),
            (MediaType::ImageGif, Extension::Gif, image::ImageFormat::Gif),
        ];
        for (from, _, source_format) in formats {
            let input = encoded(source_format);
            for (_, ext, expected) in formats {
                let out = convert(from, ext, input.clone()).await.unwrap();
                assert!(!out.data.is_empty(), "{from} -> {ext}");
                assert_eq!(out.media_type, ext.media_type());
                assert_eq!(
                    image::guess_format(&out.data).unwrap(),
                    expected,
                    "{from} -> {ext}"
                );
            }
        }
    }

    #[tokio::test]
    async fn same_image_format_keeps_bytes() {
        let png = png_bytes();
        let out = convert(MediaType::ImagePng, Extension::Png, png.clone()).await.unwrap();
        assert_eq!(out.data, png);
    }

    #[tokio::test]
    async fn unsupported_conversion_fails_cleanly() {
        let err = convert(MediaType::TextPlain, Extension::Html, Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Unsupported {
                from: MediaType::TextPlain,
                to: Extension::Html
            }
        ));
    }

    #[tokio::test]
    async fn corrupt_image_is_a_decode_error() {
        let err = convert(MediaType::ImageJpeg, Extension::Png, Bytes::from_static(b"nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
    }
}
