use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use fragments_types::{Extension, MediaType};

use crate::error::{ConvertError, ConvertResult};

/// The codec format for an image media type.
pub fn format_for_media(media: MediaType) -> Option<ImageFormat> {
    match media {
        MediaType::ImagePng => Some(ImageFormat::Png),
        MediaType::ImageJpeg => Some(ImageFormat::Jpeg),
        MediaType::ImageWebp => Some(ImageFormat::WebP),
        MediaType::ImageGif => Some(ImageFormat::Gif),
        MediaType::TextPlain
        | MediaType::TextMarkdown
        | MediaType::TextHtml
        | MediaType::ApplicationJson => None,
    }
}

/// Decode `data` as `from` and re-encode it in the format of `to`.
///
/// JPEG output drops the alpha channel; the other encoders receive 8-bit
/// RGBA so every decoded color type has a supported encoding.
pub fn transcode(data: &[u8], from: MediaType, to: Extension) -> ConvertResult<Vec<u8>> {
    let source = format_for_media(from).ok_or(ConvertError::Unsupported { from, to })?;
    let target = format_for_media(to.media_type()).ok_or(ConvertError::Unsupported { from, to })?;

    let decoded = image::load_from_memory_with_format(data, source).map_err(|e| {
        ConvertError::Decode {
            from,
            reason: e.to_string(),
        }
    })?;

    let prepared = match target {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut out = Cursor::new(Vec::new());
    prepared
        .write_to(&mut out, target)
        .map_err(|e| ConvertError::Encode {
            to,
            reason: e.to_string(),
        })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const IMAGE_TYPES: [(MediaType, Extension, ImageFormat); 4] = [
        (MediaType::ImagePng, Extension::Png, ImageFormat::Png),
        (MediaType::ImageJpeg, Extension::Jpg, ImageFormat::Jpeg),
        (MediaType::ImageWebp, Extension::Webp, ImageFormat::WebP),
        (MediaType::ImageGif, Extension::Gif, ImageFormat::Gif),
    ];

    fn sample(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 6, |x, y| {
            Rgba([(x * 30) as u8, (y * 40) as u8, 128, 255])
        }));
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
            _ => img,
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn sample_png() -> Vec<u8> {
        sample(ImageFormat::Png)
    }

    #[test]
    fn png_to_every_image_format() {
        let png = sample_png();
        for (ext, expected) in [
            (Extension::Png, ImageFormat::Png),
            (Extension::Jpg, ImageFormat::Jpeg),
            (Extension::Webp, ImageFormat::WebP),
            (Extension::Gif, ImageFormat::Gif),
        ] {
            let out = transcode(&png, MediaType::ImagePng, ext).unwrap();
            assert!(!out.is_empty());
            assert_eq!(image::guess_format(&out).unwrap(), expected, "target {ext}");
        }
    }

    #[test]
    fn every_image_type_to_every_image_type() {
        for (from, _, source_format) in IMAGE_TYPES {
            let input = sample(source_format);
            assert_eq!(image::guess_format(&input).unwrap(), source_format);
            for (_, to, expected) in IMAGE_TYPES {
                let out = transcode(&input, from, to).unwrap();
                assert!(!out.is_empty(), "{from} -> {to}");
                assert_eq!(image::guess_format(&out).unwrap(), expected, "{from} -> {to}");
                let decoded = image::load_from_memory_with_format(&out, expected).unwrap();
                assert_eq!((decoded.width(), decoded.height()), (8, 6), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn dimensions_survive_transcoding() {
        let jpg = transcode(&sample_png(), MediaType::ImagePng, Extension::Jpg).unwrap();
        let gif = transcode(&jpg, MediaType::ImageJpeg, Extension::Gif).unwrap();
        let decoded = image::load_from_memory(&gif).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = transcode(b"not an image", MediaType::ImagePng, Extension::Gif).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { from: MediaType::ImagePng, .. }));
    }

    #[test]
    fn text_types_have_no_codec() {
        assert!(format_for_media(MediaType::TextPlain).is_none());
        let err = transcode(b"hi", MediaType::TextPlain, Extension::Png).unwrap_err();
        assert!(err.is_unsupported());
    }
}
