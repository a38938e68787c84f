//! Thumbnail derivation.
//!
//! Pure transform from validated original bytes to a fixed-size derived
//! image: 400×400 canvas, cover-fit crop centered, JPEG at fixed quality.
//! Deterministic for a given codec version.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use lumina_core::AppError;

/// Thumbnail canvas edge length, in pixels.
pub const THUMBNAIL_SIZE: u32 = 400;

/// Thumbnails are always re-encoded as JPEG regardless of the source format.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Thumbnail derivation errors
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    /// The payload could not be decoded despite a valid declared content
    /// type. Aborts the pipeline before any object-store write.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

impl From<ThumbnailError> for AppError {
    fn from(err: ThumbnailError) -> Self {
        AppError::Processing(err.to_string())
    }
}

/// Derive a 400×400 cover-fit thumbnail from original image bytes.
///
/// The source format is sniffed from the payload, the image is scaled to
/// fill the square canvas (cropping the longer dimension, centered), and the
/// result is encoded as JPEG at fixed quality.
pub fn derive_thumbnail(data: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

    let thumb = img.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = thumb.to_rgb8();

    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, THUMBNAIL_JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ThumbnailError::Encode(e.to_string()))?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};

    fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 60, 30, 255]));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap();
        img.dimensions()
    }

    #[test]
    fn test_square_source_yields_400x400() {
        let thumb = derive_thumbnail(&encoded_image(800, 800, ImageFormat::Png)).unwrap();
        assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_landscape_source_is_cover_cropped_to_400x400() {
        let thumb = derive_thumbnail(&encoded_image(1024, 300, ImageFormat::Jpeg)).unwrap();
        assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_portrait_source_is_cover_cropped_to_400x400() {
        let thumb = derive_thumbnail(&encoded_image(217, 631, ImageFormat::Png)).unwrap();
        assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_small_source_is_upscaled_to_400x400() {
        let thumb = derive_thumbnail(&encoded_image(32, 32, ImageFormat::Png)).unwrap();
        assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_thumbnail_is_jpeg() {
        let thumb = derive_thumbnail(&encoded_image(500, 500, ImageFormat::Png)).unwrap();
        let reader = ImageReader::new(Cursor::new(&thumb))
            .with_guessed_format()
            .unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_corrupt_payload_fails_to_decode() {
        let err = derive_thumbnail(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ThumbnailError::Decode(_)));
    }

    #[test]
    fn test_truncated_payload_fails_to_decode() {
        let mut data = encoded_image(100, 100, ImageFormat::Png);
        data.truncate(20);
        assert!(derive_thumbnail(&data).is_err());
    }
}
