//! Screenshot preparation for vision requests
//!
//! Vision models cap the size of inline base64 images, so large uploads are
//! downscaled and re-encoded as JPEG before they are embedded in a request.
//! Small images pass through untouched.

use crate::{Error, Result};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Longest edge, in pixels, sent to the vision model.
pub const MAX_EDGE: u32 = 2048;
/// Encoded size above which an image is always re-encoded.
pub const MAX_BYTES: usize = 3 * 1024 * 1024;

fn needs_resize(width: u32, height: u32, encoded_len: usize) -> bool {
    width.max(height) > MAX_EDGE || encoded_len > MAX_BYTES
}

fn prepare_sync(bytes: Vec<u8>) -> Result<Vec<u8>> {
    let img = image::load_from_memory(&bytes)?;
    let (width, height) = img.dimensions();

    if !needs_resize(width, height, bytes.len()) {
        return Ok(bytes);
    }

    let resized = if width.max(height) > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)?;
    tracing::debug!(
        "Screenshot re-encoded from {}x{} ({} bytes) to {}x{} ({} bytes)",
        width,
        height,
        bytes.len(),
        rgb.width(),
        rgb.height(),
        out.len()
    );
    Ok(out)
}

/// Decode, bound and re-encode a screenshot off the async runtime.
pub async fn prepare(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(Error::Validation("Screenshot is empty".to_string()));
    }

    let owned = bytes.to_vec();
    tokio::task::spawn_blocking(move || prepare_sync(owned))
        .await
        .map_err(|e| Error::Generic(format!("Screenshot processing task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([99, 91, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_small_image_passes_through() {
        let original = create_test_image(10, 10);
        let prepared = prepare(&original).await.unwrap();
        assert_eq!(prepared, original);
    }

    #[tokio::test]
    async fn test_large_image_is_downscaled_to_jpeg() {
        let original = create_test_image(4096, 1024);
        let prepared = prepare(&original).await.unwrap();

        assert_eq!(crate::ai::mime::detect_image_mime(&prepared), "image/jpeg");
        let img = image::load_from_memory(&prepared).unwrap();
        assert_eq!(img.width(), MAX_EDGE);
        assert_eq!(img.height(), 512);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_undecodable_input() {
        assert!(matches!(prepare(&[]).await, Err(Error::Validation(_))));
        assert!(matches!(
            prepare(b"definitely not an image").await,
            Err(Error::Image(_))
        ));
    }
}
