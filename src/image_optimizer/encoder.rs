//! Image encoders
//!
//! One encoder per output format, selected through `EncoderFactory`. All of
//! them take tightly packed RGBA8 pixels.

use std::io::Cursor;

use super::error::ImageError;
use super::format::RasterFormat;

/// Default JPEG quality for re-encoded variants
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Trait for image encoders
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> RasterFormat;

    /// Encode RGBA8 pixel data (4 bytes per pixel)
    fn encode(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError>;
}

/// JPEG encoder; alpha is dropped
pub struct JpegEncoder {
    pub quality: u8,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Jpeg
    }

    fn encode(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        let rgb_data = rgba_to_rgb(data);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, self.quality.clamp(1, 100));

        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// PNG encoder
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Png
    }

    fn encode(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// GIF encoder (single frame)
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Gif
    }

    fn encode(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        let mut output = Vec::new();
        {
            let mut encoder = ImageGifEncoder::new(&mut output);
            encoder
                .encode(data, width, height, image::ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        }

        Ok(output)
    }
}

/// WebP encoder.
///
/// The `image` crate only supports lossless WebP encoding.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::WebP
    }

    fn encode(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ImageError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImageWebPEncoder::new_lossless(&mut output)
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("webp", e.to_string()))?;

        Ok(output.into_inner())
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: RasterFormat) -> Box<dyn ImageEncoder> {
        match format {
            RasterFormat::Jpeg => Box::<JpegEncoder>::default(),
            RasterFormat::Png => Box::new(PngEncoder),
            RasterFormat::Gif => Box::new(GifEncoder),
            RasterFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

fn rgba_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for chunk in data.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }
    rgb
}
