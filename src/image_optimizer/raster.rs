//! Owned decoded rasters
//!
//! A `RasterImage` is an RGBA8 pixel buffer plus the format it must be
//! re-encoded as.

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::io::Cursor;
use std::path::Path;

use super::encoder::EncoderFactory;
use super::error::ImageError;
use super::format::RasterFormat;

/// Decoded image and its output format
#[derive(Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
    format: RasterFormat,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("dimensions", &(self.width(), self.height()))
            .field("format", &self.format)
            .finish()
    }
}

impl RasterImage {
    pub fn new(pixels: RgbaImage, format: RasterFormat) -> Self {
        Self { pixels, format }
    }

    /// Decode bytes, sniffing the format from magic bytes.
    pub fn decode(data: &[u8]) -> Result<Self, ImageError> {
        let format = RasterFormat::detect(data)?;
        Self::decode_as(data, format)
    }

    /// Decode bytes as a known format.
    pub fn decode_as(data: &[u8], format: RasterFormat) -> Result<Self, ImageError> {
        let mut reader = ImageReader::new(Cursor::new(data));
        reader.set_format(format.to_image_format());
        let image = reader
            .decode()
            .map_err(|e| ImageError::decode_failed(e.to_string()))?;
        Ok(Self::new(image.to_rgba8(), format))
    }

    /// Read only the header to get the dimensions of encoded bytes.
    pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), ImageError> {
        let format = RasterFormat::detect(data)?;
        let mut reader = ImageReader::new(Cursor::new(data));
        reader.set_format(format.to_image_format());
        reader
            .into_dimensions()
            .map_err(|e| ImageError::decode_failed(e.to_string()))
    }

    /// Read and decode a file. Magic bytes win; the extension is the fallback.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let data = std::fs::read(path).map_err(|e| {
            ImageError::decode_failed(format!("cannot read {}: {}", path.display(), e))
        })?;

        let format = match RasterFormat::detect(&data) {
            Ok(format) => format,
            Err(detect_err) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(RasterFormat::from_extension)
                .transpose()
                .ok()
                .flatten()
                .ok_or(detect_err)?,
        };

        Self::decode_as(&data, format)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Same pixels, different output format.
    pub fn with_format(self, format: RasterFormat) -> Self {
        Self { format, ..self }
    }

    /// Encode in the raster's own format.
    pub fn encode(&self) -> Result<Vec<u8>, ImageError> {
        EncoderFactory::create(self.format).encode(
            self.pixels.as_raw(),
            self.pixels.width(),
            self.pixels.height(),
        )
    }
}
