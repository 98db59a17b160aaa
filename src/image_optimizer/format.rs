//! Encoding formats handled by the engine
//!
//! The engine always re-encodes in the source asset's own format, so the
//! format travels with every raster.

use image::ImageFormat;

use super::error::ImageError;

/// Raster encoding format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl RasterFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    pub fn supports_transparency(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    /// Map a file extension (with or without the leading dot) to a format.
    pub fn from_extension(ext: &str) -> Result<Self, ImageError> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "jpe" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::WebP),
            _ => Err(ImageError::unsupported_format(ext)),
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Result<Self, ImageError> {
        match format {
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Gif => Ok(Self::Gif),
            ImageFormat::WebP => Ok(Self::WebP),
            other => Err(ImageError::unsupported_format(format!("{:?}", other))),
        }
    }

    /// Sniff the format from magic bytes.
    pub fn detect(data: &[u8]) -> Result<Self, ImageError> {
        let format = image::guess_format(data)
            .map_err(|e| ImageError::decode_failed(format!("unrecognized image data: {}", e)))?;
        Self::from_image_format(format)
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(RasterFormat::from_extension("jpg").unwrap(), RasterFormat::Jpeg);
        assert_eq!(RasterFormat::from_extension(".JPEG").unwrap(), RasterFormat::Jpeg);
        assert_eq!(RasterFormat::from_extension("Png").unwrap(), RasterFormat::Png);
        assert_eq!(RasterFormat::from_extension("gif").unwrap(), RasterFormat::Gif);
        assert!(RasterFormat::from_extension("tiff").is_err());
    }

    #[test]
    fn test_detect_png_magic() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(RasterFormat::detect(&png_header).unwrap(), RasterFormat::Png);
    }

    #[test]
    fn test_detect_garbage() {
        let err = RasterFormat::detect(&[0, 1, 2, 3]).unwrap_err();
        assert_eq!(err.to_http_status(), 400);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(RasterFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(RasterFormat::WebP.content_type(), "image/webp");
        assert!(!RasterFormat::Jpeg.supports_transparency());
        assert!(RasterFormat::Png.supports_transparency());
    }
}
