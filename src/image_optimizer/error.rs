//! Image engine error types
//!
//! Structured errors with HTTP status mapping. `InvalidSize` is special:
//! callers treat it as "no transformation possible" and serve the original.

use std::fmt;

/// Errors that can occur while decoding, transforming or encoding rasters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Image format is not supported
    UnsupportedFormat { format: String },
    /// Failed to decode image data
    DecodeFailed { message: String },

    // === Geometry Errors ===
    /// A canvas or rectangle is empty, inverted or out of bounds
    InvalidGeometry { message: String },
    /// Requested target dimensions are non-positive
    InvalidSize { width: u32, height: Option<u32> },

    // === Processing Errors ===
    /// Resampling failed inside the resize backend
    ResizeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat { format } => {
                write!(f, "Unsupported image format: {}", format)
            }
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::InvalidGeometry { message } => {
                write!(f, "Invalid geometry: {}", message)
            }
            ImageError::InvalidSize { width, height } => match height {
                Some(h) => write!(f, "Invalid target size {}x{}", width, h),
                None => write!(f, "Invalid target size {}x(auto)", width),
            },
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Maps image errors to HTTP status codes
    ///
    /// - UnsupportedFormat → 415
    /// - DecodeFailed, InvalidGeometry, InvalidSize → 400
    /// - ResizeFailed, EncodeFailed → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            ImageError::UnsupportedFormat { .. } => 415,

            ImageError::DecodeFailed { .. }
            | ImageError::InvalidGeometry { .. }
            | ImageError::InvalidSize { .. } => 400,

            ImageError::ResizeFailed { .. } | ImageError::EncodeFailed { .. } => 500,
        }
    }

    /// True when the caller should fall back to serving the untouched source
    pub fn is_invalid_size(&self) -> bool {
        matches!(self, ImageError::InvalidSize { .. })
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        ImageError::InvalidGeometry {
            message: message.into(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}
