//! Watermark error types.
//!
//! None of these reach the request path: descriptor resolution logs them and
//! falls back to rendering the descriptor text.

use std::fmt;

use crate::image_optimizer::ImageError;

/// Errors that can occur while resolving or rendering a watermark.
#[derive(Debug)]
pub enum WatermarkError {
    /// Failed to fetch watermark bytes from a URL or file
    FetchError(String),

    /// Failed to decode watermark image bytes
    DecodeError(String),

    /// Failed to render text watermark
    RenderError(String),

    /// Invalid configuration (fonts, HTTP client)
    ConfigError(String),

    /// Failed to scale or composite the watermark
    CompositeError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchError(msg) => write!(f, "Failed to fetch watermark: {}", msg),
            Self::DecodeError(msg) => write!(f, "Failed to decode watermark image: {}", msg),
            Self::RenderError(msg) => write!(f, "Failed to render text watermark: {}", msg),
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
            Self::CompositeError(msg) => write!(f, "Failed to composite watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

impl From<ImageError> for WatermarkError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::DecodeFailed { message } => Self::DecodeError(message),
            ImageError::UnsupportedFormat { format } => {
                Self::DecodeError(format!("unsupported format {}", format))
            }
            other => Self::CompositeError(other.to_string()),
        }
    }
}
