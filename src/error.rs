// Error types module

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::image_optimizer::ImageError;
use crate::watermark::WatermarkError;

/// Errors surfaced by the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),

    /// Neither the requested file nor its undecorated source exists
    #[error("Source image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status code a front end should answer with.
    pub fn to_http_status(&self) -> u16 {
        match self {
            EngineError::Image(e) => e.to_http_status(),
            EngineError::NotFound(_) => 404,
            EngineError::Config(_) | EngineError::Watermark(_) | EngineError::Io { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            EngineError::NotFound(PathBuf::from("/a.jpg")).to_http_status(),
            404
        );
        assert_eq!(
            EngineError::from(ImageError::unsupported_format("bmp")).to_http_status(),
            415
        );
        assert_eq!(
            EngineError::from(ImageError::decode_failed("bad")).to_http_status(),
            400
        );
        assert_eq!(
            EngineError::io("/a.jpg", std::io::Error::new(std::io::ErrorKind::Other, "boom")).to_http_status(),
            500
        );
    }

    #[test]
    fn test_display() {
        let err = EngineError::NotFound(PathBuf::from("/srv/photo.jpg"));
        assert_eq!(err.to_string(), "Source image not found: /srv/photo.jpg");

        let err = EngineError::from(WatermarkError::FetchError("timeout".to_string()));
        assert!(err.to_string().starts_with("Watermark error: "));
    }
}
