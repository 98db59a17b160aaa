// Responsive Image Library
// Filename-driven resize, crop and watermark engine

pub mod cache;
pub mod config;
pub mod error;
pub mod image_optimizer; // Raster decode, crop, resize, encode
pub mod logging;
pub mod pipeline; // Request path to rendered bytes
pub mod sizing;
pub mod watermark;

pub use error::EngineError;
pub use pipeline::{ImageService, RenderedImage};
