//! Image transformation engine
//!
//! Provides the raster layer every variant goes through:
//! - Decode and re-encode in the source's own format (JPEG, PNG, GIF, WebP)
//! - Canvas compositing with bicubic resampling and chroma-key remapping
//! - Rectangular crop and aspect-aware resize (crop-then-scale)
//!
//! # Resize geometry
//!
//! ```text
//! 1200x800 -> 400x400
//!   fit 600x400, crop 300px left/right and 200px top/bottom, scale to 400x400
//! 1200x800 -> 300 (width only)
//!   scale to 300x200, no crop
//! ```

pub mod compositor;
pub mod encoder;
pub mod error;
pub mod format;
pub mod params;
pub mod processor;
pub mod raster;

pub use compositor::{composite, Canvas, CanvasFill, ColorRemap, CHROMA_KEY, DEFAULT_ALPHA_SCALE};
pub use encoder::{EncoderFactory, ImageEncoder};
pub use error::ImageError;
pub use format::RasterFormat;
pub use params::{Margin, OutputLimits, Rect, TargetSize};
pub use processor::{crop, plan_resize, resize, resize_with_fill, resize_within, ResizePlan};
pub use raster::RasterImage;
