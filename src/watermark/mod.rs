//! Watermarks: descriptor parsing, text rendering, placement and compositing.
//!
//! Each configured watermark key maps to a raw descriptor string. Descriptors
//! are classified and resolved once into a [`WatermarkCatalog`] of rasters:
//!
//! ```yaml
//! watermarks:
//!   default: "font:name=Arial;size=40;color=#F00;text=Hi"
//!   logo: "https://cdn.example.com/logo.png"
//!   local: "/srv/assets/logo.png"
//! watermark:
//!   key: default
//!   position: right-bottom
//!   margin: { left: 10, top: 10, right: 10, bottom: 10 }
//! ```
//!
//! A source that cannot be fetched or decoded is rendered as its own
//! descriptor text. Drawing treats pure green (`#00FF00`) as transparent and
//! halves the alpha of everything else.

pub mod catalog;
pub mod compositor;
pub mod descriptor;
pub mod error;
pub mod image_fetcher;
pub mod position;
pub mod text_renderer;

pub use catalog::{resolve_source, WatermarkCatalog};
pub use compositor::{apply, apply_descriptor, rasterize, watermark_target_size};
pub use descriptor::{TextSpec, WatermarkDescriptor, WatermarkSource};
pub use error::WatermarkError;
pub use image_fetcher::{ImageFetcher, ImageFetcherConfig};
pub use position::{resolve_position, Anchor, Point};
pub use text_renderer::{measure_text, parse_hex_color, render_text, Color, FontLibrary};
