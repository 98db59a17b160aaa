//! Low-level raster compositing.
//!
//! Everything the engine draws goes through a [`Canvas`]: allocate a filled
//! canvas, draw a source region into a destination region (resampling with a
//! bicubic filter when the sizes differ), optionally remap colors, then turn
//! the canvas back into a [`RasterImage`].
//!
//! # Example
//!
//! ```ignore
//! use responsive_image::image_optimizer::compositor::{composite, CanvasFill};
//! use responsive_image::image_optimizer::{Rect, RasterImage};
//!
//! // Scale the whole source into a 200x100 canvas
//! let (w, h) = source.dimensions();
//! let scaled = composite(&source, (200, 100), Rect::sized(200, 100), Rect::sized(w, h), None, CanvasFill::White)?;
//! ```

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::{imageops, Rgba, RgbaImage};
use std::borrow::Cow;
use std::num::NonZeroU32;

use super::error::ImageError;
use super::format::RasterFormat;
use super::params::Rect;
use super::raster::RasterImage;

/// Pure green, the watermark chroma key.
pub const CHROMA_KEY: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Alpha multiplier applied to remapped drawing.
pub const DEFAULT_ALPHA_SCALE: f32 = 0.5;

/// Color remap applied while drawing.
///
/// Pixels exactly equal to `key` become fully transparent; every other pixel
/// has its alpha multiplied by `alpha_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRemap {
    pub key: Rgba<u8>,
    pub alpha_scale: f32,
}

impl Default for ColorRemap {
    fn default() -> Self {
        Self {
            key: CHROMA_KEY,
            alpha_scale: DEFAULT_ALPHA_SCALE,
        }
    }
}

impl ColorRemap {
    /// Returns the pixel to draw and the extra opacity to draw it with.
    fn apply(&self, pixel: Rgba<u8>) -> (Rgba<u8>, f32) {
        if pixel == self.key {
            (Rgba([0, 0, 0, 0]), 0.0)
        } else {
            (pixel, self.alpha_scale.clamp(0.0, 1.0))
        }
    }
}

/// Initial canvas contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasFill {
    /// Opaque white
    #[default]
    White,
    /// Fully transparent
    Transparent,
}

impl CanvasFill {
    fn pixel(self) -> Rgba<u8> {
        match self {
            CanvasFill::White => Rgba([255, 255, 255, 255]),
            CanvasFill::Transparent => Rgba([0, 0, 0, 0]),
        }
    }
}

/// Drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Allocate a `width` x `height` canvas filled with `fill`.
    pub fn new(width: u32, height: u32, fill: CanvasFill) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::invalid_geometry(format!(
                "canvas is {}x{}",
                width, height
            )));
        }
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, fill.pixel()),
        })
    }

    /// Start from a copy of an existing image.
    pub fn from_image(base: &RgbaImage) -> Self {
        Self {
            pixels: base.clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Draw the `src` region of `source` into the `dest` region of the canvas.
    ///
    /// The source region must lie inside `source`. The destination may hang
    /// over the canvas edges; anything outside is clipped.
    pub fn draw(
        &mut self,
        source: &RgbaImage,
        dest: Rect,
        src: Rect,
        remap: Option<&ColorRemap>,
    ) -> Result<(), ImageError> {
        dest.ensure_non_empty("destination")?;
        src.ensure_non_empty("source")?;
        if !src.fits_within(source.width(), source.height()) {
            return Err(ImageError::invalid_geometry(format!(
                "source rectangle {}x{}+{}+{} exceeds image {}x{}",
                src.width,
                src.height,
                src.x,
                src.y,
                source.width(),
                source.height()
            )));
        }

        let region: Cow<'_, RgbaImage> = if src == Rect::sized(source.width(), source.height()) {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(
                imageops::crop_imm(source, src.x as u32, src.y as u32, src.width, src.height)
                    .to_image(),
            )
        };

        let scaled: Cow<'_, RgbaImage> = if src.size() == dest.size() {
            region
        } else {
            Cow::Owned(scale_rgba(&region, dest.width, dest.height)?)
        };

        self.blend_at(&scaled, dest.x, dest.y, remap);
        Ok(())
    }

    fn blend_at(&mut self, layer: &RgbaImage, x: i32, y: i32, remap: Option<&ColorRemap>) {
        let target_width = self.pixels.width() as i64;
        let target_height = self.pixels.height() as i64;

        // Clamp the visible region to the canvas
        let x_start = (x as i64).max(0);
        let y_start = (y as i64).max(0);
        let x_end = (x as i64 + layer.width() as i64).min(target_width);
        let y_end = (y as i64 + layer.height() as i64).min(target_height);

        for ty in y_start..y_end {
            for tx in x_start..x_end {
                let lx = (tx - x as i64) as u32;
                let ly = (ty - y as i64) as u32;

                let (pixel, opacity) = match remap {
                    Some(remap) => remap.apply(*layer.get_pixel(lx, ly)),
                    None => (*layer.get_pixel(lx, ly), 1.0),
                };
                if opacity <= 0.0 || pixel[3] == 0 {
                    continue;
                }

                let target = self.pixels.get_pixel_mut(tx as u32, ty as u32);
                *target = blend_pixels(*target, pixel, opacity);
            }
        }
    }

    pub fn into_raster(self, format: RasterFormat) -> RasterImage {
        RasterImage::new(self.pixels, format)
    }
}

/// Allocate a `canvas_size` canvas, draw `src_rect` of `source` into
/// `dest_rect`, and return the result in the source's format.
pub fn composite(
    source: &RasterImage,
    canvas_size: (u32, u32),
    dest_rect: Rect,
    src_rect: Rect,
    remap: Option<&ColorRemap>,
    fill: CanvasFill,
) -> Result<RasterImage, ImageError> {
    let mut canvas = Canvas::new(canvas_size.0, canvas_size.1, fill)?;
    canvas.draw(source.pixels(), dest_rect, src_rect, remap)?;
    Ok(canvas.into_raster(source.format()))
}

/// Resample an RGBA image to `target_w` x `target_h` with a Catmull-Rom filter.
///
/// Alpha is premultiplied around the resize so transparent pixels do not
/// bleed their color into the edges.
pub(crate) fn scale_rgba(
    image: &RgbaImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage, ImageError> {
    let src_width = NonZeroU32::new(image.width())
        .ok_or_else(|| ImageError::invalid_geometry("source width is 0"))?;
    let src_height = NonZeroU32::new(image.height())
        .ok_or_else(|| ImageError::invalid_geometry("source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::invalid_geometry("target width is 0"))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| ImageError::invalid_geometry("target height is 0"))?;

    let mut src_image = Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        PixelType::U8x4,
    )
    .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Alpha premultiply failed: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::CatmullRom));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Alpha unpremultiply failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}

/// Porter-Duff "over" with an extra opacity on the foreground.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |fg: u8, bg: u8| -> u8 {
        let fg = fg as f32 / 255.0;
        let bg = bg as f32 / 255.0;
        let value = (fg * fg_alpha + bg * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(foreground[0], background[0]),
        blend(foreground[1], background[1]),
        blend(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
