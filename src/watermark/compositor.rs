//! Watermark compositing.
//!
//! The watermark is scaled to two thirds of the base width (keeping its own
//! aspect ratio), placed at an anchor, and drawn with the chroma-key remap:
//! pure green disappears and everything else is drawn at half alpha.

use super::descriptor::WatermarkDescriptor;
use super::position::{resolve_position, Anchor};
use super::text_renderer::{render_text, FontLibrary};
use super::WatermarkError;
use crate::image_optimizer::{
    resize_with_fill, Canvas, CanvasFill, ColorRemap, ImageError, Margin, RasterFormat,
    RasterImage, Rect, TargetSize,
};
use image::RgbaImage;

/// Size of the scaled watermark for a base of `base_width`.
///
/// Width is `base_width / 3 * 2` in integer arithmetic; height keeps the
/// watermark's aspect ratio and is truncated. `None` when either would be 0.
pub fn watermark_target_size(base_width: u32, watermark: (u32, u32)) -> Option<TargetSize> {
    let (wm_w, wm_h) = watermark;
    if wm_w == 0 || wm_h == 0 {
        return None;
    }

    let width = base_width / 3 * 2;
    let height = (base_width as f64 / 3.0 * 2.0 / wm_w as f64 * wm_h as f64) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some(TargetSize::new(width, height))
}

/// Turn a descriptor into pixels.
///
/// Image bytes that fail to decode fall back to rendering their origin
/// string as text.
pub fn rasterize(
    descriptor: &WatermarkDescriptor,
    fonts: &FontLibrary,
) -> Result<RgbaImage, WatermarkError> {
    match descriptor {
        WatermarkDescriptor::Image { bytes, origin } => match RasterImage::decode(bytes) {
            Ok(raster) => Ok(raster.into_pixels()),
            Err(e) => {
                tracing::warn!(
                    source = %origin,
                    error = %e,
                    "Watermark image did not decode, rendering descriptor as text"
                );
                rasterize(&WatermarkDescriptor::literal(origin.clone()), fonts)
            }
        },
        WatermarkDescriptor::Text(spec) => render_text(spec, fonts),
    }
}

/// Composite an already rasterized watermark onto `base`.
///
/// Returns a new raster in the base's format; `base` is left untouched.
pub fn apply(
    base: &RasterImage,
    watermark: &RgbaImage,
    anchor: Anchor,
    margin: &Margin,
) -> Result<RasterImage, ImageError> {
    let Some(target) = watermark_target_size(base.width(), watermark.dimensions()) else {
        tracing::debug!(
            base_width = base.width(),
            "Base image too small for a watermark, leaving it unchanged"
        );
        return Ok(base.clone());
    };

    let scaled = resize_with_fill(
        &RasterImage::new(watermark.clone(), RasterFormat::Png),
        target,
        CanvasFill::Transparent,
    )?;

    let position = resolve_position(anchor, scaled.dimensions(), base.dimensions(), margin);
    tracing::debug!(
        anchor = anchor.as_str(),
        x = position.x,
        y = position.y,
        width = scaled.width(),
        height = scaled.height(),
        "Placing watermark"
    );

    let mut canvas = Canvas::from_image(base.pixels());
    canvas.draw(
        scaled.pixels(),
        Rect::new(position.x, position.y, scaled.width(), scaled.height()),
        Rect::sized(scaled.width(), scaled.height()),
        Some(&ColorRemap::default()),
    )?;

    Ok(canvas.into_raster(base.format()))
}

/// Rasterize `descriptor` and composite it onto `base`.
pub fn apply_descriptor(
    base: &RasterImage,
    descriptor: &WatermarkDescriptor,
    anchor: Anchor,
    margin: &Margin,
    fonts: &FontLibrary,
) -> Result<RasterImage, WatermarkError> {
    let watermark = rasterize(descriptor, fonts)?;
    Ok(apply(base, &watermark, anchor, margin)?)
}
