//! Crop and aspect-aware resize
//!
//! `resize` crops first and then scales to the exact target size. The crop is
//! centered and cuts `(src - scaled) / 2` from each side, where `scaled` is the
//! target fitted to the source's aspect ratio on the constraining axis. Every
//! intermediate dimension is truncated with integer division, so an odd
//! leftover pixel stays inside the crop.

use super::compositor::{composite, CanvasFill};
use super::error::ImageError;
use super::params::{Margin, OutputLimits, Rect, TargetSize};
use super::raster::RasterImage;

/// Aspect ratios closer than this are treated as equal.
pub const ASPECT_TOLERANCE: f64 = 1e-5;

/// Geometry of a resize, computed before touching any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    /// Margin cropped from the source before scaling, if any.
    pub crop: Option<Margin>,
    /// Final output dimensions.
    pub output: (u32, u32),
}

/// Work out the crop margin and output size for a resize.
pub fn plan_resize(src_w: u32, src_h: u32, target: TargetSize) -> Result<ResizePlan, ImageError> {
    target.validate()?;
    if src_w == 0 || src_h == 0 {
        return Err(ImageError::invalid_geometry(format!(
            "source is {}x{}",
            src_w, src_h
        )));
    }

    let target_w = target.width;
    let target_h = match target.height {
        Some(height) => height,
        None => {
            let height = (src_h as u64 * target_w as u64 / src_w as u64) as u32;
            if height == 0 {
                return Err(ImageError::invalid_geometry(format!(
                    "scaling {}x{} to width {} leaves no rows",
                    src_w, src_h, target_w
                )));
            }
            return Ok(ResizePlan {
                crop: None,
                output: (target_w, height),
            });
        }
    };

    let src_ratio = src_w as f64 / src_h as f64;
    let target_ratio = target_w as f64 / target_h as f64;
    if (src_ratio - target_ratio).abs() <= ASPECT_TOLERANCE {
        return Ok(ResizePlan {
            crop: None,
            output: (target_w, target_h),
        });
    }

    // Target scaled to the source's aspect ratio, fixed on the constraining side
    let (scaled_w, scaled_h) = if src_ratio > target_ratio {
        let width = (target_h as u64 * src_w as u64 / src_h as u64) as u32;
        (width, target_h)
    } else {
        let height = (target_w as u64 * src_h as u64 / src_w as u64) as u32;
        (target_w, height)
    };

    // Upscales leave nothing to cut on that axis
    let margin = Margin::symmetric(
        src_w.saturating_sub(scaled_w) / 2,
        src_h.saturating_sub(scaled_h) / 2,
    );
    Ok(ResizePlan {
        crop: (!margin.is_zero()).then_some(margin),
        output: (target_w, target_h),
    })
}

/// Cut `margin` off each edge of `image`.
pub fn crop(image: &RasterImage, margin: Margin) -> Result<RasterImage, ImageError> {
    let (width, height) = image.dimensions();
    let canvas_w = width as i64 - margin.horizontal() as i64;
    let canvas_h = height as i64 - margin.vertical() as i64;
    if canvas_w <= 0 || canvas_h <= 0 {
        return Err(ImageError::invalid_geometry(format!(
            "margin {:?} leaves nothing of {}x{}",
            margin, width, height
        )));
    }

    let (canvas_w, canvas_h) = (canvas_w as u32, canvas_h as u32);
    composite(
        image,
        (canvas_w, canvas_h),
        Rect::sized(canvas_w, canvas_h),
        Rect::new(margin.left as i32, margin.top as i32, canvas_w, canvas_h),
        None,
        CanvasFill::White,
    )
}

/// Resize onto a white canvas.
pub fn resize(image: &RasterImage, target: TargetSize) -> Result<RasterImage, ImageError> {
    resize_with_fill(image, target, CanvasFill::White)
}

/// Resize onto a white canvas, refusing any output larger than `limits`.
///
/// Oversized outputs fail with [`ImageError::InvalidSize`] before any pixel
/// buffer is allocated.
pub fn resize_within(
    image: &RasterImage,
    target: TargetSize,
    limits: OutputLimits,
) -> Result<RasterImage, ImageError> {
    let (src_w, src_h) = image.dimensions();
    let plan = plan_resize(src_w, src_h, target)?;
    limits.check(plan.output)?;
    render_plan(image, plan, CanvasFill::White)
}

/// Resize with an explicit canvas fill. Watermark rasters use a transparent
/// canvas so their alpha survives.
pub fn resize_with_fill(
    image: &RasterImage,
    target: TargetSize,
    fill: CanvasFill,
) -> Result<RasterImage, ImageError> {
    let (src_w, src_h) = image.dimensions();
    let plan = plan_resize(src_w, src_h, target)?;
    render_plan(image, plan, fill)
}

fn render_plan(
    image: &RasterImage,
    plan: ResizePlan,
    fill: CanvasFill,
) -> Result<RasterImage, ImageError> {
    let (src_w, src_h) = image.dimensions();
    tracing::debug!(
        src_width = src_w,
        src_height = src_h,
        width = plan.output.0,
        height = plan.output.1,
        cropped = plan.crop.is_some(),
        "Planned resize"
    );

    let cropped;
    let source = match plan.crop {
        Some(margin) => {
            cropped = crop(image, margin)?;
            &cropped
        }
        None => image,
    };

    let (out_w, out_h) = plan.output;
    composite(
        source,
        (out_w, out_h),
        Rect::sized(out_w, out_h),
        Rect::sized(source.width(), source.height()),
        None,
        fill,
    )
}
