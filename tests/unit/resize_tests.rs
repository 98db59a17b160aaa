// Crop and resize geometry through the public API

use image::{Rgba, RgbaImage};
use responsive_image::image_optimizer::{
    crop, plan_resize, resize, ImageError, Margin, RasterFormat, RasterImage, TargetSize,
};

fn gradient(width: u32, height: u32) -> RasterImage {
    RasterImage::new(
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        }),
        RasterFormat::Png,
    )
}

#[test]
fn test_landscape_to_square_crops_sides() {
    let plan = plan_resize(1200, 800, TargetSize::new(400, 400)).unwrap();
    assert_eq!(plan.crop, Some(Margin::symmetric(300, 200)));
    assert_eq!(plan.output, (400, 400));

    let result = resize(&gradient(1200, 800), TargetSize::new(400, 400)).unwrap();
    assert_eq!(result.dimensions(), (400, 400));
    assert_eq!(result.format(), RasterFormat::Png);
}

#[test]
fn test_equal_ratios_never_crop() {
    for (src, target) in [
        ((1000, 500), (200, 100)),
        ((640, 480), (320, 240)),
        ((300, 300), (17, 17)),
        ((1920, 1080), (1280, 720)),
    ] {
        let plan = plan_resize(src.0, src.1, TargetSize::new(target.0, target.1)).unwrap();
        assert_eq!(plan.crop, None, "{:?} -> {:?}", src, target);
        assert_eq!(plan.output, target);
    }
}

#[test]
fn test_width_only_keeps_aspect() {
    let result = resize(&gradient(400, 300), TargetSize::width_only(100)).unwrap();
    assert_eq!(result.dimensions(), (100, 75));
}

#[test]
fn test_crop_then_resize_to_own_size_preserves_dimensions() {
    let cropped = crop(&gradient(120, 90), Margin::new(10, 5, 20, 15)).unwrap();
    assert_eq!(cropped.dimensions(), (90, 70));

    let resized = resize(&cropped, TargetSize::new(90, 70)).unwrap();
    assert_eq!(resized.dimensions(), (90, 70));
    assert_eq!(resized.pixels(), cropped.pixels());
}

#[test]
fn test_crop_keeps_pixel_offsets() {
    let source = gradient(50, 40);
    let cropped = crop(&source, Margin::new(7, 3, 0, 0)).unwrap();
    assert_eq!(cropped.pixels().get_pixel(0, 0), source.pixels().get_pixel(7, 3));
}

#[test]
fn test_invalid_sizes() {
    let source = gradient(10, 10);
    assert!(resize(&source, TargetSize::new(0, 10)).unwrap_err().is_invalid_size());
    assert!(resize(&source, TargetSize::new(10, 0)).unwrap_err().is_invalid_size());
    assert!(resize(&source, TargetSize::width_only(0)).unwrap_err().is_invalid_size());
}

#[test]
fn test_crop_larger_than_image_is_geometry_error() {
    let result = crop(&gradient(10, 10), Margin::symmetric(5, 0));
    assert!(matches!(result, Err(ImageError::InvalidGeometry { .. })));
}

#[test]
fn test_resized_output_encodes_and_decodes() {
    let source = gradient(64, 48).with_format(RasterFormat::Jpeg);
    let resized = resize(&source, TargetSize::new(32, 32)).unwrap();
    let bytes = resized.encode().unwrap();
    let decoded = RasterImage::decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (32, 32));
    assert_eq!(decoded.format(), RasterFormat::Jpeg);
}
