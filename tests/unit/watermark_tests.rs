// Watermark descriptors, catalog fallback and compositing

use image::{Rgba, RgbaImage};
use responsive_image::image_optimizer::{Margin, RasterFormat, RasterImage};
use responsive_image::watermark::*;
use std::collections::BTreeMap;
use std::time::Duration;

fn fetcher() -> ImageFetcher {
    ImageFetcher::new(ImageFetcherConfig {
        max_cache_entries: 4,
        timeout: Duration::from_secs(2),
    })
    .expect("Failed to build fetcher")
}

#[test]
fn test_font_descriptor_example() {
    let WatermarkSource::Font(spec) =
        WatermarkSource::parse("font:name=Arial;size=40;color=#F00;text=Hi")
    else {
        panic!("expected a font descriptor");
    };
    assert_eq!(spec.font_family, "Arial");
    assert_eq!(spec.font_size, 40.0);
    assert_eq!(spec.color.to_hex(), "#FF0000");
    assert_eq!(spec.content, "Hi");

    let WatermarkSource::Font(spec) = WatermarkSource::parse("font:color=notacolor42;text=x") else {
        panic!("expected a font descriptor");
    };
    assert_eq!(spec.color, Color::white());
}

#[tokio::test]
async fn test_unreachable_remote_renders_like_literal_text() {
    let fonts = FontLibrary::embedded().unwrap();
    let raw = "http://bad.invalid/x.png";
    let mut descriptors = BTreeMap::new();
    descriptors.insert("default".to_string(), raw.to_string());
    descriptors.insert("plain".to_string(), raw.replace("http://", "text "));

    let catalog = WatermarkCatalog::load(&descriptors, &fetcher(), &fonts).await;

    let expected = render_text(&TextSpec::literal(raw), &fonts).unwrap();
    assert_eq!(catalog.get("default").unwrap().as_ref(), &expected);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_center_ignores_margin() {
    let a = resolve_position(Anchor::Center, (50, 20), (300, 200), &Margin::default());
    let b = resolve_position(Anchor::Center, (50, 20), (300, 200), &Margin::new(9, 8, 7, 6));
    assert_eq!(a, b);
    assert_eq!(a, Point::new(125, 90));
}

#[test]
fn test_watermark_lands_at_anchor() {
    let base = RasterImage::new(
        RgbaImage::from_pixel(300, 300, Rgba([255, 255, 255, 255])),
        RasterFormat::Png,
    );
    // 300 wide base -> 200x100 watermark
    let mark = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255]));
    let result = apply(&base, &mark, Anchor::LeftTop, &Margin::uniform(10)).unwrap();

    assert_eq!(result.format(), RasterFormat::Png);
    let inside = result.pixels().get_pixel(15, 15);
    assert!(inside[0] < 200, "expected darkened pixel, got {:?}", inside);
    assert_eq!(*result.pixels().get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    assert_eq!(*result.pixels().get_pixel(250, 250), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_text_watermark_end_to_end() {
    let fonts = FontLibrary::embedded().unwrap();
    let base = RasterImage::new(
        RgbaImage::from_pixel(240, 120, Rgba([0, 0, 0, 255])),
        RasterFormat::Jpeg,
    );
    let descriptor = WatermarkDescriptor::Text(TextSpec::parse_settings("text=Sample;color=white"));
    let result = apply_descriptor(&base, &descriptor, Anchor::Center, &Margin::default(), &fonts).unwrap();

    assert_eq!(result.dimensions(), (240, 120));
    assert!(result.pixels().pixels().any(|p| p[0] > 0));
}
