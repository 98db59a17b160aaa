// Request pipeline: lookup, sizing, watermark and cache headers

use image::{Rgba, RgbaImage};
use responsive_image::config::{Config, EngineSettings, Switch};
use responsive_image::image_optimizer::{RasterFormat, RasterImage};
use responsive_image::{EngineError, ImageService};
use std::path::Path;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    let bytes = RasterImage::new(
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])),
        RasterFormat::Png,
    )
    .encode()
    .unwrap();
    std::fs::write(dir.join(name), bytes).unwrap();
}

async fn service(root: &Path, watermark: Option<&str>) -> ImageService {
    let mut config = Config {
        root: root.to_path_buf(),
        ..Config::default()
    };
    config.named_sizes.insert("-s".to_string(), "100".to_string());
    config.named_sizes.insert("-l".to_string(), "800x600".to_string());
    config.cache_time.insert("all".to_string(), "1.00:00:00".to_string());
    if let Some(raw) = watermark {
        config.settings.watermark = Switch::on();
        config.watermarks.insert("default".to_string(), raw.to_string());
    }
    let settings = EngineSettings::from_config(&config).unwrap();
    ImageService::from_settings(settings).await.unwrap()
}

#[tokio::test]
async fn test_directive_sizes() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "photo.png", 1200, 800);
    let service = service(dir.path(), None).await;

    let cases = [
        ("photo-400x400.png", (400, 400)),
        ("photo-l.png", (800, 600)),
        ("photo-s.png", (100, 66)),
        ("photo-300.png", (300, 200)),
        ("photo.png", (1200, 800)),
        ("photo-whatever.png", (1200, 800)),
    ];
    for (request, expected) in cases {
        let rendered = service.render(request).unwrap().unwrap();
        assert_eq!(rendered.output_size, expected, "request {}", request);
        assert_eq!(
            RasterImage::decode(&rendered.bytes).unwrap().dimensions(),
            expected,
            "request {}",
            request
        );
        assert_eq!(rendered.content_type, "image/png");
    }
}

#[tokio::test]
async fn test_cache_headers() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "photo.png", 10, 10);
    let service = service(dir.path(), None).await;

    let rendered = service.render("photo-s.png").unwrap().unwrap();
    let headers = &rendered.headers;
    assert_eq!(headers.cache_control, "public, max-age=86400");
    assert_eq!(headers.accept_ranges, "bytes");
    assert!(headers.last_modified.ends_with(" GMT"));
    assert!(headers.expires.ends_with(" GMT"));
    assert_eq!(headers.etag.len(), 20);

    // Same source, same validator
    let again = service.render("photo-l.png").unwrap().unwrap();
    assert_eq!(again.headers.etag, headers.etag);
}

#[tokio::test]
async fn test_text_watermark_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "photo.png", 300, 200);

    let plain = service(dir.path(), None).await;
    let marked = service(dir.path(), Some("font:size=24;color=red;text=Sample")).await;
    assert_eq!(marked.catalog().len(), 1);

    let a = plain.render("photo.png").unwrap().unwrap();
    let b = marked.render("photo.png").unwrap().unwrap();
    assert!(!a.transformed);
    assert!(b.transformed);
    assert_eq!(b.output_size, (300, 200));
    assert_ne!(a.bytes, b.bytes);
}

#[tokio::test]
async fn test_not_found_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path(), None).await;

    let err = service.render("missing-l.png").unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(err.to_http_status(), 404);

    assert!(service.render("readme.md").unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_source_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();
    let service = service(dir.path(), None).await;

    let err = service.render("broken-s.png").unwrap_err();
    assert!(matches!(err, EngineError::Image(_)));
    assert_eq!(err.to_http_status(), 400);
}
