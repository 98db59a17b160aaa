use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use responsive_image::config::{Config, EngineSettings};
use responsive_image::logging::{init_subscriber, LogFormat};
use responsive_image::{ImageService, RenderedImage};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Render resized and watermarked image variants from filename directives
#[derive(Parser, Debug)]
#[command(name = "responsive-image")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory rendered files are written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    check: bool,

    /// Log output format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: LogFormat,

    /// Request paths relative to the configured root, e.g. photos/cat-l.jpg
    #[arg(required_unless_present = "check")]
    requests: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_subscriber(args.log_format)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    let settings = EngineSettings::from_config(&config).context("Invalid configuration")?;

    tracing::info!(
        config_file = %args.config.display(),
        root = %settings.root().display(),
        formats = settings.supported_extensions().len(),
        named_sizes = settings.named_sizes().len(),
        watermarks = settings.watermark_descriptors().len(),
        "Configuration loaded successfully"
    );

    if args.check {
        println!("{}", json!({ "config": args.config, "valid": true }));
        return Ok(());
    }

    if let Some(out_dir) = &args.out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }

    let service = ImageService::from_settings(settings)
        .await
        .context("Failed to start image service")?;

    let requests = args.requests;
    let out_dir = args.out_dir;
    let failures = tokio::task::spawn_blocking(move || {
        requests
            .par_iter()
            .map(|request| process(&service, request, out_dir.as_deref()))
            .filter(|ok| !ok)
            .count()
    })
    .await
    .context("Render workers panicked")?;

    if failures > 0 {
        anyhow::bail!("{} request(s) failed", failures);
    }
    Ok(())
}

/// Render one request, write it out, and print its JSON summary line.
fn process(service: &ImageService, request: &str, out_dir: Option<&Path>) -> bool {
    let summary = match service.render(request) {
        Ok(Some(rendered)) => match write_output(&rendered, request, out_dir) {
            Ok(written) => json!({
                "request": request,
                "status": 200,
                "written": written,
                "bytes": rendered.bytes.len(),
                "image": rendered,
            }),
            Err(e) => {
                tracing::error!(request, error = %e, "Failed to write output");
                json!({ "request": request, "status": 500, "error": format!("{:#}", e) })
            }
        },
        Ok(None) => json!({ "request": request, "status": 204, "skipped": true }),
        Err(e) => {
            tracing::warn!(request, error = %e, "Render failed");
            json!({ "request": request, "status": e.to_http_status(), "error": e.to_string() })
        }
    };

    println!("{}", summary);
    summary["status"].as_u64().is_some_and(|status| status < 400)
}

fn write_output(rendered: &RenderedImage, request: &str, out_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(out_dir) = out_dir else {
        return Ok(None);
    };
    let file_name = Path::new(request)
        .file_name()
        .with_context(|| format!("Request '{}' has no file name", request))?;
    let target = out_dir.join(file_name);
    std::fs::write(&target, &rendered.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(Some(target))
}
