//! Typed, immutable tables derived from [`Config`](super::Config).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Config, ConfigError};
use crate::cache::FormatCachePolicy;
use crate::image_optimizer::{Margin, OutputLimits};
use crate::sizing::NamedSizeTable;
use crate::watermark::{Anchor, ImageFetcherConfig};

/// Switchable behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Transform images at all
    Service,
    /// Draw the configured watermark
    Watermark,
}

/// Which catalog entry to draw, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkPlacement {
    pub key: String,
    pub anchor: Anchor,
    pub margin: Margin,
}

/// Everything the engine reads at request time, built once at startup.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    root: PathBuf,
    service: bool,
    watermark: bool,
    supported_extensions: Vec<String>,
    named_sizes: NamedSizeTable,
    cache_policy: FormatCachePolicy,
    watermark_descriptors: BTreeMap<String, String>,
    placement: WatermarkPlacement,
    fetch_timeout: Duration,
    output_limits: OutputLimits,
    fonts: BTreeMap<String, PathBuf>,
}

impl EngineSettings {
    /// Validate `config` and build the lookup tables.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;

        let mut supported_extensions: Vec<String> = config
            .formats
            .iter()
            .map(|format| normalize_extension(format))
            .collect();
        supported_extensions.sort();
        supported_extensions.dedup();

        let named_sizes = NamedSizeTable::from_specs(
            config
                .named_sizes
                .iter()
                .map(|(key, spec)| (key.as_str(), spec.as_str())),
        )
        .map_err(ConfigError::Invalid)?;

        let cache_policy = FormatCachePolicy::from_config(
            &config.cache_time,
            supported_extensions.iter().map(String::as_str),
        );

        let settings = Self {
            root: config.root.clone(),
            service: config.settings.service.is_on(),
            watermark: config.settings.watermark.is_on(),
            supported_extensions,
            named_sizes,
            cache_policy,
            watermark_descriptors: config.watermarks.clone(),
            placement: WatermarkPlacement {
                key: config.watermark.key.clone(),
                anchor: config.watermark.position,
                margin: config.watermark.margin,
            },
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            output_limits: OutputLimits::new(config.max_width, config.max_height),
            fonts: config.fonts.clone(),
        };

        tracing::debug!(
            root = %settings.root.display(),
            formats = settings.supported_extensions.len(),
            named_sizes = settings.named_sizes.len(),
            watermarks = settings.watermark_descriptors.len(),
            service = settings.service,
            watermark = settings.watermark,
            "Engine settings built"
        );

        Ok(settings)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lowercase extensions without the leading dot.
    pub fn supported_extensions(&self) -> &[String] {
        &self.supported_extensions
    }

    /// Whether `extension` (any case, with or without a dot) is served.
    pub fn is_supported(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        self.supported_extensions.iter().any(|e| *e == extension)
    }

    pub fn named_sizes(&self) -> &NamedSizeTable {
        &self.named_sizes
    }

    pub fn cache_policy(&self) -> &FormatCachePolicy {
        &self.cache_policy
    }

    /// Raw descriptor strings per watermark key.
    pub fn watermark_descriptors(&self) -> &BTreeMap<String, String> {
        &self.watermark_descriptors
    }

    pub fn watermark_placement(&self) -> &WatermarkPlacement {
        &self.placement
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Service => self.service,
            Feature::Watermark => self.watermark,
        }
    }

    /// Upper bound on resized output dimensions.
    pub fn output_limits(&self) -> OutputLimits {
        self.output_limits
    }

    pub fn fonts(&self) -> &BTreeMap<String, PathBuf> {
        &self.fonts
    }

    pub fn fetcher_config(&self) -> ImageFetcherConfig {
        ImageFetcherConfig {
            timeout: self.fetch_timeout,
            ..ImageFetcherConfig::default()
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
