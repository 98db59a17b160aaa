// Configuration module

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::image_optimizer::{Margin, OutputLimits};
use crate::sizing::parse_size_spec;
use crate::watermark::Anchor;

mod settings;

pub use settings::{EngineSettings, Feature, WatermarkPlacement};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// An on/off flag. `on` (any case) and YAML `true` enable; anything else
/// disables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Bool(bool),
    Text(String),
}

impl Switch {
    pub fn on() -> Self {
        Switch::Bool(true)
    }

    pub fn off() -> Self {
        Switch::Bool(false)
    }

    pub fn is_on(&self) -> bool {
        match self {
            Switch::Bool(value) => *value,
            Switch::Text(value) => value.trim().eq_ignore_ascii_case("on"),
        }
    }
}

/// Global feature flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "Switch::on")]
    pub service: Switch,
    #[serde(default = "Switch::off")]
    pub watermark: Switch,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            service: Switch::on(),
            watermark: Switch::off(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_formats() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn default_watermark_key() -> String {
    "default".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_width() -> u32 {
    OutputLimits::DEFAULT_MAX_DIMENSION
}

fn default_max_height() -> u32 {
    OutputLimits::DEFAULT_MAX_DIMENSION
}

/// Which watermark to draw and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default = "default_watermark_key")]
    pub key: String,
    #[serde(default)]
    pub position: Anchor,
    #[serde(default)]
    pub margin: Margin,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            key: default_watermark_key(),
            position: Anchor::default(),
            margin: Margin::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: FeatureFlags,
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Extension (or `all`) to lifetime, e.g. `7.00:00:00` or `7` (days)
    #[serde(default, deserialize_with = "scalar_map")]
    pub cache_time: BTreeMap<String, String>,
    /// Filename suffix (including the leading `-`) to `WxH` or `W`
    #[serde(default, deserialize_with = "scalar_map")]
    pub named_sizes: BTreeMap<String, String>,
    /// Watermark key to raw descriptor
    #[serde(default)]
    pub watermarks: BTreeMap<String, String>,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Maximum width of a resized image (to prevent abuse)
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    /// Maximum height of a resized image
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Font family to TTF/OTF file
    #[serde(default)]
    pub fonts: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: FeatureFlags::default(),
            root: default_root(),
            formats: default_formats(),
            cache_time: BTreeMap::new(),
            named_sizes: BTreeMap::new(),
            watermarks: BTreeMap::new(),
            watermark: WatermarkConfig::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            fonts: BTreeMap::new(),
        }
    }
}

/// Map values may be written as strings or bare numbers (`"-s": 100`).
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(u64),
    }

    let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Scalar::Text(text) => text,
                Scalar::Integer(n) => n.to_string(),
            };
            (key, value)
        })
        .collect())
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });
        if let Some(var_name) = missing {
            return Err(ConfigError::MissingEnvVar(var_name));
        }

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.formats.is_empty() {
            return Err("At least one image format must be listed in 'formats'".to_string());
        }

        let mut seen_formats = HashSet::new();
        for format in &self.formats {
            let normalized = format.trim().trim_start_matches('.').to_ascii_lowercase();
            if normalized.is_empty() {
                return Err("Image format names cannot be empty".to_string());
            }
            if !seen_formats.insert(normalized) {
                return Err(format!("Duplicate image format '{}'", format));
            }
        }

        for (key, spec) in &self.named_sizes {
            if key.is_empty() {
                return Err("Named size keys cannot be empty".to_string());
            }
            parse_size_spec(spec).map_err(|e| format!("Named size '{}': {}", key, e))?;
        }

        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than 0".to_string());
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err("max_width and max_height must be greater than 0".to_string());
        }

        if self.watermark.key.trim().is_empty() {
            return Err("watermark.key cannot be empty".to_string());
        }

        Ok(())
    }

    /// Load, then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}
