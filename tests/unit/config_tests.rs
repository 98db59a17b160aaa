// Configuration loading and engine settings

use responsive_image::config::*;
use responsive_image::image_optimizer::{Margin, TargetSize};
use responsive_image::watermark::Anchor;
use std::time::Duration;

const SAMPLE: &str = r##"
settings:
  service: on
  watermark: off
root: ./public
formats: [jpg, jpeg, png, gif]
cache_time:
  all: "7.00:00:00"
  png: "1.00:00:00"
  gif: "whenever"
named_sizes:
  "-s": "100"
  "-l": "800x600"
watermarks:
  default: "font:name=Arial;size=40;color=#F00;text=Hi"
watermark:
  key: default
  position: center
  margin: { left: 10, top: 10, right: 10, bottom: 10 }
fetch_timeout_secs: 10
"##;

#[test]
fn test_sample_config_builds_settings() {
    let config = Config::from_yaml_with_env(SAMPLE).expect("Failed to parse sample config");
    let settings = EngineSettings::from_config(&config).expect("Failed to build settings");

    assert!(settings.is_enabled(Feature::Service));
    assert!(!settings.is_enabled(Feature::Watermark));
    assert_eq!(settings.supported_extensions(), ["gif", "jpeg", "jpg", "png"]);
    assert_eq!(settings.named_sizes().get("-s"), Some(TargetSize::width_only(100)));
    assert_eq!(settings.named_sizes().get("-l"), Some(TargetSize::new(800, 600)));
    assert_eq!(settings.named_sizes().get("-L"), None);
    assert_eq!(settings.watermark_placement().anchor, Anchor::Center);
    assert_eq!(settings.watermark_placement().margin, Margin::uniform(10));
}

#[test]
fn test_cache_times_per_format() {
    let config = Config::from_yaml_with_env(SAMPLE).unwrap();
    let settings = EngineSettings::from_config(&config).unwrap();
    let policy = settings.cache_policy();

    assert_eq!(policy.ttl("jpg"), Duration::from_secs(7 * 86_400));
    assert_eq!(policy.ttl("PNG"), Duration::from_secs(86_400));
    // Unparsable value keeps the default
    assert_eq!(policy.ttl("gif"), Duration::from_secs(7 * 86_400));
}

#[test]
fn test_unknown_anchor_name_falls_back() {
    let yaml = "watermark:\n  position: somewhere-else\n";
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.position, Anchor::RightBottom);
}

#[test]
fn test_settings_switch_only_accepts_on_or_true() {
    for (value, expected) in [("on", true), ("ON", true), ("true", true), ("off", false), ("yes", false)] {
        let yaml = format!("settings:\n  watermark: {}\n", value);
        let config = Config::from_yaml_with_env(&yaml).unwrap();
        assert_eq!(config.settings.watermark.is_on(), expected, "value {}", value);
    }
}

#[test]
fn test_invalid_named_size_is_rejected() {
    let yaml = "named_sizes:\n  \"-x\": \"wide\"\n";
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert!(config.validate().is_err());
    assert!(matches!(
        EngineSettings::from_config(&config),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_bare_integer_cache_time_is_days() {
    let config = Config::from_yaml_with_env("cache_time:\n  all: 10\n").unwrap();
    let settings = EngineSettings::from_config(&config).unwrap();
    assert_eq!(settings.cache_policy().ttl("jpg"), Duration::from_secs(10 * 86_400));
}

#[test]
fn test_output_limits_from_yaml() {
    let config = Config::from_yaml_with_env("max_width: 1024\n").unwrap();
    let settings = EngineSettings::from_config(&config).unwrap();
    assert_eq!(settings.output_limits().max_width, 1024);
    assert_eq!(settings.output_limits().max_height, 4096);
}
