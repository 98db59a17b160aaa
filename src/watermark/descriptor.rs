//! Watermark descriptors.
//!
//! A descriptor is the raw configuration string for one watermark key. It is
//! classified once, when configuration is loaded:
//!
//! ```text
//! http://cdn.example.com/logo.png          -> Remote
//! /srv/assets/logo.png (existing file)     -> File
//! font:name=Arial;size=40;color=#F00;text=Hi -> Font
//! anything else                            -> Literal (rendered as text)
//! ```

use std::path::{Path, PathBuf};

use super::text_renderer::Color;

/// Prefix marking a font descriptor (matched case-insensitively).
pub const FONT_PREFIX: &str = "font:";

/// Default font family; a CJK-capable sans-serif.
pub const DEFAULT_FONT_FAMILY: &str = "Microsoft YaHei";

/// Default font size.
pub const DEFAULT_FONT_SIZE: f32 = 32.0;

/// Font, size, color and content of a text watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub font_family: String,
    pub font_size: f32,
    pub color: Color,
    pub content: String,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: Color::white(),
            content: String::new(),
        }
    }
}

impl TextSpec {
    /// Default font, size and color with `content` as the text.
    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Parse the `name=value;...` body of a font descriptor.
    ///
    /// Keys are case-insensitive and trimmed; values keep their case. Unknown
    /// keys, pairs without `=`, and unparsable sizes or colors are ignored so
    /// the defaults stay in place.
    pub fn parse_settings(body: &str) -> Self {
        let mut spec = Self::default();

        for pair in body.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match name.trim().to_ascii_lowercase().as_str() {
                "name" => spec.font_family = value.to_string(),
                "text" => spec.content = value.to_string(),
                "size" => match value.parse::<f32>() {
                    Ok(size) if size.is_finite() && size > 0.0 => spec.font_size = size,
                    _ => tracing::debug!(value, "Ignoring invalid watermark font size"),
                },
                "color" => match Color::parse(value) {
                    Some(color) => spec.color = color,
                    None => tracing::debug!(value, "Ignoring invalid watermark color"),
                },
                _ => {}
            }
        }

        spec
    }
}

/// Strip the font prefix, ignoring its case.
fn strip_font_prefix(raw: &str) -> Option<&str> {
    let prefix = raw.get(..FONT_PREFIX.len())?;
    prefix
        .eq_ignore_ascii_case(FONT_PREFIX)
        .then(|| &raw[FONT_PREFIX.len()..])
}

fn is_http_url(raw: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        raw.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Where a watermark comes from, decided once per configuration key.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkSource {
    /// Fetched over HTTP(S)
    Remote(String),
    /// Read from the local filesystem
    File(PathBuf),
    /// Rendered from a `font:` descriptor
    Font(TextSpec),
    /// The raw string itself, rendered with default font settings
    Literal(String),
}

impl WatermarkSource {
    /// Classify a raw descriptor. Order: URL, existing file, font descriptor,
    /// literal text.
    pub fn parse(raw: &str) -> Self {
        if is_http_url(raw) {
            return Self::Remote(raw.to_string());
        }

        let path = Path::new(raw);
        if !raw.is_empty() && path.is_file() {
            return Self::File(path.to_path_buf());
        }

        if let Some(body) = strip_font_prefix(raw) {
            return Self::Font(TextSpec::parse_settings(body));
        }

        Self::Literal(raw.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::File(_) => "file",
            Self::Font(_) => "font",
            Self::Literal(_) => "literal",
        }
    }
}

/// A watermark ready to be rasterized.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkDescriptor {
    /// Encoded image bytes; `origin` is the descriptor they came from and is
    /// rendered as text if the bytes do not decode.
    Image { bytes: Vec<u8>, origin: String },
    /// Text to render.
    Text(TextSpec),
}

impl WatermarkDescriptor {
    /// Text fallback showing the raw descriptor string.
    pub fn literal(raw: impl Into<String>) -> Self {
        Self::Text(TextSpec::literal(raw))
    }
}
