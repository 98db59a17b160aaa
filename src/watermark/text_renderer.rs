//! Text watermark rendering.
//!
//! Renders a line of text into a tightly sized, transparent RGBA image. The
//! same scaled font is used to measure and to draw, so glyphs never clip.
//!
//! # Fonts
//!
//! Families are looked up case-insensitively in a [`FontLibrary`] built from
//! configured font files. Unknown families (including the default CJK family
//! name) use the embedded DejaVu Sans.
//!
//! # Example
//!
//! ```ignore
//! use responsive_image::watermark::descriptor::TextSpec;
//! use responsive_image::watermark::text_renderer::{render_text, FontLibrary};
//!
//! let fonts = FontLibrary::embedded()?;
//! let image = render_text(&TextSpec::literal("Copyright 2025"), &fonts)?;
//! ```

use super::descriptor::TextSpec;
use super::WatermarkError;
use ab_glyph::{Font, FontArc, Glyph, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Embedded fallback font (DejaVu Sans, Bitstream Vera license).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");

/// RGB text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse `#RGB`, `#RRGGBB` or a named color.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return parse_hex_color(value).ok();
        }
        named_color(value)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats; #RGB doubles each digit.
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let hex = hex
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::RenderError("Color must start with '#'".to_string()))?;

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::RenderError(format!(
            "Invalid hex digit in color #{}",
            hex
        )));
    }

    let component = |digits: &str| {
        u8::from_str_radix(digits, 16)
            .map_err(|_| WatermarkError::RenderError("Invalid hex digit".to_string()))
    };

    match hex.len() {
        3 => {
            // Double each component: 0xF -> 0xFF, 0xA -> 0xAA
            let r = component(&hex[0..1])?;
            let g = component(&hex[1..2])?;
            let b = component(&hex[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            component(&hex[0..2])?,
            component(&hex[2..4])?,
            component(&hex[4..6])?,
        )),
        _ => Err(WatermarkError::RenderError(format!(
            "Color must be #RGB or #RRGGBB format, got {} characters",
            hex.len()
        ))),
    }
}

/// Common named colors, case-insensitive.
pub fn named_color(name: &str) -> Option<Color> {
    let rgb = match name.trim().to_ascii_lowercase().as_str() {
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "dimgray" | "dimgrey" => (105, 105, 105),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "gold" => (255, 215, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "crimson" => (220, 20, 60),
        "coral" => (255, 127, 80),
        "tomato" => (255, 99, 71),
        "orangered" => (255, 69, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "royalblue" => (65, 105, 225),
        "darkblue" => (0, 0, 139),
        "darkred" => (139, 0, 0),
        "darkgreen" => (0, 100, 0),
        "whitesmoke" => (245, 245, 245),
        "ivory" => (255, 255, 240),
        "beige" => (245, 245, 220),
        _ => return None,
    };
    Some(Color::new(rgb.0, rgb.1, rgb.2))
}

/// Font families available to text watermarks.
#[derive(Clone)]
pub struct FontLibrary {
    fallback: FontArc,
    families: HashMap<String, FontArc>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<&String> = self.families.keys().collect();
        families.sort();
        f.debug_struct("FontLibrary")
            .field("families", &families)
            .finish()
    }
}

impl FontLibrary {
    /// Library with only the embedded font.
    pub fn embedded() -> Result<Self, WatermarkError> {
        let fallback = FontArc::try_from_slice(EMBEDDED_FONT_DATA).map_err(|e| {
            WatermarkError::ConfigError(format!("embedded font is invalid: {}", e))
        })?;
        Ok(Self {
            fallback,
            families: HashMap::new(),
        })
    }

    /// Embedded font plus configured `family → file` entries. Files that
    /// cannot be read or parsed are skipped with a warning.
    pub fn load(families: &BTreeMap<String, PathBuf>) -> Result<Self, WatermarkError> {
        let mut library = Self::embedded()?;
        for (family, path) in families {
            let loaded = std::fs::read(path)
                .map_err(|e| WatermarkError::ConfigError(format!("{}: {}", path.display(), e)))
                .and_then(|data| library.add_font_data(family, data));

            match loaded {
                Ok(()) => tracing::debug!(family = %family, path = %path.display(), "Loaded font"),
                Err(e) => tracing::warn!(
                    family = %family,
                    error = %e,
                    "Font unavailable, using embedded fallback"
                ),
            }
        }
        Ok(library)
    }

    /// Register a font family from TTF/OTF bytes.
    pub fn add_font_data(&mut self, family: &str, data: Vec<u8>) -> Result<(), WatermarkError> {
        let font = FontArc::try_from_vec(data).map_err(|e| {
            WatermarkError::ConfigError(format!("font '{}' is invalid: {}", family, e))
        })?;
        self.families.insert(family.trim().to_lowercase(), font);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family.trim().to_lowercase())
    }

    /// Font for `family`, or the embedded fallback.
    pub fn resolve(&self, family: &str) -> &FontArc {
        self.families
            .get(&family.trim().to_lowercase())
            .unwrap_or(&self.fallback)
    }
}

/// Glyphs positioned along one baseline, plus the box that holds every one
/// of them.
struct TextLayout {
    glyphs: Vec<Glyph>,
    /// Offset added to glyph pixels so the leftmost and topmost ink land at 0
    origin: (f32, f32),
    width: u32,
    height: u32,
}

fn layout_text(font: &FontArc, text: &str, font_size: f32) -> TextLayout {
    let scale = PxScale::from(font_size);
    let scaled_font = font.as_scaled(scale);
    let baseline_y = scaled_font.ascent();

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    // Start from the advance box; outlines may stick out of it on any side
    let (mut min_x, mut min_y) = (0.0f32, 0.0f32);
    let mut max_y = scaled_font.height();
    let mut max_x = 0.0f32;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();
            min_x = min_x.min(bounds.min.x);
            min_y = min_y.min(bounds.min.y);
            max_x = max_x.max(bounds.max.x);
            max_y = max_y.max(bounds.max.y);
        }
        glyphs.push(glyph);

        cursor_x += scaled_font.h_advance(glyph_id);
        max_x = max_x.max(cursor_x);
        prev_glyph = Some(glyph_id);
    }

    TextLayout {
        glyphs,
        origin: (-min_x.floor(), -min_y.floor()),
        width: ((max_x - min_x.floor()).ceil().max(1.0)) as u32,
        height: ((max_y - min_y.floor()).ceil().max(1.0)) as u32,
    }
}

/// Calculate the extent of rendered text: the advance box (summed advances
/// plus kerning by the font's line height) grown to cover any glyph outline
/// that overhangs it.
pub fn measure_text(font: &FontArc, text: &str, font_size: f32) -> (u32, u32) {
    let layout = layout_text(font, text, font_size);
    (layout.width, layout.height)
}

/// Render text into a transparent RGBA image of exactly its measured size.
pub fn render_text(spec: &TextSpec, fonts: &FontLibrary) -> Result<RgbaImage, WatermarkError> {
    if spec.content.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }
    if !spec.font_size.is_finite() || spec.font_size <= 0.0 {
        return Err(WatermarkError::RenderError(format!(
            "Invalid font size {}",
            spec.font_size
        )));
    }

    let font = fonts.resolve(&spec.font_family);
    let layout = layout_text(font, &spec.content, spec.font_size);
    let (width, height) = (layout.width, layout.height);
    let mut image = RgbaImage::new(width, height);
    let (origin_x, origin_y) = (layout.origin.0 as i32, layout.origin.1 as i32);

    for glyph in layout.glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();

        outlined.draw(|px, py, coverage| {
            let x = px as i32 + bounds.min.x as i32 + origin_x;
            let y = py as i32 + bounds.min.y as i32 + origin_y;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                return;
            }

            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = Rgba([spec.color.r, spec.color.g, spec.color.b, alpha]);

            // Overlapping glyph edges accumulate coverage
            let existing = image.get_pixel_mut(x as u32, y as u32);
            if alpha > existing[3] {
                *existing = pixel;
            }
        });
    }

    Ok(image)
}
