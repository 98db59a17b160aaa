//! Watermark anchor placement.
//!
//! Nine fixed anchors: the four corners, the four edge midpoints and the
//! center. Margins push the watermark in from the edges it is anchored to;
//! centered axes ignore the margin.
//!
//! ```ignore
//! use responsive_image::watermark::position::{resolve_position, Anchor};
//! use responsive_image::image_optimizer::Margin;
//!
//! let point = resolve_position(Anchor::RightBottom, (100, 50), (800, 600), &Margin::uniform(10));
//! assert_eq!((point.x, point.y), (690, 540)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

use serde::{Deserialize, Serialize};

use crate::image_optimizer::Margin;

/// Placement anchor. Unrecognized names fall back to `RightBottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Anchor {
    Left,
    LeftTop,
    Top,
    RightTop,
    Right,
    #[default]
    RightBottom,
    Bottom,
    LeftBottom,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::Left,
        Anchor::LeftTop,
        Anchor::Top,
        Anchor::RightTop,
        Anchor::Right,
        Anchor::RightBottom,
        Anchor::Bottom,
        Anchor::LeftBottom,
        Anchor::Center,
    ];

    /// Parse an anchor name. Accepts `left-top`, `left_top`, `LeftTop` and
    /// similar spellings; anything else is `RightBottom`.
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "left" => Anchor::Left,
            "lefttop" | "topleft" => Anchor::LeftTop,
            "top" => Anchor::Top,
            "righttop" | "topright" => Anchor::RightTop,
            "right" => Anchor::Right,
            "bottom" => Anchor::Bottom,
            "leftbottom" | "bottomleft" => Anchor::LeftBottom,
            "center" | "centre" => Anchor::Center,
            _ => Anchor::RightBottom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Left => "left",
            Anchor::LeftTop => "left-top",
            Anchor::Top => "top",
            Anchor::RightTop => "right-top",
            Anchor::Right => "right",
            Anchor::RightBottom => "right-bottom",
            Anchor::Bottom => "bottom",
            Anchor::LeftBottom => "left-bottom",
            Anchor::Center => "center",
        }
    }
}

impl From<String> for Anchor {
    fn from(value: String) -> Self {
        Anchor::parse(&value)
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.as_str().to_string()
    }
}

/// Top-left corner of a placed watermark. May be negative when the watermark
/// is larger than the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed-form anchor position. Halves truncate toward zero.
pub fn resolve_position(
    anchor: Anchor,
    watermark: (u32, u32),
    image: (u32, u32),
    margin: &Margin,
) -> Point {
    let (img_w, img_h) = (image.0 as i64, image.1 as i64);
    let (wm_w, wm_h) = (watermark.0 as i64, watermark.1 as i64);

    let left = margin.left as i64;
    let top = margin.top as i64;
    let right = img_w - wm_w - margin.right as i64;
    let bottom = img_h - wm_h - margin.bottom as i64;
    let center_x = (img_w - wm_w) / 2;
    let center_y = (img_h - wm_h) / 2;

    let (x, y) = match anchor {
        Anchor::Left => (left, center_y),
        Anchor::LeftTop => (left, top),
        Anchor::Top => (center_x, top),
        Anchor::RightTop => (right, top),
        Anchor::Right => (right, center_y),
        Anchor::Bottom => (center_x, bottom),
        Anchor::LeftBottom => (left, bottom),
        Anchor::Center => (center_x, center_y),
        Anchor::RightBottom => (right, bottom),
    };

    Point::new(saturate(x), saturate(y))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
