//! Geometry parameters shared by the compositor, resizer and watermark code

use serde::{Deserialize, Serialize};

use super::error::ImageError;

/// Requested output dimensions.
///
/// `height: None` means "derive from the source aspect ratio". Zero values are
/// representable (they come straight from filenames) and rejected by the
/// resizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: Option<u32>,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height: Some(height),
        }
    }

    /// Width-only size; height follows the source aspect ratio.
    pub fn width_only(width: u32) -> Self {
        Self {
            width,
            height: None,
        }
    }

    /// Reject non-positive dimensions.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.width == 0 || self.height == Some(0) {
            return Err(ImageError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Largest output the resizer will allocate, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl OutputLimits {
    pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Reject output dimensions above the limits as an invalid size.
    pub fn check(&self, (width, height): (u32, u32)) -> Result<(), ImageError> {
        if width > self.max_width || height > self.max_height {
            return Err(ImageError::InvalidSize {
                width,
                height: Some(height),
            });
        }
        Ok(())
    }
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DIMENSION, Self::DEFAULT_MAX_DIMENSION)
    }
}

/// Pixel insets, used both as crop offsets and as watermark placement margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub top: u32,
    #[serde(default)]
    pub right: u32,
    #[serde(default)]
    pub bottom: u32,
}

impl Margin {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same inset on all four sides.
    pub fn uniform(value: u32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Symmetric horizontal and vertical insets.
    pub fn symmetric(horizontal: u32, vertical: u32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn horizontal(&self) -> u64 {
        self.left as u64 + self.right as u64
    }

    pub fn vertical(&self) -> u64 {
        self.top as u64 + self.bottom as u64
    }
}

/// A rectangular region. Destination rectangles may start at negative
/// coordinates (watermarks larger than the base); source rectangles may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `width` x `height`.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn ensure_non_empty(&self, what: &str) -> Result<(), ImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::invalid_geometry(format!(
                "{} rectangle is {}x{}",
                what, self.width, self.height
            )));
        }
        Ok(())
    }

    /// True when the rectangle lies fully inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_size_validate() {
        assert!(TargetSize::new(200, 100).validate().is_ok());
        assert!(TargetSize::width_only(200).validate().is_ok());
        assert!(TargetSize::new(0, 100).validate().is_err());
        assert!(TargetSize::new(100, 0).validate().is_err());
        assert!(TargetSize::width_only(0).validate().is_err());
    }

    #[test]
    fn test_output_limits_check() {
        let limits = OutputLimits::default();
        assert!(limits.check((4096, 4096)).is_ok());
        assert!(limits.check((4097, 10)).unwrap_err().is_invalid_size());
        assert!(limits.check((10, 4097)).unwrap_err().is_invalid_size());
        assert!(OutputLimits::new(100, 50).check((100, 51)).is_err());
    }

    #[test]
    fn test_margin_totals() {
        let margin = Margin::new(1, 2, 3, 4);
        assert_eq!(margin.horizontal(), 4);
        assert_eq!(margin.vertical(), 6);
        assert!(!margin.is_zero());
        assert!(Margin::default().is_zero());
        assert_eq!(Margin::symmetric(5, 0), Margin::new(5, 0, 5, 0));
    }

    #[test]
    fn test_margin_deserialize_partial() {
        let margin: Margin = serde_yaml::from_str("left: 10\nbottom: 4").unwrap();
        assert_eq!(margin, Margin::new(10, 0, 0, 4));
    }

    #[test]
    fn test_rect_fits_within() {
        assert!(Rect::sized(10, 10).fits_within(10, 10));
        assert!(!Rect::new(1, 0, 10, 10).fits_within(10, 10));
        assert!(!Rect::new(-1, 0, 5, 5).fits_within(10, 10));
    }

    #[test]
    fn test_rect_empty_is_rejected() {
        assert!(Rect::sized(0, 4).ensure_non_empty("source").is_err());
        assert!(Rect::sized(4, 4).ensure_non_empty("source").is_ok());
    }
}
