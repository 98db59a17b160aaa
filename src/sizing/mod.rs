//! Filename size directives.
//!
//! A requested asset name carries its target size after the last `-`:
//!
//! ```text
//! photo-l        named size "-l" from the configured table
//! photo-200x400  200 wide, 400 high
//! photo-200      200 wide, height follows the source aspect ratio
//! photo          unresolved (device detection, not implemented)
//! ```
//!
//! Named keys are looked up first and include the leading `-`, exactly as they
//! appear in configuration. The numeric grammars must match the whole
//! remainder after the separator.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::image_optimizer::TargetSize;

static WIDTH_HEIGHT: OnceLock<Regex> = OnceLock::new();
static WIDTH_ONLY: OnceLock<Regex> = OnceLock::new();

fn width_height_pattern() -> &'static Regex {
    WIDTH_HEIGHT.get_or_init(|| {
        Regex::new(r"(?i)^(?P<width>\d+)x(?P<height>\d+)$").expect("static size pattern is valid")
    })
}

fn width_only_pattern() -> &'static Regex {
    WIDTH_ONLY
        .get_or_init(|| Regex::new(r"^(?P<width>\d+)$").expect("static size pattern is valid"))
}

/// Separator between the asset base name and its size directive.
pub const DIRECTIVE_SEPARATOR: char = '-';

/// Outcome of resolving a requested asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedSize {
    /// A concrete target size.
    Target(TargetSize),
    /// No directive matched. Reserved for device-based negotiation, which is
    /// not implemented, so callers serve the source as-is.
    Unresolved,
}

impl RequestedSize {
    pub fn target(&self) -> Option<TargetSize> {
        match self {
            RequestedSize::Target(size) => Some(*size),
            RequestedSize::Unresolved => None,
        }
    }
}

/// Configured aliases such as `-l` → 800x600. Lookup is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedSizeTable {
    sizes: HashMap<String, TargetSize>,
}

impl NamedSizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `key → "WxH" | "W"` entries.
    pub fn from_specs<'a, I>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::new();
        for (key, spec) in entries {
            let size = parse_size_spec(spec)
                .map_err(|e| format!("named size '{}': {}", key, e))?;
            table.insert(key, size);
        }
        Ok(table)
    }

    pub fn insert(&mut self, key: impl Into<String>, size: TargetSize) {
        self.sizes.insert(key.into(), size);
    }

    pub fn get(&self, key: &str) -> Option<TargetSize> {
        self.sizes.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }
}

/// Parse a configured size value: `"WxH"` or `"W"`.
pub fn parse_size_spec(spec: &str) -> Result<TargetSize, String> {
    let spec = spec.trim();
    if let Some(size) = match_dimensions(spec) {
        return Ok(size);
    }
    Err(format!("'{}' is not of the form WxH or W", spec))
}

/// Split `photo-200x400` into `("photo", "-200x400")` at the last separator.
pub fn split_directive(base_name: &str) -> Option<(&str, &str)> {
    base_name
        .rfind(DIRECTIVE_SEPARATOR)
        .map(|index| base_name.split_at(index))
}

/// Resolve a requested base name (extension already stripped).
pub fn resolve(base_name: &str, named_sizes: &NamedSizeTable) -> RequestedSize {
    let Some((_, suffix)) = split_directive(base_name) else {
        return RequestedSize::Unresolved;
    };

    if let Some(size) = named_sizes.get(suffix) {
        return RequestedSize::Target(size);
    }

    let remainder = &suffix[DIRECTIVE_SEPARATOR.len_utf8()..];
    match match_dimensions(remainder) {
        Some(size) => RequestedSize::Target(size),
        None => RequestedSize::Unresolved,
    }
}

fn match_dimensions(text: &str) -> Option<TargetSize> {
    if let Some(caps) = width_height_pattern().captures(text) {
        let width = caps["width"].parse().ok()?;
        let height = caps["height"].parse().ok()?;
        return Some(TargetSize::new(width, height));
    }

    if let Some(caps) = width_only_pattern().captures(text) {
        let width = caps["width"].parse().ok()?;
        return Some(TargetSize::width_only(width));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NamedSizeTable {
        NamedSizeTable::from_specs([("-s", "100"), ("-l", "800x600")]).unwrap()
    }

    #[test]
    fn test_named_sizes() {
        let table = table();
        assert_eq!(
            resolve("img-s", &table),
            RequestedSize::Target(TargetSize::width_only(100))
        );
        assert_eq!(
            resolve("img-l", &table),
            RequestedSize::Target(TargetSize::new(800, 600))
        );
    }

    #[test]
    fn test_named_lookup_is_case_sensitive() {
        assert_eq!(resolve("img-L", &table()), RequestedSize::Unresolved);
    }

    #[test]
    fn test_width_and_height() {
        let empty = NamedSizeTable::new();
        assert_eq!(
            resolve("img-200x400", &empty),
            RequestedSize::Target(TargetSize::new(200, 400))
        );
        assert_eq!(
            resolve("img-200X400", &empty),
            RequestedSize::Target(TargetSize::new(200, 400))
        );
    }

    #[test]
    fn test_width_only() {
        assert_eq!(
            resolve("img-200", &NamedSizeTable::new()),
            RequestedSize::Target(TargetSize::width_only(200))
        );
    }

    #[test]
    fn test_last_separator_wins() {
        assert_eq!(
            resolve("my-holiday-photo-320x240", &NamedSizeTable::new()),
            RequestedSize::Target(TargetSize::new(320, 240))
        );
        assert_eq!(
            resolve("photo-320-x", &NamedSizeTable::new()),
            RequestedSize::Unresolved
        );
    }

    #[test]
    fn test_grammar_is_anchored() {
        let empty = NamedSizeTable::new();
        assert_eq!(resolve("img-200x400px", &empty), RequestedSize::Unresolved);
        assert_eq!(resolve("img-v2", &empty), RequestedSize::Unresolved);
        assert_eq!(resolve("img-", &empty), RequestedSize::Unresolved);
        assert_eq!(resolve("img- 200", &empty), RequestedSize::Unresolved);
    }

    #[test]
    fn test_no_separator_is_unresolved() {
        assert_eq!(resolve("photo", &table()), RequestedSize::Unresolved);
        assert_eq!(resolve("photo200x400", &table()), RequestedSize::Unresolved);
    }

    #[test]
    fn test_zero_is_syntactically_accepted() {
        assert_eq!(
            resolve("img-0x10", &NamedSizeTable::new()),
            RequestedSize::Target(TargetSize::new(0, 10))
        );
    }

    #[test]
    fn test_overflowing_number_is_unresolved() {
        assert_eq!(
            resolve("img-99999999999x10", &NamedSizeTable::new()),
            RequestedSize::Unresolved
        );
    }

    #[test]
    fn test_named_key_takes_precedence_over_grammar() {
        let mut table = NamedSizeTable::new();
        table.insert("-100", TargetSize::new(50, 50));
        assert_eq!(
            resolve("img-100", &table),
            RequestedSize::Target(TargetSize::new(50, 50))
        );
    }

    #[test]
    fn test_parse_size_spec() {
        assert_eq!(parse_size_spec("640").unwrap(), TargetSize::width_only(640));
        assert_eq!(parse_size_spec(" 800x600 ").unwrap(), TargetSize::new(800, 600));
        assert!(parse_size_spec("large").is_err());
        assert!(parse_size_spec("800x").is_err());
    }

    #[test]
    fn test_from_specs_reports_key() {
        let err = NamedSizeTable::from_specs([("-xl", "huge")]).unwrap_err();
        assert!(err.contains("-xl"));
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(split_directive("photo-l"), Some(("photo", "-l")));
        assert_eq!(split_directive("photo"), None);
    }

    #[test]
    fn test_requested_size_target() {
        assert_eq!(
            RequestedSize::Target(TargetSize::new(1, 2)).target(),
            Some(TargetSize::new(1, 2))
        );
        assert_eq!(RequestedSize::Unresolved.target(), None);
    }
}
