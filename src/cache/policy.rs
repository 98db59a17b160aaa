//! Per-format cache lifetimes.
//!
//! Lifetimes are written like `7.00:00:00` (days, hours, minutes, seconds),
//! `01:30:00`, or a plain whole number of days (`10` is ten days). The `all` entry seeds every
//! supported format and per-format entries override it.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Lifetime used when nothing is configured or a value does not parse.
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Key that applies a lifetime to every supported format.
pub const ALL_FORMATS_KEY: &str = "all";

/// Parse a `[d.]hh:mm[:ss]` span or a plain number of days.
///
/// Returns `None` for anything else, including out-of-range hours, minutes
/// or seconds.
pub fn parse_time_span(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(days) = value.parse::<u64>() {
        return days.checked_mul(24 * 60 * 60).map(Duration::from_secs);
    }

    let (days, clock) = match value.split_once('.') {
        Some((days, clock)) if clock.contains(':') => (days.parse::<u64>().ok()?, clock),
        Some(_) => return None,
        None => (0, value),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, 0),
        [h, m, s] => (
            h.parse::<u64>().ok()?,
            m.parse::<u64>().ok()?,
            s.parse::<u64>().ok()?,
        ),
        _ => return None,
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let total = days
        .checked_mul(24 * 60 * 60)?
        .checked_add(hours * 60 * 60 + minutes * 60 + seconds)?;
    Some(Duration::from_secs(total))
}

/// Cache lifetime per lowercase file extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatCachePolicy {
    ttls: HashMap<String, Duration>,
}

impl FormatCachePolicy {
    /// Build the policy from the configured `cache_time` table.
    ///
    /// Values that do not parse keep [`DEFAULT_CACHE_TIME`] and log a warning.
    pub fn from_config<'a>(
        cache_time: &BTreeMap<String, String>,
        formats: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut ttls = HashMap::new();

        if let Some(raw) = cache_time.get(ALL_FORMATS_KEY) {
            let ttl = parse_or_default(ALL_FORMATS_KEY, raw);
            for format in formats {
                ttls.insert(normalize(format), ttl);
            }
        }

        for (format, raw) in cache_time {
            if format == ALL_FORMATS_KEY {
                continue;
            }
            ttls.insert(normalize(format), parse_or_default(format, raw));
        }

        Self { ttls }
    }

    /// Lifetime for `extension` (with or without a leading dot, any case).
    pub fn ttl(&self, extension: &str) -> Duration {
        self.ttls
            .get(&normalize(extension))
            .copied()
            .unwrap_or(DEFAULT_CACHE_TIME)
    }

    pub fn len(&self) -> usize {
        self.ttls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ttls.is_empty()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

fn parse_or_default(format: &str, raw: &str) -> Duration {
    parse_time_span(raw).unwrap_or_else(|| {
        tracing::warn!(
            format,
            value = raw,
            "Invalid cache time, using the 7 day default"
        );
        DEFAULT_CACHE_TIME
    })
}
