//! Response cache headers for a rendered image.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// `strftime` pattern for HTTP-date (RFC 7231 IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP-date.
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Weak-by-convention validator derived from the modification time.
///
/// Hashes the RFC 2822 form of `last_modified` and keeps bytes 4..12 of the
/// digest as 16 lowercase hex characters, quoted with a `:0` suffix.
pub fn etag_for(last_modified: DateTime<Utc>) -> String {
    let digest = Sha256::digest(last_modified.to_rfc2822().as_bytes());
    format!("\"{}:0\"", hex::encode(&digest[4..12]))
}

/// `image/<ext>`, with `jpg` spelled `jpeg`.
pub fn content_type_for(extension: &str) -> String {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" => "image/jpeg".to_string(),
        _ => format!("image/{}", ext),
    }
}

/// Headers sent with every rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheHeaders {
    pub etag: String,
    pub cache_control: String,
    pub expires: String,
    pub last_modified: String,
    pub accept_ranges: String,
    pub content_type: String,
}

impl CacheHeaders {
    /// Build headers for a source modified at `last_modified`, served at `now`.
    pub fn new(
        last_modified: DateTime<Utc>,
        ttl: Duration,
        extension: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let last_modified = last_modified.trunc_subsecs(0);
        let expires = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            etag: etag_for(last_modified),
            cache_control: format!("public, max-age={}", ttl.as_secs()),
            expires: http_date(expires),
            last_modified: http_date(last_modified),
            accept_ranges: "bytes".to_string(),
            content_type: content_type_for(extension),
        }
    }

    /// Build headers from a file's modification time.
    pub fn for_file(path: &Path, ttl: Duration, extension: &str) -> std::io::Result<Self> {
        let modified: SystemTime = std::fs::metadata(path)?.modified()?;
        Ok(Self::new(modified.into(), ttl, extension, Utc::now()))
    }

    /// Header name/value pairs in response order.
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("ETag", self.etag.as_str()),
            ("Cache-Control", self.cache_control.as_str()),
            ("Expires", self.expires.as_str()),
            ("Last-Modified", self.last_modified.as_str()),
            ("Accept-Ranges", self.accept_ranges.as_str()),
            ("Content-Type", self.content_type.as_str()),
        ]
    }
}
