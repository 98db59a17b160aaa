//! HTTP caching for rendered images: per-format lifetimes and the headers
//! derived from them.

pub mod headers;
pub mod policy;

pub use headers::{content_type_for, etag_for, http_date, CacheHeaders};
pub use policy::{parse_time_span, FormatCachePolicy, ALL_FORMATS_KEY, DEFAULT_CACHE_TIME};
