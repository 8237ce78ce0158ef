//! Utility functions and helpers.

pub mod fs;
pub mod http;

use chrono::{DateTime, Local};
use url::Url;

/// Parse a URL and require an http(s) scheme.
pub fn parse_http_url(input: &str) -> Option<Url> {
    Url::parse(input.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// Run stamp used in artifact file names (`20250301120000`).
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Make an identifier safe to embed in an object key.
///
/// The mapping is lossy: every character outside `[A-Za-z0-9._-]` becomes
/// `_` and leading dots are dropped, so `a/b` and `a_b` share a key.
/// Platform post ids are numeric and never hit this.
pub fn sanitize_key_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://www.instagram.com/clubname/").is_some());
        assert!(parse_http_url(" http://example.com ").is_some());
        assert!(parse_http_url("ftp://example.com/file").is_none());
        assert!(parse_http_url("instagram.com/clubname").is_none());
    }

    #[test]
    fn test_run_stamp() {
        let now = Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 5).unwrap();
        assert_eq!(run_stamp(now), "20250301120005");
    }

    #[test]
    fn test_sanitize_key_segment() {
        assert_eq!(sanitize_key_segment("3301_17845"), "3301_17845");
        assert_eq!(sanitize_key_segment("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_key_segment("a b?c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_key_segment_is_lossy() {
        assert_eq!(sanitize_key_segment("a/b"), sanitize_key_segment("a_b"));
        assert_eq!(sanitize_key_segment(".hidden"), "hidden");
        assert_eq!(sanitize_key_segment("3301987654321"), "3301987654321");
    }
}
