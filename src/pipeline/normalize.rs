// src/pipeline/normalize.rs

//! Sidecar merging and post ordering.
//!
//! The scraper emits one record per carousel item, all sharing a short code.
//! Normalization folds each group into one parent carrying the rest as
//! children, in a single pass that keeps first-seen order of groups.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{MissingTimestamps, NormalizedPost, RawPost, SortOrder};

/// Grouping key for a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    ShortCode(String),
    Id(String),
    /// Record with neither short code nor id; never merges.
    Orphan(usize),
}

impl GroupKey {
    fn of(post: &RawPost, position: usize) -> Self {
        match (post.short_code(), post.id()) {
            (Some(code), _) => Self::ShortCode(code.to_string()),
            (None, Some(id)) => Self::Id(id.to_string()),
            (None, None) => Self::Orphan(position),
        }
    }
}

/// Group raw records into parent posts with their carousel children.
///
/// The first record of a key becomes the parent; later records with the same
/// key are appended to its children in encounter order. Output order is the
/// order in which keys were first seen.
pub fn normalize(raw_posts: Vec<RawPost>) -> Vec<NormalizedPost> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut merged: Vec<NormalizedPost> = Vec::new();

    for (position, post) in raw_posts.into_iter().enumerate() {
        let key = GroupKey::of(&post, position);
        match index.get(&key) {
            Some(&slot) => merged[slot].push_child(post),
            None => {
                index.insert(key, merged.len());
                merged.push(NormalizedPost::from_raw(post));
            }
        }
    }

    merged
}

/// Apply the configured ordering policy in place. The sort is stable.
pub fn sort_posts(posts: &mut [NormalizedPost], order: SortOrder, missing: MissingTimestamps) {
    if order == SortOrder::None {
        return;
    }

    posts.sort_by_cached_key(|p| {
        let ts = parse_timestamp(p.post.timestamp.as_deref());
        let group = match missing {
            MissingTimestamps::First => ts.is_some(),
            MissingTimestamps::Last => ts.is_none(),
        };
        (group, Reverse(ts))
    });
}

/// Parse an RFC 3339 timestamp; empty or malformed values count as missing.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            log::debug!("Unparseable timestamp {:?}: {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: Option<&str>, short_code: Option<&str>) -> RawPost {
        RawPost {
            id: id.map(str::to_string),
            short_code: short_code.map(str::to_string),
            ..RawPost::default()
        }
    }

    fn stamped(id: &str, timestamp: Option<&str>) -> NormalizedPost {
        let mut raw = post(Some(id), None);
        raw.timestamp = timestamp.map(str::to_string);
        NormalizedPost::from_raw(raw)
    }

    fn ids(posts: &[NormalizedPost]) -> Vec<&str> {
        posts.iter().map(|p| p.post.id().unwrap_or("-")).collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_groups_by_short_code_in_first_seen_order() {
        let posts = normalize(vec![
            post(Some("1"), Some("A")),
            post(Some("2"), Some("B")),
            post(Some("3"), Some("A")),
        ]);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].post.short_code(), Some("A"));
        assert_eq!(posts[1].post.short_code(), Some("B"));
        assert_eq!(posts[0].child_posts.len(), 1);
        assert_eq!(posts[0].child_posts[0].post.id(), Some("3"));
        assert!(posts[1].child_posts.is_empty());
    }

    #[test]
    fn test_single_short_code_collects_all_children_in_order() {
        let posts = normalize(vec![
            post(Some("1"), Some("S")),
            post(Some("2"), Some("S")),
            post(Some("3"), Some("S")),
            post(Some("4"), Some("S")),
        ]);

        assert_eq!(posts.len(), 1);
        let children: Vec<_> = posts[0].child_posts.iter().map(|c| c.post.id()).collect();
        assert_eq!(children, vec![Some("2"), Some("3"), Some("4")]);
    }

    #[test]
    fn test_falls_back_to_id_without_short_code() {
        let posts = normalize(vec![
            post(Some("7"), None),
            post(Some("7"), Some("")),
            post(Some("8"), None),
        ]);

        assert_eq!(ids(&posts), vec!["7", "8"]);
        assert_eq!(posts[0].child_posts.len(), 1);
    }

    #[test]
    fn test_records_without_keys_never_merge() {
        let posts = normalize(vec![post(None, None), post(None, None), post(None, Some(""))]);
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.child_posts.is_empty()));
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let input = vec![
            post(Some("1"), Some("A")),
            post(Some("2"), None),
            post(None, None),
            post(Some("3"), Some("A")),
            post(Some("2"), None),
        ];
        let len = input.len();
        let posts = normalize(input);
        assert!(posts.len() <= len);
        assert_eq!(posts.len(), 3);

        let distinct = vec![post(Some("1"), Some("A")), post(Some("2"), Some("B")), post(None, None)];
        assert_eq!(normalize(distinct).len(), 3);
    }

    #[test]
    fn test_end_to_end_sidecar_pair() {
        let raw: Vec<RawPost> = serde_json::from_str(
            r#"[{"id":"1","shortCode":"s1","images":["http://x/a.jpg"]},
                {"id":"2","shortCode":"s1","images":["http://x/b.jpg"]}]"#,
        )
        .unwrap();

        let posts = normalize(raw);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.id(), Some("1"));
        assert_eq!(posts[0].child_posts.len(), 1);
        assert_eq!(posts[0].child_posts[0].post.id(), Some("2"));
        assert_eq!(posts[0].child_posts[0].post.images, vec!["http://x/b.jpg"]);
    }

    #[test]
    fn test_sort_newest_first_missing_last() {
        let mut posts = vec![
            stamped("old", Some("2024-01-01T10:00:00.000Z")),
            stamped("none", None),
            stamped("new", Some("2025-02-01T10:00:00.000Z")),
            stamped("bad", Some("yesterday")),
            stamped("mid", Some("2024-06-01T10:00:00+02:00")),
        ];

        sort_posts(&mut posts, SortOrder::TimestampDesc, MissingTimestamps::Last);
        assert_eq!(ids(&posts), vec!["new", "mid", "old", "none", "bad"]);
    }

    #[test]
    fn test_sort_missing_first() {
        let mut posts = vec![
            stamped("old", Some("2024-01-01T10:00:00Z")),
            stamped("none", Some("")),
            stamped("new", Some("2025-02-01T10:00:00Z")),
        ];

        sort_posts(&mut posts, SortOrder::TimestampDesc, MissingTimestamps::First);
        assert_eq!(ids(&posts), vec!["none", "new", "old"]);
    }

    #[test]
    fn test_sort_none_keeps_order() {
        let mut posts = vec![
            stamped("old", Some("2024-01-01T10:00:00Z")),
            stamped("new", Some("2025-02-01T10:00:00Z")),
        ];

        sort_posts(&mut posts, SortOrder::None, MissingTimestamps::Last);
        assert_eq!(ids(&posts), vec!["old", "new"]);
    }
}
