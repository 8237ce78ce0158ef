// src/models/post.rs

//! Scraped and normalized post records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single record as produced by the scraper.
///
/// Only the fields the pipeline reads are typed. Everything else is kept in
/// `extra` so it survives a load/save round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// Platform identifier
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Shared by every record of one carousel post
    #[serde(rename = "shortCode", default, skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,

    /// Image URLs, first one is the cover
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<String>,

    #[serde(rename = "displayUrl", default, skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(rename = "ownerUsername", default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Permalink to the post on the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Post type as reported by the scraper (`Image`, `Sidecar`, `Video`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,

    /// Children already embedded by the scraper for sidecar posts
    #[serde(
        rename = "childPosts",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub child_posts: Vec<RawPost>,

    /// Every field not listed above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawPost {
    /// The image to mirror: first of `images`, else `displayUrl`.
    pub fn source_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.display_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Short code, if present and non-empty.
    pub fn short_code(&self) -> Option<&str> {
        self.short_code.as_deref().filter(|s| !s.is_empty())
    }

    /// Identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }
}

/// A child of a carousel post after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildPost {
    #[serde(flatten)]
    pub post: RawPost,

    /// Object-store URL, source URL on failed upload, `None` without a source
    pub proxy_image: Option<String>,
}

impl From<RawPost> for ChildPost {
    fn from(post: RawPost) -> Self {
        Self {
            post,
            proxy_image: None,
        }
    }
}

/// One logical post: the first record of its group plus the rest as children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPost {
    #[serde(flatten)]
    pub post: RawPost,

    #[serde(rename = "childPosts")]
    pub child_posts: Vec<ChildPost>,

    pub proxy_image: Option<String>,
}

impl NormalizedPost {
    /// Promote a raw record to a parent, moving any embedded children over.
    pub fn from_raw(mut post: RawPost) -> Self {
        let child_posts = std::mem::take(&mut post.child_posts)
            .into_iter()
            .map(ChildPost::from)
            .collect();
        Self {
            post,
            child_posts,
            proxy_image: None,
        }
    }

    /// Append a record that belongs to this post.
    pub fn push_child(&mut self, post: RawPost) {
        self.child_posts.push(ChildPost::from(post));
    }
}

/// Accept identifiers written either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for id, got {other}"
        ))),
    }
}

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
