//! HTML page rendering.
//!
//! Final stage of a build. Takes materialized posts and renders one
//! self-contained HTML document.
//!
//! ## Templates
//!
//! - **`cms`**: every post as a card with its carousel strip
//! - **`gallery`**: profile landing page with `username`, `landing_posts`
//!   (the first few posts, shown large) and `gallery_posts` (the rest)
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. The
//! stylesheet is embedded at compile time so the output has no external
//! assets besides the images themselves.

mod cms;
mod gallery;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::{NormalizedPost, RenderConfig};

const CSS: &str = include_str!("../../assets/style.css");

/// Fallback shown when no post names its owner.
pub const DEFAULT_USERNAME: &str = "Instagram Account";

/// Available page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Cms,
    Gallery,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Cms => "cms",
            Template::Gallery => "gallery",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cms" => Ok(Template::Cms),
            "gallery" => Ok(Template::Gallery),
            other => Err(AppError::render(format!(
                "unknown template '{other}' (expected 'cms' or 'gallery')"
            ))),
        }
    }
}

/// Named top-level variables handed to a template.
#[derive(Debug, Clone)]
pub struct RenderVars {
    /// Page title (`cms`)
    pub title: String,
    /// Profile name (`gallery`, required)
    pub username: Option<String>,
    /// Posts placed in the landing section (`gallery`)
    pub landing_count: usize,
    /// Caption length in grapheme clusters
    pub caption_chars: usize,
    pub generated_at: DateTime<Utc>,
}

impl RenderVars {
    /// Variables from config, with `username` taken from the posts.
    pub fn from_config(config: &RenderConfig, posts: &[NormalizedPost]) -> Self {
        Self {
            title: config.title.clone(),
            username: Some(username_of(posts)),
            landing_count: config.landing_count,
            caption_chars: config.caption_chars,
            generated_at: Utc::now(),
        }
    }
}

/// Owner of the first post, or [`DEFAULT_USERNAME`].
pub fn username_of(posts: &[NormalizedPost]) -> String {
    posts
        .first()
        .and_then(|p| p.post.owner_username.as_deref())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_USERNAME)
        .to_string()
}

/// Render posts with the given template.
pub fn render(template: Template, posts: &[NormalizedPost], vars: &RenderVars) -> Result<String> {
    let markup = match template {
        Template::Cms => cms::render(posts, vars),
        Template::Gallery => {
            let username = vars
                .username
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| AppError::render("gallery template requires 'username'"))?;
            let split = vars.landing_count.min(posts.len());
            let (landing_posts, gallery_posts) = posts.split_at(split);
            gallery::render(username, landing_posts, gallery_posts, vars)
        }
    };
    Ok(markup.into_string())
}

// ============================================================================
// Shared components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Image, or a placeholder block when there is nothing to show
fn post_image(proxy_image: Option<&str>, alt: &str) -> Markup {
    html! {
        @if let Some(src) = proxy_image {
            img src=(src) alt=(alt) loading="lazy";
        } @else {
            div.image-placeholder role="img" aria-label=(alt) {}
        }
    }
}

/// Thumbnail strip for carousel children
fn carousel(post: &NormalizedPost) -> Markup {
    html! {
        @if !post.child_posts.is_empty() {
            div.carousel {
                @for (idx, child) in post.child_posts.iter().enumerate() {
                    (post_image(child.proxy_image.as_deref(), &format!("Slide {}", idx + 2)))
                }
            }
        }
    }
}

fn page_footer(vars: &RenderVars) -> Markup {
    html! {
        footer.page-footer {
            "Generated " (vars.generated_at.format("%Y-%m-%d %H:%M UTC"))
        }
    }
}

/// Cut a caption to `max` grapheme clusters, adding an ellipsis.
pub(crate) fn truncate_caption(caption: &str, max: usize) -> String {
    let caption = caption.trim();
    let mut graphemes = caption.grapheme_indices(true);
    match graphemes.nth(max) {
        Some((cut, _)) => format!("{}…", caption[..cut].trim_end()),
        None => caption.to_string(),
    }
}

/// `2025-03-01 12:00` for RFC 3339 input, the raw text otherwise.
pub(crate) fn display_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
