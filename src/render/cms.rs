//! `cms` template: every post as a card.

use maud::{Markup, html};

use super::{
    RenderVars, base_document, carousel, display_timestamp, page_footer, post_image,
    truncate_caption,
};
use crate::models::NormalizedPost;

/// Alt text length for images, in grapheme clusters.
const ALT_CHARS: usize = 80;

pub(super) fn render(posts: &[NormalizedPost], vars: &RenderVars) -> Markup {
    let content = html! {
        header.page-header {
            h1 { (vars.title) }
            p.post-count { (posts.len()) " posts" }
        }
        main.post-list {
            @for (idx, post) in posts.iter().enumerate() {
                (post_card(post, idx, vars.caption_chars))
            }
        }
        (page_footer(vars))
    };

    base_document(&vars.title, Some("cms"), content)
}

/// Renders one post with caption, meta line and carousel strip
pub(super) fn post_card(post: &NormalizedPost, idx: usize, caption_chars: usize) -> Markup {
    let caption = post
        .post
        .caption
        .as_deref()
        .filter(|c| !c.trim().is_empty());
    let alt = caption
        .map(|c| truncate_caption(c, ALT_CHARS))
        .unwrap_or_else(|| format!("Post {}", idx + 1));

    html! {
        article.post-card data-id=[post.post.id()] {
            (post_image(post.proxy_image.as_deref(), &alt))
            (carousel(post))
            div.post-body {
                @if let Some(caption) = caption {
                    p.caption { (truncate_caption(caption, caption_chars)) }
                }
                div.post-meta {
                    @if let Some(owner) = &post.post.owner_username {
                        span.owner { "@" (owner) }
                    }
                    @if let Some(ts) = post.post.timestamp.as_deref().filter(|t| !t.is_empty()) {
                        time datetime=(ts) { (display_timestamp(ts)) }
                    }
                    @if let Some(url) = &post.post.url {
                        a href=(url) target="_blank" rel="noopener" { "View on Instagram" }
                    }
                }
            }
        }
    }
}
