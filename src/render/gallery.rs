//! `gallery` template: profile landing page.
//!
//! A hero with the profile name, the first `landing_count` posts shown
//! large, then everything else in a dense grid.

use maud::{Markup, html};

use super::{RenderVars, base_document, cms::post_card, page_footer};
use crate::models::NormalizedPost;

pub(super) fn render(
    username: &str,
    landing_posts: &[NormalizedPost],
    gallery_posts: &[NormalizedPost],
    vars: &RenderVars,
) -> Markup {
    let total = landing_posts.len() + gallery_posts.len();
    let content = html! {
        header.hero {
            h1 { "@" (username) }
            p { (total) " latest posts" }
        }
        @if !landing_posts.is_empty() {
            h2.section-title { "Latest" }
            section.landing-grid {
                @for (idx, post) in landing_posts.iter().enumerate() {
                    (post_card(post, idx, vars.caption_chars))
                }
            }
        }
        @if !gallery_posts.is_empty() {
            h2.section-title { "Gallery" }
            section.gallery-grid {
                @for (idx, post) in gallery_posts.iter().enumerate() {
                    (post_card(post, landing_posts.len() + idx, vars.caption_chars))
                }
            }
        }
        (page_footer(vars))
    };

    base_document(&format!("@{username}"), Some("gallery"), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPost;
    use chrono::Utc;

    fn vars() -> RenderVars {
        RenderVars {
            title: "ignored".to_string(),
            username: Some("nightowl".to_string()),
            landing_count: 3,
            caption_chars: 280,
            generated_at: Utc::now(),
        }
    }

    fn posts(n: usize) -> Vec<NormalizedPost> {
        (1..=n)
            .map(|i| {
                NormalizedPost::from_raw(RawPost {
                    id: Some(i.to_string()),
                    ..RawPost::default()
                })
            })
            .collect()
    }

    #[test]
    fn test_hero_shows_username() {
        let posts = posts(2);
        let html = render("nightowl", &posts, &[], &vars()).into_string();
        assert!(html.contains("<h1>@nightowl</h1>"));
        assert!(html.contains("<title>@nightowl</title>"));
        assert!(html.contains(r#"<body class="gallery">"#));
        assert!(html.contains("2 latest posts"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let posts = posts(2);
        let html = render("nightowl", &posts, &[], &vars()).into_string();
        assert!(html.contains(r#"class="landing-grid""#));
        assert!(!html.contains(r#"class="gallery-grid""#));

        let html = render("nightowl", &[], &[], &vars()).into_string();
        assert!(!html.contains(r#"class="landing-grid""#));
        assert!(html.contains("0 latest posts"));
    }

    #[test]
    fn test_gallery_alt_text_continues_numbering() {
        let all = posts(4);
        let (landing, rest) = all.split_at(3);
        let html = render("nightowl", landing, rest, &vars()).into_string();
        assert!(html.contains(r#"aria-label="Post 4""#));
    }
}
