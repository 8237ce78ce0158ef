// src/pipeline/materialize.rs

//! Media materialization.
//!
//! Replaces each post's remote image with a copy in the object store. Every
//! parent and child is an independent job; a failed upload falls back to the
//! source URL and is reported, never aborting the batch.

use futures::stream::{self, StreamExt};

use crate::error::TransferError;
use crate::models::{NormalizedPost, RawPost, UploadConfig};
use crate::services::Uploader;
use crate::utils::sanitize_key_segment;

/// Key token for parents without an id.
const UNKNOWN_PARENT: &str = "unknown";
/// Key token for children without an id.
const UNKNOWN_CHILD: &str = "child_unknown";

/// Whether a media item is a post or a carousel child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRole {
    Parent,
    Child,
}

/// Destination key layout for mirrored media.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    pub key_prefix: String,
    pub extension: String,
    pub max_concurrent: usize,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for MaterializeOptions {
    fn from(config: &UploadConfig) -> Self {
        Self {
            key_prefix: config.key_prefix.clone(),
            extension: config.extension.clone(),
            max_concurrent: config.max_concurrent,
        }
    }
}

impl MaterializeOptions {
    /// Deterministic destination key for a post id.
    pub fn destination_key(&self, id: Option<&str>, role: MediaRole) -> String {
        let token = match id.map(sanitize_key_segment).filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => match role {
                MediaRole::Parent => UNKNOWN_PARENT.to_string(),
                MediaRole::Child => UNKNOWN_CHILD.to_string(),
            },
        };
        let prefix = self.key_prefix.trim_matches('/');
        let extension = self.extension.trim_start_matches('.');
        if prefix.is_empty() {
            format!("{token}.{extension}")
        } else {
            format!("{prefix}/{token}.{extension}")
        }
    }
}

/// An upload that fell back to the source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub post_id: Option<String>,
    pub role: MediaRole,
    pub source_url: String,
    pub destination_key: String,
    pub error: TransferError,
}

/// Side-channel report of a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Items now served from the object store
    pub uploaded: usize,
    /// Items with no image to mirror
    pub missing_source: usize,
    /// Items served from their source URL after a failed upload
    pub failures: Vec<TransferFailure>,
}

impl MaterializeReport {
    pub fn total(&self) -> usize {
        self.uploaded + self.missing_source + self.failures.len()
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Uploaded(_) => self.uploaded += 1,
            Outcome::NoSource => self.missing_source += 1,
            Outcome::Fallback(failure) => self.failures.push(failure.clone()),
        }
    }
}

/// Posts with `proxy_image` populated, plus what happened along the way.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub posts: Vec<NormalizedPost>,
    pub report: MaterializeReport,
}

#[derive(Debug, Clone)]
enum Outcome {
    Uploaded(String),
    NoSource,
    Fallback(TransferFailure),
}

impl Outcome {
    fn proxy_image(&self) -> Option<String> {
        match self {
            Outcome::Uploaded(url) => Some(url.clone()),
            Outcome::NoSource => None,
            Outcome::Fallback(failure) => Some(failure.source_url.clone()),
        }
    }
}

/// Mirror every post and child image through `uploader`.
///
/// Returns new posts; the input is consumed, never re-normalized. Up to
/// `options.max_concurrent` uploads run at once and results are written back
/// in input order, so child order is preserved.
pub async fn materialize<U: Uploader + ?Sized>(
    posts: Vec<NormalizedPost>,
    uploader: &U,
    options: &MaterializeOptions,
) -> Materialized {
    let jobs: Vec<(Option<&str>, MediaRole, Option<&str>)> = posts
        .iter()
        .flat_map(|p| {
            std::iter::once(job(&p.post, MediaRole::Parent))
                .chain(p.child_posts.iter().map(|c| job(&c.post, MediaRole::Child)))
        })
        .collect();

    let outcomes: Vec<Outcome> = stream::iter(jobs)
        .map(|(id, role, source)| async move {
            match source {
                Some(source) => upload_one(uploader, options, id, role, source).await,
                None => Outcome::NoSource,
            }
        })
        .buffered(options.max_concurrent.max(1))
        .collect()
        .await;

    let mut report = MaterializeReport::default();
    let mut outcomes = outcomes.into_iter();
    let mut materialized = Vec::with_capacity(posts.len());
    for mut post in posts {
        post.proxy_image = next_proxy(&mut outcomes, &mut report);
        for child in &mut post.child_posts {
            child.proxy_image = next_proxy(&mut outcomes, &mut report);
        }
        materialized.push(post);
    }

    Materialized {
        posts: materialized,
        report,
    }
}

/// Take the next outcome in job order and record it.
fn next_proxy(
    outcomes: &mut impl Iterator<Item = Outcome>,
    report: &mut MaterializeReport,
) -> Option<String> {
    let outcome = outcomes.next().unwrap_or(Outcome::NoSource);
    report.record(&outcome);
    outcome.proxy_image()
}

fn job(post: &RawPost, role: MediaRole) -> (Option<&str>, MediaRole, Option<&str>) {
    (post.id(), role, post.source_image())
}

async fn upload_one<U: Uploader + ?Sized>(
    uploader: &U,
    options: &MaterializeOptions,
    id: Option<&str>,
    role: MediaRole,
    source: &str,
) -> Outcome {
    let key = options.destination_key(id, role);
    match uploader.upload(source, &key).await {
        Ok(url) => {
            log::debug!("Mirrored {} -> {}", source, url);
            Outcome::Uploaded(url)
        }
        Err(error) => {
            let kind = match role {
                MediaRole::Parent => "post",
                MediaRole::Child => "child post",
            };
            log::warn!(
                "Error uploading image for {} {}: {}. Using source URL.",
                kind,
                id.unwrap_or("<no id>"),
                error
            );
            Outcome::Fallback(TransferFailure {
                post_id: id.map(str::to_string),
                role,
                source_url: source.to_string(),
                destination_key: key,
                error,
            })
        }
    }
}
