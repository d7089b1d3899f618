//! Hugging Face Hub helpers.
//!
//! This module owns everything that knows about the Hub: turning user input
//! into repository references, classifying repositories, and the client that
//! talks to the remote API. Local file bookkeeping stays in `crate::fetch`.

pub mod client;
pub mod detect;
pub mod metadata;
pub mod resolve;

use std::fmt;

pub use client::{HubClient, RepositoryClient, SnapshotRequest};
pub use detect::{DetectionCache, RepoTypeDetector, RepositoryClassification};
pub use metadata::RepoMetadata;
pub use resolve::{resolve, resolve_or_literal};

/// The public Hub endpoint. Space probes always go here.
pub const CANONICAL_ENDPOINT: &str = "https://huggingface.co";

/// Revision used when the user does not pick one.
pub const DEFAULT_REVISION: &str = "main";

/// A repository id plus an optional path prefix inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryReference {
    pub id: String,
    /// Empty, or a relative path ending in exactly one `/`.
    pub subpath: String,
}

impl RepositoryReference {
    /// Build a reference with a normalized subpath.
    pub fn new(id: impl Into<String>, subpath: &str) -> Self {
        Self {
            id: id.into(),
            subpath: normalize_subpath(subpath),
        }
    }

    /// The repository name without its owner, used for the local folder.
    pub fn name(&self) -> &str {
        repo_name(&self.id)
    }
}

/// Kind of repository hosted on the Hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepoKind {
    Model,
    Dataset,
    Space,
}

impl RepoKind {
    /// Path segment used by the REST API (`/api/<segment>/<id>`).
    pub fn api_segment(self) -> &'static str {
        match self {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
            RepoKind::Space => "spaces",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepoKind::Model => "model",
            RepoKind::Dataset => "dataset",
            RepoKind::Space => "space",
        }
    }

    /// Full API URL for a repository of this kind on `endpoint`.
    pub fn api_url(self, endpoint: &str, repo_id: &str) -> String {
        format!(
            "{}/api/{}/{}",
            endpoint.trim_end_matches('/'),
            self.api_segment(),
            repo_id
        )
    }
}

impl From<RepoKind> for hf_hub::RepoType {
    fn from(kind: RepoKind) -> Self {
        match kind {
            RepoKind::Model => hf_hub::RepoType::Model,
            RepoKind::Dataset => hf_hub::RepoType::Dataset,
            RepoKind::Space => hf_hub::RepoType::Space,
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single classification probe failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: RepoKind,
    pub cause: String,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.cause)
    }
}

/// Normalize a user-supplied subpath to `""` or `a/b/`.
///
/// Empty segments are dropped, so leading, doubled and trailing separators
/// collapse and a separator-only input becomes empty.
pub fn normalize_subpath(raw: &str) -> String {
    join_subpath(raw.split('/'))
}

pub(crate) fn join_subpath<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = segments
        .into_iter()
        .flat_map(|seg| seg.split('/'))
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join("/"))
    }
}

/// Last segment of a repository id.
pub fn repo_name(repo_id: &str) -> &str {
    repo_id
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(repo_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subpath_normalization_collapses_separators() {
        assert_eq!(normalize_subpath(""), "");
        assert_eq!(normalize_subpath("///"), "");
        assert_eq!(normalize_subpath("sub"), "sub/");
        assert_eq!(normalize_subpath("/sub//dir/"), "sub/dir/");
    }

    #[test]
    fn repo_name_is_last_segment() {
        assert_eq!(repo_name("owner/model"), "model");
        assert_eq!(repo_name("bare"), "bare");
    }

    #[test]
    fn api_url_trims_endpoint_slash() {
        assert_eq!(
            RepoKind::Dataset.api_url("https://hf-mirror.com/", "org/data"),
            "https://hf-mirror.com/api/datasets/org/data"
        );
    }
}
