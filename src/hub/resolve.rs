use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use crate::error::HubfetchError;

use super::{join_subpath, RepositoryReference};

/// Hosts whose URLs we know how to take apart.
const KNOWN_HOSTS: [&str; 3] = ["huggingface.co", "www.huggingface.co", "hf-mirror.com"];

/// Collection segments that may precede `owner/name` in a URL.
const COLLECTION_PREFIXES: [&str; 2] = ["datasets", "spaces"];

/// Keywords that point at a single file at some revision.
const FILE_KEYWORDS: [&str; 3] = ["blob", "resolve", "raw"];

/// What follows `owner/name` in a repository URL.
#[derive(Clone, Debug, PartialEq, Eq)]
enum UrlShape<'a> {
    /// Nothing after the repository.
    Root,
    /// `tree/<revision>/<path..>`
    Tree { path: &'a [&'a str] },
    /// `blob|resolve|raw/<revision>/<path..>`
    File { path: &'a [&'a str] },
    /// Trailing segments without a keyword.
    Bare { path: &'a [&'a str] },
}

impl UrlShape<'_> {
    fn subpath(&self) -> String {
        match self {
            UrlShape::Root => String::new(),
            UrlShape::Tree { path } | UrlShape::File { path } | UrlShape::Bare { path } => {
                join_subpath(path.iter().copied())
            }
        }
    }
}

/// Parse user input (repo id, id with subpath, or Hub URL) into a reference.
///
/// Scheme-less input never fails. URLs must be on a known host and name an
/// `owner/name` pair; otherwise `HubfetchError::NotAUrl` is returned. Any
/// revision embedded in the URL is dropped.
pub fn resolve(input: &str) -> Result<RepositoryReference, HubfetchError> {
    let trimmed = input.trim();
    if has_url_scheme(trimmed) {
        resolve_url(trimmed)
    } else {
        Ok(resolve_direct(trimmed))
    }
}

/// Like [`resolve`], but an unrecognized URL is taken verbatim as the id.
pub fn resolve_or_literal(input: &str) -> RepositoryReference {
    resolve(input).unwrap_or_else(|err| {
        tracing::debug!(%err, "using input as a literal repository id");
        RepositoryReference::new(input.trim(), "")
    })
}

fn has_url_scheme(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn resolve_direct(input: &str) -> RepositoryReference {
    let mut segments = input.split('/');
    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            RepositoryReference {
                id: format!("{owner}/{name}"),
                subpath: join_subpath(segments),
            }
        }
        _ => RepositoryReference::new(input, ""),
    }
}

fn resolve_url(input: &str) -> Result<RepositoryReference, HubfetchError> {
    let not_a_url = |reason: String| HubfetchError::NotAUrl {
        input: input.to_string(),
        reason,
    };

    let url =
        url::Url::parse(input).map_err(|source| not_a_url(format!("invalid URL: {source}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| not_a_url("URL is missing a host".to_string()))?
        .to_ascii_lowercase();

    if !KNOWN_HOSTS.contains(&host.as_str()) {
        return Err(not_a_url(format!(
            "unknown host '{}' (expected one of: {})",
            host,
            KNOWN_HOSTS.join(", ")
        )));
    }

    let decoded: Vec<Cow<'_, str>> = url
        .path_segments()
        .map(|iter| {
            iter.filter(|seg| !seg.is_empty())
                .map(decode_segment)
                .collect()
        })
        .unwrap_or_default();
    let segments: Vec<&str> = decoded.iter().map(|seg| &**seg).collect();

    let repo_segments = match segments.as_slice() {
        [prefix, rest @ ..] if COLLECTION_PREFIXES.contains(prefix) && rest.len() >= 2 => rest,
        all => all,
    };

    let [owner, name, rest @ ..] = repo_segments else {
        return Err(not_a_url(
            "expected a repository URL like https://huggingface.co/<owner>/<name>".to_string(),
        ));
    };

    let shape = classify(rest);
    tracing::trace!(?shape, "classified repository URL");

    Ok(RepositoryReference {
        id: format!("{owner}/{name}"),
        subpath: shape.subpath(),
    })
}

/// Percent-decode a path segment; invalid UTF-8 keeps the encoded form.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

fn classify<'a>(rest: &'a [&'a str]) -> UrlShape<'a> {
    match rest {
        [] => UrlShape::Root,
        ["tree", tail @ ..] => UrlShape::Tree {
            path: tail.get(1..).unwrap_or_default(),
        },
        [keyword, tail @ ..] if FILE_KEYWORDS.contains(keyword) => UrlShape::File {
            path: tail.get(1..).unwrap_or_default(),
        },
        path => UrlShape::Bare { path },
    }
}

/// Fuzz-only entrypoint for URL shape classification.
#[cfg(feature = "fuzzing")]
pub fn fuzz_classify_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty()).collect();
    classify(&segments).subpath()
}
