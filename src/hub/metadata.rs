//! Repository metadata as returned by the Hub API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fetch::format_size;

use super::RepoKind;

/// Shown for any field the provider did not return.
pub const UNKNOWN: &str = "-";

/// Fields we read from `/api/{models,datasets,spaces}/<id>`.
///
/// Every field is optional: spaces carry no download counts, gated repos may
/// hide storage, and mirrors drop fields freely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetadata {
    pub id: Option<String>,
    pub author: Option<String>,
    pub sha: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub downloads: Option<u64>,
    pub likes: Option<u64>,
    pub private: Option<bool>,
    /// Total bytes stored by the repository.
    pub used_storage: Option<u64>,
    pub card_data: Option<CardData>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The subset of the model/dataset card front matter we care about.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub license: Option<Value>,
}

impl RepoMetadata {
    /// License from the card, falling back to a `license:<name>` tag.
    pub fn license(&self) -> Option<String> {
        let from_card = self
            .card_data
            .as_ref()
            .and_then(|card| card.license.as_ref())
            .and_then(|value| match value {
                Value::String(name) => Some(name.clone()),
                Value::Array(names) => {
                    let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
                    (!names.is_empty()).then(|| names.join(", "))
                }
                _ => None,
            });

        from_card.or_else(|| {
            self.tags
                .iter()
                .find_map(|tag| tag.strip_prefix("license:"))
                .map(str::to_string)
        })
    }

    /// Render the details block for a classified repository.
    pub fn details<'a>(
        &'a self,
        repo_id: &'a str,
        kind: RepoKind,
        api_endpoint: &'a str,
    ) -> RepoDetails<'a> {
        RepoDetails {
            metadata: self,
            repo_id,
            kind,
            api_endpoint,
        }
    }
}

/// Terminal rendering of [`RepoMetadata`].
pub struct RepoDetails<'a> {
    metadata: &'a RepoMetadata,
    repo_id: &'a str,
    kind: RepoKind,
    api_endpoint: &'a str,
}

impl fmt::Display for RepoDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.metadata;
        let name = meta.id.as_deref().unwrap_or(self.repo_id);

        writeln!(f, "==== Repository details ====")?;
        writeln!(f, "API URL:       {}", self.kind.api_url(self.api_endpoint, name))?;
        writeln!(f, "Name:          {}", name)?;
        writeln!(f, "Kind:          {}", self.kind)?;
        writeln!(f, "SHA:           {}", or_unknown(meta.sha.as_deref()))?;
        writeln!(f, "License:       {}", or_unknown(meta.license().as_deref()))?;
        writeln!(
            f,
            "Total size:    {}",
            meta.used_storage.map(format_size).as_deref().unwrap_or(UNKNOWN)
        )?;
        writeln!(f, "Author:        {}", or_unknown(meta.author.as_deref()))?;
        writeln!(f, "Created:       {}", display_or_unknown(meta.created_at))?;
        writeln!(f, "Last modified: {}", display_or_unknown(meta.last_modified))?;
        writeln!(f, "Downloads:     {}", display_or_unknown(meta.downloads))?;
        writeln!(f, "Likes:         {}", display_or_unknown(meta.likes))?;
        writeln!(
            f,
            "Private:       {}",
            if meta.private.unwrap_or(false) { "yes" } else { "no" }
        )
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

fn display_or_unknown<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|inner| inner.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
