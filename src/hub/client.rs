//! The remote side: metadata probes, file listing and snapshot downloads.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::Repo;

use crate::config::Settings;
use crate::error::HubfetchError;
use crate::fetch;

use super::{RepoKind, RepoMetadata};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// What to download and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub repo_id: String,
    pub kind: RepoKind,
    pub revision: String,
    pub endpoint: String,
    pub local_dir: PathBuf,
    /// Only files under this prefix are fetched; empty means everything.
    pub subpath: String,
}

/// Capabilities the rest of the crate needs from the Hub.
pub trait RepositoryClient {
    /// Fetch metadata for a model or dataset on `endpoint`.
    fn probe_repo_info(
        &self,
        repo_id: &str,
        kind: RepoKind,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError>;

    /// Fetch metadata for a space. Callers pass the canonical endpoint.
    fn probe_space_info(&self, repo_id: &str, endpoint: &str)
        -> Result<RepoMetadata, HubfetchError>;

    /// All file paths in the repository at `revision`.
    fn list_files(
        &self,
        repo_id: &str,
        kind: RepoKind,
        revision: &str,
        endpoint: &str,
    ) -> Result<Vec<String>, HubfetchError>;

    /// Materialize the matching files under `request.local_dir` and return that path.
    fn download_snapshot(&self, request: &SnapshotRequest) -> Result<PathBuf, HubfetchError>;
}

/// [`RepositoryClient`] backed by the Hub REST API and `hf-hub`.
pub struct HubClient {
    agent: ureq::Agent,
    token: Option<String>,
    cache_dir: Option<PathBuf>,
    progress: bool,
}

impl HubClient {
    pub fn new(settings: &Settings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(PROBE_TIMEOUT))
            .build();

        Self {
            agent: config.into(),
            token: settings.token.clone(),
            cache_dir: settings.cache_dir.clone(),
            progress: settings.progress,
        }
    }

    fn fetch_metadata(
        &self,
        repo_id: &str,
        kind: RepoKind,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        let url = kind.api_url(endpoint, repo_id);
        tracing::debug!(%url, "requesting repository metadata");

        let mut request = self.agent.get(&url);
        if let Some(token) = self.token.as_deref() {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let mut response = request.call().map_err(|source| api_error(repo_id, source))?;
        response
            .body_mut()
            .read_json::<RepoMetadata>()
            .map_err(|source| api_error(repo_id, source))
    }

    fn hub_repo(
        &self,
        repo_id: &str,
        kind: RepoKind,
        revision: &str,
        endpoint: &str,
        cache_dir: Option<&Path>,
    ) -> Result<ApiRepo, HubfetchError> {
        let mut builder = ApiBuilder::new()
            .with_progress(self.progress)
            .with_endpoint(endpoint.trim_end_matches('/').to_string());

        if self.token.is_some() {
            builder = builder.with_token(self.token.clone());
        }
        if let Some(dir) = cache_dir {
            builder = builder.with_cache_dir(dir.to_path_buf());
        }

        let api = builder.build().map_err(|source| api_error(repo_id, source))?;
        Ok(api.repo(Repo::with_revision(
            repo_id.to_string(),
            kind.into(),
            revision.to_string(),
        )))
    }
}

impl RepositoryClient for HubClient {
    fn probe_repo_info(
        &self,
        repo_id: &str,
        kind: RepoKind,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        self.fetch_metadata(repo_id, kind, endpoint)
    }

    fn probe_space_info(
        &self,
        repo_id: &str,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        self.fetch_metadata(repo_id, RepoKind::Space, endpoint)
    }

    fn list_files(
        &self,
        repo_id: &str,
        kind: RepoKind,
        revision: &str,
        endpoint: &str,
    ) -> Result<Vec<String>, HubfetchError> {
        let repo = self.hub_repo(repo_id, kind, revision, endpoint, self.cache_dir.as_deref())?;
        let info = repo.info().map_err(|source| api_error(repo_id, source))?;

        Ok(info
            .siblings
            .into_iter()
            .map(|sibling| sibling.rfilename)
            .collect())
    }

    fn download_snapshot(&self, request: &SnapshotRequest) -> Result<PathBuf, HubfetchError> {
        let files = self.list_files(
            &request.repo_id,
            request.kind,
            &request.revision,
            &request.endpoint,
        )?;

        let mut repo: Option<ApiRepo> = None;
        fetch::place_snapshot(
            request,
            &files,
            self.cache_dir.as_deref(),
            |cache_root, remote_path| {
                let api_repo = match repo.take() {
                    Some(api_repo) => api_repo,
                    None => self.hub_repo(
                        &request.repo_id,
                        request.kind,
                        &request.revision,
                        &request.endpoint,
                        Some(cache_root),
                    )?,
                };
                let cached = api_repo
                    .download(remote_path)
                    .map_err(|source| HubfetchError::TransferFailed {
                        repo_id: request.repo_id.clone(),
                        message: format!("'{remote_path}': {source}"),
                    });
                repo = Some(api_repo);
                cached
            },
        )
    }
}

fn api_error(repo_id: &str, source: impl fmt::Display) -> HubfetchError {
    HubfetchError::HubApi {
        repo_id: repo_id.to_string(),
        message: source.to_string(),
    }
}
