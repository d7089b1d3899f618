use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HubfetchError;

use super::client::RepositoryClient;
use super::{ProbeFailure, RepoKind, RepoMetadata, CANONICAL_ENDPOINT};

/// Kinds probed against the configured endpoint, in order.
const ENDPOINT_PROBE_ORDER: [RepoKind; 2] = [RepoKind::Model, RepoKind::Dataset];

/// Result of a successful detection.
#[derive(Clone, Debug, PartialEq)]
pub struct RepositoryClassification {
    pub kind: RepoKind,
    pub metadata: RepoMetadata,
    /// Base URL that answered the probe.
    pub api_endpoint: String,
}

/// Session-scoped map from repository id to its classification.
///
/// Entries are inserted on success only and never refreshed.
#[derive(Debug, Default)]
pub struct DetectionCache {
    entries: Mutex<HashMap<String, Arc<RepositoryClassification>>>,
}

impl DetectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repo_id: &str) -> Option<Arc<RepositoryClassification>> {
        self.entries().get(repo_id).cloned()
    }

    pub fn insert(
        &self,
        repo_id: &str,
        classification: RepositoryClassification,
    ) -> Arc<RepositoryClassification> {
        let shared = Arc::new(classification);
        self.entries().insert(repo_id.to_string(), Arc::clone(&shared));
        shared
    }

    pub fn contains(&self, repo_id: &str) -> bool {
        self.entries().contains_key(repo_id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<RepositoryClassification>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Classifies repository ids as model, dataset or space.
///
/// Models and datasets are probed on the configured endpoint; spaces are
/// always probed on [`CANONICAL_ENDPOINT`], so a private mirror that hosts
/// spaces will not be consulted for them.
pub struct RepoTypeDetector<C> {
    client: C,
    endpoint: String,
    cache: DetectionCache,
}

impl<C: RepositoryClient> RepoTypeDetector<C> {
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        Self::with_cache(client, endpoint, DetectionCache::new())
    }

    pub fn with_cache(client: C, endpoint: impl Into<String>, cache: DetectionCache) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cache,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    pub fn cache(&self) -> &DetectionCache {
        &self.cache
    }

    /// Classify `repo_id`, consulting the cache first.
    ///
    /// Individual probe failures are logged and skipped. Only when model,
    /// dataset and space all fail is `HubfetchError::NotFound` returned, and
    /// nothing is cached in that case.
    pub fn detect(&self, repo_id: &str) -> Result<Arc<RepositoryClassification>, HubfetchError> {
        if let Some(hit) = self.cache.get(repo_id) {
            tracing::debug!(repo_id, kind = %hit.kind, "detection cache hit");
            return Ok(hit);
        }

        let mut attempts = Vec::with_capacity(3);

        for kind in ENDPOINT_PROBE_ORDER {
            match self.client.probe_repo_info(repo_id, kind, &self.endpoint) {
                Ok(metadata) => {
                    return Ok(self.remember(repo_id, kind, metadata, &self.endpoint));
                }
                Err(err) => attempts.push(probe_failed(repo_id, kind, err)),
            }
        }

        match self.client.probe_space_info(repo_id, CANONICAL_ENDPOINT) {
            Ok(metadata) => Ok(self.remember(
                repo_id,
                RepoKind::Space,
                metadata,
                CANONICAL_ENDPOINT,
            )),
            Err(err) => {
                attempts.push(probe_failed(repo_id, RepoKind::Space, err));
                Err(HubfetchError::NotFound {
                    repo_id: repo_id.to_string(),
                    attempts,
                })
            }
        }
    }

    fn remember(
        &self,
        repo_id: &str,
        kind: RepoKind,
        metadata: RepoMetadata,
        endpoint: &str,
    ) -> Arc<RepositoryClassification> {
        tracing::info!(repo_id, %kind, endpoint, "repository classified");
        self.cache.insert(
            repo_id,
            RepositoryClassification {
                kind,
                metadata,
                api_endpoint: endpoint.to_string(),
            },
        )
    }
}

fn probe_failed(repo_id: &str, kind: RepoKind, err: HubfetchError) -> ProbeFailure {
    tracing::warn!(repo_id, %kind, error = %err, "probe failed, trying next kind");
    ProbeFailure {
        kind,
        cause: err.to_string(),
    }
}
