#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;

use hubfetch::fetch;
use hubfetch::hub::{RepoKind, RepoMetadata, RepositoryClient, SnapshotRequest};
use hubfetch::session::Prompter;
use hubfetch::HubfetchError;

/// In-memory stand-in for the Hub.
#[derive(Default)]
pub struct FakeHub {
    repos: HashMap<String, (RepoKind, Vec<(String, usize)>)>,
    pub probes: RefCell<Vec<(String, RepoKind, String)>>,
    pub downloads: RefCell<Vec<SnapshotRequest>>,
    listing_fails: bool,
}

impl FakeHub {
    pub fn with_repo(mut self, repo_id: &str, kind: RepoKind, files: &[(&str, usize)]) -> Self {
        let files = files
            .iter()
            .map(|(path, size)| (path.to_string(), *size))
            .collect();
        self.repos.insert(repo_id.to_string(), (kind, files));
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    fn probe(
        &self,
        repo_id: &str,
        kind: RepoKind,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        self.probes
            .borrow_mut()
            .push((repo_id.to_string(), kind, endpoint.to_string()));
        match self.repos.get(repo_id) {
            Some((hosted, _)) if *hosted == kind => Ok(RepoMetadata {
                id: Some(repo_id.to_string()),
                author: repo_id.split('/').next().map(str::to_string),
                likes: Some(1),
                ..RepoMetadata::default()
            }),
            _ => Err(HubfetchError::HubApi {
                repo_id: repo_id.to_string(),
                message: format!("no {kind} named {repo_id}"),
            }),
        }
    }
}

impl RepositoryClient for FakeHub {
    fn probe_repo_info(
        &self,
        repo_id: &str,
        kind: RepoKind,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        self.probe(repo_id, kind, endpoint)
    }

    fn probe_space_info(
        &self,
        repo_id: &str,
        endpoint: &str,
    ) -> Result<RepoMetadata, HubfetchError> {
        self.probe(repo_id, RepoKind::Space, endpoint)
    }

    fn list_files(
        &self,
        repo_id: &str,
        _kind: RepoKind,
        _revision: &str,
        _endpoint: &str,
    ) -> Result<Vec<String>, HubfetchError> {
        if self.listing_fails {
            return Err(HubfetchError::HubApi {
                repo_id: repo_id.to_string(),
                message: "listing unavailable".to_string(),
            });
        }
        Ok(self
            .repos
            .get(repo_id)
            .map(|(_, files)| files.iter().map(|(path, _)| path.clone()).collect())
            .unwrap_or_default())
    }

    fn download_snapshot(&self, request: &SnapshotRequest) -> Result<PathBuf, HubfetchError> {
        self.downloads.borrow_mut().push(request.clone());
        let (_, files) = self
            .repos
            .get(&request.repo_id)
            .ok_or_else(|| HubfetchError::TransferFailed {
                repo_id: request.repo_id.clone(),
                message: "unknown repository".to_string(),
            })?;

        let names: Vec<String> = files.iter().map(|(path, _)| path.clone()).collect();
        for path in fetch::filter_by_subpath(&names, &request.subpath) {
            let size = files
                .iter()
                .find(|(name, _)| *name == path)
                .map(|(_, size)| *size)
                .unwrap_or(0);
            let dest = request.local_dir.join(&path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, vec![0u8; size])?;
        }
        Ok(request.local_dir.clone())
    }
}

/// Replays canned answers and records the prompts it was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<(String, Option<String>)>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for &mut ScriptedPrompter {
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, HubfetchError> {
        self.asked.push((prompt.to_string(), default.map(str::to_string)));
        let answer = self.answers.pop_front().unwrap_or_default();
        match (answer.is_empty(), default) {
            (true, Some(default)) => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }
}
