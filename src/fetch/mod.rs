//! Local side of a download: choosing files, placing them, and measuring the result.

mod report;

pub use report::{format_size, DownloadReport};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use walkdir::WalkDir;

use crate::error::HubfetchError;
use crate::hub::{RepositoryClient, SnapshotRequest};

/// Staging cache created inside the target directory when no cache dir is configured.
pub const STAGING_DIR: &str = ".hubfetch-cache";

/// Keep the remote paths that live under `subpath` (all of them when empty).
///
/// A subpath naming a single file (`config.json/`) keeps that file.
pub fn filter_by_subpath(files: &[String], subpath: &str) -> Vec<String> {
    let file = subpath.trim_end_matches('/');
    files
        .iter()
        .filter(|path| path.starts_with(subpath) || (!file.is_empty() && path.as_str() == file))
        .cloned()
        .collect()
}

/// Reject remote paths that would land outside the target directory.
pub fn safe_relative(relative: &str) -> Result<&Path, HubfetchError> {
    let path = Path::new(relative);
    let plain = path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(HubfetchError::UnsafePath {
            path: relative.to_string(),
        })
    }
}

/// Copy a cached file to `local_dir/relative`.
///
/// hf-hub snapshot entries are symlinks into the blob store, so the content
/// is copied rather than moved. An existing destination is left untouched.
pub fn materialize(
    cached: &Path,
    local_dir: &Path,
    relative: &str,
) -> Result<PathBuf, HubfetchError> {
    let dest = local_dir.join(safe_relative(relative)?);
    if dest.exists() {
        tracing::debug!(path = %dest.display(), "keeping existing file");
        return Ok(dest);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(cached, &dest)?;
    Ok(dest)
}

/// Cache directory for one download.
///
/// Without a configured cache dir this is [`STAGING_DIR`] inside the target,
/// removed when the guard drops, whether the download succeeded or not.
pub struct StagingCache {
    root: PathBuf,
    owned: bool,
}

impl StagingCache {
    pub fn new(local_dir: &Path, cache_dir: Option<&Path>) -> Self {
        match cache_dir {
            Some(dir) => Self {
                root: dir.to_path_buf(),
                owned: false,
            },
            None => Self {
                root: local_dir.join(STAGING_DIR),
                owned: true,
            },
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for StagingCache {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.root.display(),
                %err,
                "could not remove staging cache"
            ),
        }
    }
}

/// Select the files of `request`, fetch each through `download` and copy it
/// into `request.local_dir`.
///
/// `download` receives the cache root and a remote path and returns the
/// cached file. The staging cache is gone by the time this returns.
pub fn place_snapshot<D>(
    request: &SnapshotRequest,
    files: &[String],
    cache_dir: Option<&Path>,
    mut download: D,
) -> Result<PathBuf, HubfetchError>
where
    D: FnMut(&Path, &str) -> Result<PathBuf, HubfetchError>,
{
    let selected = filter_by_subpath(files, &request.subpath);
    if selected.is_empty() {
        return Err(HubfetchError::TransferFailed {
            repo_id: request.repo_id.clone(),
            message: format!(
                "no files match '{}' at revision '{}'",
                request.subpath, request.revision
            ),
        });
    }
    for remote_path in &selected {
        safe_relative(remote_path)?;
    }

    fs::create_dir_all(&request.local_dir)?;
    let staging = StagingCache::new(&request.local_dir, cache_dir);

    for remote_path in &selected {
        tracing::info!(repo_id = %request.repo_id, file = %remote_path, "downloading");
        let cached = download(staging.root(), remote_path)?;
        materialize(&cached, &request.local_dir, remote_path)?;
    }

    Ok(request.local_dir.clone())
}

/// Total size in bytes and number of regular files below `path`.
pub fn dir_size_and_count(path: &Path) -> (u64, usize) {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .fold((0, 0), |(bytes, count), entry| {
            let len = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            (bytes + len, count + 1)
        })
}

/// Like [`dir_size_and_count`] but restricted to `subpath` inside `root`.
///
/// A subpath naming a single file reports that file; a missing one reports
/// nothing.
pub fn subpath_size_and_count(root: &Path, subpath: &str) -> (u64, usize) {
    let trimmed = subpath.trim_matches('/');
    if trimmed.is_empty() {
        return dir_size_and_count(root);
    }

    let target = root.join(trimmed);
    if target.is_file() {
        let len = fs::metadata(&target).map(|meta| meta.len()).unwrap_or(0);
        (len, 1)
    } else if target.is_dir() {
        dir_size_and_count(&target)
    } else {
        (0, 0)
    }
}

/// Run a snapshot download through `client` and summarize what landed on disk.
pub fn download_with_report<C: RepositoryClient>(
    client: &C,
    request: &SnapshotRequest,
) -> Result<DownloadReport, HubfetchError> {
    let started_at = Local::now();
    let clock = Instant::now();

    let path = client.download_snapshot(request)?;

    let (total_bytes, file_count) = subpath_size_and_count(&path, &request.subpath);
    tracing::info!(
        repo_id = %request.repo_id,
        files = file_count,
        bytes = total_bytes,
        "download finished"
    );

    Ok(DownloadReport {
        path,
        file_count,
        total_bytes,
        started_at,
        finished_at: Local::now(),
        elapsed: clock.elapsed(),
    })
}
