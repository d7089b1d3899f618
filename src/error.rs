use thiserror::Error;

use crate::hub::ProbeFailure;

/// The main error type for hubfetch operations.
#[derive(Debug, Error)]
pub enum HubfetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{input}' is not a recognized repository URL: {reason}")]
    NotAUrl { input: String, reason: String },

    #[error(
        "repository '{repo_id}' was not found as a model, dataset, or space ({})",
        describe_attempts(.attempts)
    )]
    NotFound {
        repo_id: String,
        attempts: Vec<ProbeFailure>,
    },

    #[error("Hub API request for '{repo_id}' failed: {message}")]
    HubApi { repo_id: String, message: String },

    #[error("Transfer for '{repo_id}' failed: {message}")]
    TransferFailed { repo_id: String, message: String },

    #[error("remote path '{path}' would be placed outside the download folder")]
    UnsafePath { path: String },

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

fn describe_attempts(attempts: &[ProbeFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
