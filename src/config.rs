//! Runtime settings, read from command-line flags with environment fallbacks.

use std::path::PathBuf;

use crate::hub::CANONICAL_ENDPOINT;

/// Global options shared by every subcommand.
#[derive(clap::Args, Clone, Debug)]
pub struct SettingsArgs {
    /// Hub endpoint used for model and dataset lookups.
    #[arg(long, env = "HF_ENDPOINT", default_value = CANONICAL_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Access token for private or gated repositories.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Directory that receives one folder per downloaded repository.
    #[arg(long, env = "HUBFETCH_OUTPUT_DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Persistent hf-hub cache. Without it a temporary cache inside the
    /// target folder is used and removed afterwards.
    #[arg(long, env = "HUBFETCH_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Disable per-file progress bars.
    #[arg(long, global = true)]
    pub no_progress: bool,
}

/// Resolved settings handed to the client and the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Base URL without a trailing `/`.
    pub endpoint: String,
    pub token: Option<String>,
    pub output_dir: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: CANONICAL_ENDPOINT.to_string(),
            token: None,
            output_dir: PathBuf::from("."),
            cache_dir: None,
            progress: true,
        }
    }
}

impl From<SettingsArgs> for Settings {
    fn from(args: SettingsArgs) -> Self {
        let endpoint = args.endpoint.trim().trim_end_matches('/');
        Self {
            endpoint: if endpoint.is_empty() {
                CANONICAL_ENDPOINT.to_string()
            } else {
                endpoint.to_string()
            },
            token: args.token.filter(|token| !token.trim().is_empty()),
            output_dir: args.output_dir,
            cache_dir: args.cache_dir,
            progress: !args.no_progress,
        }
    }
}

impl Settings {
    /// Folder a repository is downloaded into: `<output_dir>/<name>`.
    pub fn target_dir(&self, repo_name: &str) -> PathBuf {
        self.output_dir.join(repo_name)
    }
}
