//! Interactive download session.
//!
//! Repeatedly asks for a repository, shows its details, lets the user pick a
//! revision and subfolder, previews the file count and downloads on
//! confirmation. Uses dialoguer for terminal prompts.

use std::io::{self, Write};

use dialoguer::{theme::ColorfulTheme, Input};

use crate::config::Settings;
use crate::error::HubfetchError;
use crate::fetch;
use crate::hub::{
    normalize_subpath, resolve_or_literal, RepoTypeDetector, RepositoryClient,
    RepositoryReference, SnapshotRequest, DEFAULT_REVISION,
};

/// Source of user answers.
pub trait Prompter {
    /// Ask for one line of text. When `default` is given, empty input yields it.
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, HubfetchError>;
}

/// [`Prompter`] reading from the terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, HubfetchError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }
}

const HELP: &str = "\
==== Help ====
1. Enter a repository id such as owner/name, optionally followed by a subfolder.
2. Or paste a repository URL, e.g. https://huggingface.co/owner/name/tree/main/onnx.
3. Enter ? or help to show this message.
4. Press Enter on an empty line to quit.
";

fn is_help(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "?" | "\u{ff1f}" | "h" | "help")
}

/// What the user decided at the preview step.
enum Preview {
    Download(Vec<String>),
    Cancelled,
}

/// The prompt loop around resolve, detect, list and download.
pub struct Session<C, P, W = io::Stdout> {
    detector: RepoTypeDetector<C>,
    settings: Settings,
    prompter: P,
    out: W,
}

impl<C: RepositoryClient, P: Prompter, W: Write> Session<C, P, W> {
    pub fn new(detector: RepoTypeDetector<C>, settings: Settings, prompter: P, out: W) -> Self {
        Self {
            detector,
            settings,
            prompter,
            out,
        }
    }

    /// End the session, keeping the detector and its cache.
    pub fn into_detector(self) -> RepoTypeDetector<C> {
        self.detector
    }

    /// Run until the user enters an empty repository name.
    ///
    /// Lookup and transfer failures are reported and the loop continues;
    /// only prompt and output errors end the session early.
    pub fn run(&mut self) -> Result<(), HubfetchError> {
        writeln!(self.out, "==== Hugging Face downloader ====")?;
        writeln!(self.out, "Enter ? or h for help.")?;

        loop {
            let input = self
                .prompter
                .ask("Repository id or URL (empty to quit)", None)?;
            let input = input.trim();
            if input.is_empty() {
                writeln!(self.out, "Goodbye!")?;
                return Ok(());
            }
            if is_help(input) {
                self.out.write_all(HELP.as_bytes())?;
                continue;
            }

            match self.handle(input) {
                Ok(()) => {}
                Err(err @ (HubfetchError::Prompt(_) | HubfetchError::Io(_))) => return Err(err),
                Err(err) => {
                    tracing::error!(error = %err, "request failed");
                    writeln!(self.out, "Error: {err}")?;
                }
            }
        }
    }

    fn handle(&mut self, input: &str) -> Result<(), HubfetchError> {
        let reference = resolve_or_literal(input);
        writeln!(self.out, "Looking up {}...", reference.id)?;

        let classification = match self.detector.detect(&reference.id) {
            Ok(found) => found,
            Err(HubfetchError::NotFound { .. }) => {
                writeln!(
                    self.out,
                    "Repository '{}' not found. Check the name and try again.",
                    reference.id
                )?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        write!(
            self.out,
            "{}",
            classification.metadata.details(
                &reference.id,
                classification.kind,
                &classification.api_endpoint
            )
        )?;

        let local_dir = self.settings.target_dir(reference.name());
        writeln!(self.out, "Download folder: {}", local_dir.display())?;

        let revision = self
            .prompter
            .ask("Branch, tag or commit", Some(DEFAULT_REVISION))?;
        let revision = if revision.is_empty() {
            DEFAULT_REVISION.to_string()
        } else {
            revision
        };

        let mut request = SnapshotRequest {
            repo_id: reference.id.clone(),
            kind: classification.kind,
            revision,
            endpoint: classification.api_endpoint.clone(),
            local_dir,
            subpath: self.ask_subpath(&reference)?,
        };

        let files = match self.preview(&mut request)? {
            Preview::Download(files) => files,
            Preview::Cancelled => {
                writeln!(self.out, "Cancelled, back to the main prompt.")?;
                return Ok(());
            }
        };

        if files.is_empty() {
            writeln!(self.out, "No files match '{}'.", request.subpath)?;
            return Ok(());
        }

        writeln!(self.out, "Starting download...")?;
        let report = fetch::download_with_report(self.detector.client(), &request)?;
        write!(self.out, "{report}")?;
        Ok(())
    }

    fn ask_subpath(&mut self, reference: &RepositoryReference) -> Result<String, HubfetchError> {
        let default = (!reference.subpath.is_empty()).then_some(reference.subpath.as_str());
        let answer = self
            .prompter
            .ask("Subfolder or file to download (empty for everything)", default)?;
        Ok(normalize_subpath(&answer))
    }

    /// Show how many files match, and let the user confirm, cancel or pick another path.
    fn preview(&mut self, request: &mut SnapshotRequest) -> Result<Preview, HubfetchError> {
        loop {
            writeln!(self.out, "Counting files to download...")?;
            let listed = self.matching_files(request);
            match &listed {
                Ok(files) => writeln!(self.out, "Files to download: {}", files.len())?,
                Err(err) => writeln!(
                    self.out,
                    "Could not preview the file list ({err}); totals are shown after download."
                )?,
            }

            let answer = self.prompter.ask(
                "Download? (Enter or y to confirm, n to cancel, or type another path)",
                None,
            )?;
            match answer.trim() {
                "" | "y" | "Y" => {
                    // A failed preview is listed again; its error ends this request.
                    let files = match listed {
                        Ok(files) => files,
                        Err(_) => self.matching_files(request)?,
                    };
                    return Ok(Preview::Download(files));
                }
                "n" | "N" => return Ok(Preview::Cancelled),
                other => request.subpath = normalize_subpath(other),
            }
        }
    }

    fn matching_files(&self, request: &SnapshotRequest) -> Result<Vec<String>, HubfetchError> {
        let files = self.detector.client().list_files(
            &request.repo_id,
            request.kind,
            &request.revision,
            &request.endpoint,
        )?;
        Ok(fetch::filter_by_subpath(&files, &request.subpath))
    }
}
