//! Hubfetch: resolve, inspect and download Hugging Face Hub repositories.
//!
//! Hubfetch accepts a repository id or a Hub URL, works out whether it is a
//! model, dataset or space, prints its metadata and downloads all of it or a
//! subfolder into a plain local directory.
//!
//! # Modules
//!
//! - [`hub`]: input resolution, repository type detection and the Hub client
//! - [`fetch`]: local placement of downloaded files and download reports
//! - [`session`]: the interactive prompt loop
//! - [`config`]: settings from flags and environment
//! - [`error`]: error types for hubfetch operations

pub mod config;
pub mod error;
pub mod fetch;
pub mod hub;
pub mod session;

use clap::{Parser, Subcommand};

pub use config::Settings;
pub use error::HubfetchError;

use config::SettingsArgs;
use hub::{
    resolve, resolve_or_literal, HubClient, RepoTypeDetector, RepositoryClient, SnapshotRequest,
    DEFAULT_REVISION,
};
use session::{Session, TerminalPrompter};

/// The hubfetch CLI application.
#[derive(Parser)]
#[command(name = "hubfetch")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands. Without one, an interactive session starts.
#[derive(Subcommand)]
enum Commands {
    /// Show the repository id and subpath parsed from an id or URL (offline).
    Resolve(ResolveArgs),
    /// Detect the repository kind and print its metadata.
    Info(InfoArgs),
    /// List the files that would be downloaded.
    Files(FilesArgs),
    /// Download a repository, or one subfolder of it, without prompting.
    Download(DownloadArgs),
}

/// Arguments for the resolve subcommand.
#[derive(clap::Args)]
struct ResolveArgs {
    /// Repository id (owner/name[/subpath]) or Hub URL.
    input: String,
}

/// Arguments for the info subcommand.
#[derive(clap::Args)]
struct InfoArgs {
    /// Repository id or Hub URL.
    input: String,
}

/// Arguments for the files subcommand.
#[derive(clap::Args)]
struct FilesArgs {
    /// Repository id or Hub URL; a subpath in it limits the listing.
    input: String,

    /// Branch, tag or commit.
    #[arg(long, default_value = DEFAULT_REVISION)]
    revision: String,
}

/// Arguments for the download subcommand.
#[derive(clap::Args)]
struct DownloadArgs {
    /// Repository id or Hub URL.
    input: String,

    /// Branch, tag or commit.
    #[arg(long, default_value = DEFAULT_REVISION)]
    revision: String,

    /// Subfolder or file to download. Overrides a subpath found in the input.
    #[arg(long)]
    subpath: Option<String>,
}

/// Run the hubfetch CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), HubfetchError> {
    let cli = Cli::parse();
    let settings = Settings::from(cli.settings);

    match cli.command {
        None => run_interactive(settings),
        Some(Commands::Resolve(args)) => run_resolve(args),
        Some(Commands::Info(args)) => run_info(args, &settings),
        Some(Commands::Files(args)) => run_files(args, &settings),
        Some(Commands::Download(args)) => run_download(args, &settings),
    }
}

fn detector_for(settings: &Settings) -> RepoTypeDetector<HubClient> {
    RepoTypeDetector::new(HubClient::new(settings), settings.endpoint.clone())
}

fn run_interactive(settings: Settings) -> Result<(), HubfetchError> {
    let detector = detector_for(&settings);
    let mut session = Session::new(
        detector,
        settings,
        TerminalPrompter::new(),
        std::io::stdout(),
    );
    session.run()
}

fn run_resolve(args: ResolveArgs) -> Result<(), HubfetchError> {
    let reference = resolve(&args.input)?;
    println!("id: {}", reference.id);
    println!("subpath: {}", reference.subpath);
    Ok(())
}

fn run_info(args: InfoArgs, settings: &Settings) -> Result<(), HubfetchError> {
    let reference = resolve_or_literal(&args.input);
    let found = detector_for(settings).detect(&reference.id)?;
    print!(
        "{}",
        found
            .metadata
            .details(&reference.id, found.kind, &found.api_endpoint)
    );
    Ok(())
}

fn run_files(args: FilesArgs, settings: &Settings) -> Result<(), HubfetchError> {
    let reference = resolve_or_literal(&args.input);
    let detector = detector_for(settings);
    let found = detector.detect(&reference.id)?;

    let files = detector.client().list_files(
        &reference.id,
        found.kind,
        &args.revision,
        &found.api_endpoint,
    )?;
    let matching = fetch::filter_by_subpath(&files, &reference.subpath);
    for path in &matching {
        println!("{path}");
    }
    eprintln!("{} file(s)", matching.len());
    Ok(())
}

fn run_download(args: DownloadArgs, settings: &Settings) -> Result<(), HubfetchError> {
    let reference = resolve_or_literal(&args.input);
    let subpath = args
        .subpath
        .as_deref()
        .map(hub::normalize_subpath)
        .unwrap_or_else(|| reference.subpath.clone());

    let detector = detector_for(settings);
    let found = detector.detect(&reference.id)?;

    let request = SnapshotRequest {
        repo_id: reference.id.clone(),
        kind: found.kind,
        revision: args.revision,
        endpoint: found.api_endpoint.clone(),
        local_dir: settings.target_dir(reference.name()),
        subpath,
    };
    let report = fetch::download_with_report(detector.client(), &request)?;
    print!("{report}");
    Ok(())
}
