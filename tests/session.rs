use hubfetch::hub::{RepoKind, RepoTypeDetector, CANONICAL_ENDPOINT};
use hubfetch::session::Session;
use hubfetch::Settings;

mod common;

use common::{FakeHub, ScriptedPrompter};

const MIRROR: &str = "https://hf-mirror.com";

fn hub() -> FakeHub {
    FakeHub::default()
        .with_repo(
            "org/model",
            RepoKind::Model,
            &[("config.json", 10), ("onnx/model.onnx", 100)],
        )
        .with_repo("org/data", RepoKind::Dataset, &[("train/part-0.parquet", 64)])
        .with_repo("org/demo", RepoKind::Space, &[("app.py", 5)])
}

struct Run {
    output: String,
    prompter: ScriptedPrompter,
    hub: FakeHub,
    _temp: tempfile::TempDir,
    root: std::path::PathBuf,
}

fn run_session(endpoint: &str, answers: &[&str]) -> Run {
    run_session_with(hub(), endpoint, answers)
}

fn run_session_with(hub: FakeHub, endpoint: &str, answers: &[&str]) -> Run {
    let temp = tempfile::tempdir().expect("create temp dir");
    let settings = Settings {
        endpoint: endpoint.to_string(),
        output_dir: temp.path().to_path_buf(),
        ..Settings::default()
    };

    let mut prompter = ScriptedPrompter::new(answers);
    let mut output = Vec::new();
    let detector = RepoTypeDetector::new(hub, endpoint);
    let mut session = Session::new(detector, settings, &mut prompter, &mut output);
    session.run().expect("session");
    let hub = session.into_detector().into_client();

    Run {
        output: String::from_utf8(output).expect("utf8 output"),
        prompter,
        hub,
        root: temp.path().to_path_buf(),
        _temp: temp,
    }
}

#[test]
fn downloads_whole_repository() {
    let run = run_session(CANONICAL_ENDPOINT, &["org/model", "", "", "y", ""]);

    assert!(run.output.contains("Kind:          model"));
    assert!(run.output.contains("Files to download: 2"));
    assert!(run.output.contains("Files:      2"));
    assert!(run.output.contains("Total size: 110.00 B"));
    assert!(run.output.contains("Goodbye!"));
    assert!(run.root.join("model").join("onnx").join("model.onnx").is_file());

    let downloads = run.hub.downloads.borrow();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].revision, "main");
    assert_eq!(downloads[0].subpath, "");
}

#[test]
fn url_subpath_is_offered_as_default() {
    let run = run_session(
        CANONICAL_ENDPOINT,
        &["https://huggingface.co/org/model/tree/main/onnx", "", "", "", ""],
    );

    let (prompt, default) = &run.prompter.asked[2];
    assert!(prompt.starts_with("Subfolder"));
    assert_eq!(default.as_deref(), Some("onnx/"));
    assert!(run.output.contains("Files to download: 1"));
    assert!(run.output.contains("Files:      1"));
    assert!(!run.root.join("model").join("config.json").exists());
}

#[test]
fn declining_returns_to_main_prompt() {
    let run = run_session(CANONICAL_ENDPOINT, &["org/model", "", "", "n", ""]);

    assert!(run.output.contains("Cancelled"));
    assert!(run.hub.downloads.borrow().is_empty());
    assert!(!run.root.join("model").exists());
}

#[test]
fn typing_a_path_at_preview_relists() {
    let run = run_session(CANONICAL_ENDPOINT, &["org/model", "", "", "onnx", "y", ""]);

    let first = run.output.find("Files to download: 2").expect("first preview");
    let second = run.output.find("Files to download: 1").expect("second preview");
    assert!(first < second);
    assert_eq!(run.hub.downloads.borrow()[0].subpath, "onnx/");
}

#[test]
fn unknown_repository_reports_and_continues() {
    let run = run_session(MIRROR, &["org/missing", "org/data", "", "", "n", ""]);

    assert!(run.output.contains("Repository 'org/missing' not found"));
    assert!(run.output.contains("Kind:          dataset"));

    let probes = run.hub.probes.borrow();
    let missing: Vec<_> = probes
        .iter()
        .filter(|(id, _, _)| id == "org/missing")
        .collect();
    assert_eq!(missing.len(), 3);
    assert_eq!(missing[2].1, RepoKind::Space);
    assert_eq!(missing[2].2, CANONICAL_ENDPOINT);
}

#[test]
fn no_matching_files_skips_download() {
    let run = run_session(CANONICAL_ENDPOINT, &["org/model", "", "nothing", "y", ""]);

    assert!(run.output.contains("Files to download: 0"));
    assert!(run.output.contains("No files match 'nothing/'"));
    assert!(run.hub.downloads.borrow().is_empty());
}

#[test]
fn repeated_lookups_use_the_cache() {
    let run = run_session(
        CANONICAL_ENDPOINT,
        &["org/model", "", "", "n", "org/model", "", "", "n", ""],
    );

    assert_eq!(run.hub.probes.borrow().len(), 1);
}

#[test]
fn space_downloads_use_canonical_endpoint() {
    let run = run_session(MIRROR, &["org/demo", "", "", "y", ""]);

    assert!(run.output.contains("Kind:          space"));
    let downloads = run.hub.downloads.borrow();
    assert_eq!(downloads[0].endpoint, CANONICAL_ENDPOINT);
    assert_eq!(downloads[0].kind, RepoKind::Space);
}

#[test]
fn dataset_downloads_use_configured_endpoint() {
    let run = run_session(MIRROR, &["org/data", "dev", "", "y", ""]);

    let downloads = run.hub.downloads.borrow();
    assert_eq!(downloads[0].endpoint, MIRROR);
    assert_eq!(downloads[0].revision, "dev");
    assert!(run.root.join("data").join("train").join("part-0.parquet").is_file());
}

#[test]
fn failed_preview_still_allows_confirming() {
    let run = run_session_with(
        hub().with_failing_listing(),
        CANONICAL_ENDPOINT,
        &["org/model", "", "", "y", ""],
    );

    assert!(run.output.contains("Could not preview the file list"));
    assert!(run.output.contains("Error: Hub API request for 'org/model' failed"));
    assert!(run.hub.downloads.borrow().is_empty());
}

#[test]
fn file_name_at_subfolder_prompt_downloads_that_file() {
    let run = run_session(CANONICAL_ENDPOINT, &["org/model", "", "config.json", "y", ""]);

    assert!(run.output.contains("Files to download: 1"));
    assert!(run.output.contains("Files:      1"));
    assert!(run.output.contains("Total size: 10.00 B"));
    assert!(run.root.join("model").join("config.json").is_file());
    assert!(!run.root.join("model").join("onnx").exists());
    assert_eq!(run.hub.downloads.borrow()[0].subpath, "config.json/");
}

#[test]
fn blob_url_selects_the_linked_file() {
    let run = run_session(
        CANONICAL_ENDPOINT,
        &["https://huggingface.co/org/model/blob/main/onnx/model.onnx", "", "", "", ""],
    );

    let (_, default) = &run.prompter.asked[2];
    assert_eq!(default.as_deref(), Some("onnx/model.onnx/"));
    assert!(run.output.contains("Files to download: 1"));
    assert!(run.root.join("model").join("onnx").join("model.onnx").is_file());
}

#[test]
fn help_is_shown_without_a_lookup() {
    for answer in ["?", "h", "HELP"] {
        let run = run_session(CANONICAL_ENDPOINT, &[answer, ""]);

        assert!(run.output.contains("==== Help ===="));
        assert!(run.output.contains("Goodbye!"));
        assert!(run.hub.probes.borrow().is_empty());
        assert_eq!(run.prompter.asked.len(), 2);
    }
}
