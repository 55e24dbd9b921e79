mod common;

use std::fs;

use clap::Parser;
use common::*;
use reloadr::cli::CliArgs;
use tempfile::tempdir;

#[tokio::test]
async fn dry_run_resolves_settings_without_building() {
    init_tracing();
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("handlers")).unwrap();
    let root = tmp.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from([
        "reloadr",
        "--dry-run",
        "--name",
        "app",
        "--build-cmd",
        "definitely-not-a-build-tool",
        "--watch-root",
        root.as_str(),
        "--build-dir",
        root.as_str(),
    ])
    .unwrap();

    with_timeout(reloadr::run(args)).await.unwrap();
}

#[tokio::test]
async fn dry_run_rejects_a_missing_watch_root() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("missing").to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from([
        "reloadr",
        "--dry-run",
        "--name",
        "app",
        "--watch-root",
        missing.as_str(),
    ])
    .unwrap();

    assert!(reloadr::run(args).await.is_err());
}
