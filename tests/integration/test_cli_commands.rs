#[path = "../common/mod.rs"]
mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use true_archetype::core::store::{DocumentStore, FsStore};

/// Data directory with the catalog and empty published collections on disk.
fn world(with_published: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let store = FsStore::new(dir.path());
        store
            .create_collection(spec(SOURCE, "Class Feats"))
            .await
            .unwrap();
        store
            .create_documents(&key(SOURCE), catalog())
            .await
            .unwrap();
        if with_published {
            store
                .create_collection(spec(PUBLISHED_DEDICATIONS, "True Archetype Dedications"))
                .await
                .unwrap();
            store
                .create_collection(spec(PUBLISHED_FEATS, "True Archetype Feats"))
                .await
                .unwrap();
        }
    });
    dir
}

fn stored_names(data_dir: &Path, raw_key: &str) -> Vec<String> {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let store = FsStore::new(data_dir);
        let mut names: Vec<String> = store
            .get_documents(&key(raw_key))
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.name)
            .collect();
        names.sort();
        names
    })
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("true-archetype").unwrap();
    cmd.arg("--data-dir").arg(data_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("true-archetype").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("regenerate-dedications"))
        .stdout(predicate::str::contains("overwrite-feats"))
        .stdout(predicate::str::contains("bootstrap"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("true-archetype").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_is_an_error() {
    let mut cmd = Command::cargo_bin("true-archetype").unwrap();
    cmd.assert().failure();
}

#[test]
fn test_rebuild_publishes_both_collections() {
    let dir = world(true);

    cli(dir.path())
        .arg("rebuild")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebuild completed (12 documents written)"));

    assert_eq!(
        stored_names(dir.path(), PUBLISHED_DEDICATIONS),
        vec!["True Archetype: Fighter", "True Archetype: Wizard"]
    );
    assert_eq!(
        stored_names(dir.path(), PUBLISHED_FEATS),
        stored_names(dir.path(), WORKING_FEATS)
    );
    assert!(dir.path().join("settings.json").exists());
}

#[test]
fn test_regenerate_feats_without_map_fails() {
    let dir = world(false);

    cli(dir.path())
        .arg("regenerate-feats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No dedication map found"))
        .stderr(predicate::str::contains(
            "regenerate-feats did not complete: aborted (MissingPrecondition)",
        ));

    assert!(!dir
        .path()
        .join("packs/world/temporary-true-archetype-feats.json")
        .exists());
}

#[test]
fn test_step_by_step_flow() {
    let dir = world(true);

    cli(dir.path())
        .arg("regenerate-dedications")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported and processed 2 Multiclass Dedications into True Archetypes.",
        ));
    cli(dir.path()).arg("regenerate-feats").assert().success();
    cli(dir.path()).arg("overwrite-feats").assert().success();

    assert_eq!(stored_names(dir.path(), PUBLISHED_FEATS).len(), 4);
    assert!(stored_names(dir.path(), PUBLISHED_DEDICATIONS).is_empty());
}

#[test]
fn test_overwrite_without_published_collection_fails() {
    let dir = world(false);
    cli(dir.path()).arg("regenerate-dedications").assert().success();

    cli(dir.path())
        .arg("overwrite-dedications")
        .assert()
        .failure()
        .stderr(predicate::str::contains("aborted (MissingCollection)"));
}

#[test]
fn test_missing_data_dir_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nowhere");

    cli(&missing)
        .arg("rebuild")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!missing.exists());
}

#[test]
fn test_quiet_suppresses_info_output() {
    let dir = world(true);

    cli(dir.path())
        .arg("--quiet")
        .arg("rebuild")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_bootstrap_fills_published_collections() {
    let dir = world(true);

    cli(dir.path())
        .arg("bootstrap")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered 2 feat section(s)"));

    assert_eq!(stored_names(dir.path(), PUBLISHED_DEDICATIONS).len(), 2);
    let settings: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("settings.json")).unwrap())
            .unwrap();
    assert_eq!(
        settings["pf2e"]["campaignFeatSections"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_explicit_config_file_is_honoured() {
    let dir = world(true);
    let config_path = dir.path().join("custom.toml");
    fs::write(
        &config_path,
        "[selection]\nmax_extra_hops = 3\n",
    )
    .unwrap();

    cli(dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--quiet")
        .arg("rebuild")
        .assert()
        .success();

    assert_eq!(stored_names(dir.path(), PUBLISHED_FEATS).len(), 5);
}
