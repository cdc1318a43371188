//! Conformance tests that run YAML fixtures against sift
//!
//! Run with: cargo test -p sift-test --test conformance --features sift-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use sift_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `conformance/` directory at the workspace root.
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent() // ext
        .and_then(|p| p.parent()) // workspace root
        .expect("Could not find workspace root")
        .join("conformance")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    assert!(
        dir.exists(),
        "Fixtures directory does not exist: {}",
        dir.display()
    );

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_predicates() {
    run_fixtures_in_dir(&fixtures_dir().join("01_predicates"));
}

#[test]
fn test_state() {
    run_fixtures_in_dir(&fixtures_dir().join("02_state"));
}

#[test]
fn test_candidates() {
    run_fixtures_in_dir(&fixtures_dir().join("03_candidates"));
}

#[test]
fn test_engine() {
    run_fixtures_in_dir(&fixtures_dir().join("04_engine"));
}

#[test]
fn test_session() {
    run_fixtures_in_dir(&fixtures_dir().join("05_session"));
}
