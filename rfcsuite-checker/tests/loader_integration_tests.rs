//! Integration tests for suite discovery and the configuration manager.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use rfcsuite_checker::config::{CliConfig, ConfigManager};
use rfcsuite_checker::report::{EXIT_INVALID, EXIT_VALID, ValidationReport};

fn suite(id: &str, peer_of_second: usize) -> String {
    format!(
        r#"{{
    id: "{id}",
    name: "{id}",
    protocol_segments: [ {{ id: "raw", segments: [ {{ segment_type: "raw_14" }} ] }} ],
    ports: [
        {{ port_slot: 0, peer_slot: 1, port_group: "east", profile_id: "raw" }},
        {{ port_slot: 1, peer_slot: {peer_of_second}, port_group: "west", profile_id: "raw" }},
    ],
    test_types: {{ throughput: {{}} }},
}}"#
    )
}

fn manager(files: Vec<PathBuf>, dirs: Vec<PathBuf>) -> ConfigManager {
    let cli = CliConfig {
        verbose: false,
        json: false,
        files: files.iter().map(|p| p.display().to_string()).collect(),
        suite_dirs: dirs.iter().map(|p| p.display().to_string()).collect(),
        no_default_suites: true,
    };
    ConfigManager::from_cli(&cli).unwrap()
}

#[test]
fn test_user_directory_overrides_broken_definition() {
    let base = TempDir::new().unwrap();
    let overlay = TempDir::new().unwrap();
    fs::write(base.path().join("lab.json5"), suite("lab", 1)).unwrap();
    fs::write(overlay.path().join("lab.json5"), suite("lab", 0)).unwrap();

    let config = manager(
        vec![],
        vec![base.path().to_path_buf(), overlay.path().to_path_buf()],
    );
    let report = ValidationReport::from_loaded(config.load_suites());

    assert_eq!(report.suites.len(), 1);
    assert!(report.suites[0].path.starts_with(overlay.path()));
    assert_eq!(report.exit_code(), EXIT_VALID);
}

#[test]
fn test_explicit_files_bypass_directories() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.json5"), suite("a", 0)).unwrap();
    let lone = dir.path().join("b.json5");
    fs::write(&lone, suite("b", 1)).unwrap();

    let config = manager(vec![lone.clone()], vec![dir.path().to_path_buf()]);
    let loaded = config.load_suites();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].path, lone);
    assert_eq!(
        ValidationReport::from_loaded(loaded).exit_code(),
        EXIT_INVALID
    );
}

#[test]
fn test_suite_dir_that_is_a_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("suite.json5");
    fs::write(&file, suite("x", 0)).unwrap();

    let config = manager(vec![], vec![file]);
    assert!(config.validate().is_err());
}
