//! Suite Loader - File-based suite loading from directories.
//!
//! Scans directories for `.json5` suite files and parses them. Unlike a
//! plain loader, files that fail to parse are kept in the result: the
//! checker has to report them, not skip them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use rfcsuite_shared::suite::TestSuiteConfiguration;
use rfcsuite_shared::suite_json::parse_suite_file;

/// Default user suite directory, relative to the home directory
pub const USER_SUITE_DIR: &str = ".config/rfcsuite/suites";

/// Default local suite directory
pub const LOCAL_SUITE_DIR: &str = "./suites";

/// One suite file and what came out of parsing it.
#[derive(Debug)]
pub struct LoadedSuite {
    pub path: PathBuf,
    pub result: Result<TestSuiteConfiguration>,
}

impl LoadedSuite {
    pub fn suite_id(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|s| s.id.as_str())
    }
}

/// Suite loader that scans directories for .json5 suite files.
///
/// Directories are scanned in priority order - later directories can override
/// suites with the same ID from earlier directories.
#[derive(Debug, Clone)]
pub struct SuiteLoader {
    /// Directories to scan, in priority order (later overrides earlier)
    directories: Vec<PathBuf>,
}

impl Default for SuiteLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteLoader {
    /// Create a new suite loader with default directories.
    ///
    /// Default directories (in priority order):
    /// 1. User: `~/.config/rfcsuite/suites`
    /// 2. Local: `./suites`
    pub fn new() -> Self {
        let mut directories = Vec::new();

        if let Some(home) = dirs::home_dir() {
            directories.push(home.join(USER_SUITE_DIR));
        }
        directories.push(PathBuf::from(LOCAL_SUITE_DIR));

        Self { directories }
    }

    /// Create a suite loader with custom directories only.
    pub fn with_directories(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    /// Add additional directories to scan (appended with highest priority).
    pub fn add_directories(&mut self, dirs: impl IntoIterator<Item = PathBuf>) {
        self.directories.extend(dirs);
    }

    /// Get the list of directories being scanned.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Load all suites from configured directories.
    ///
    /// Parsed suites are keyed by id, later directories replacing earlier
    /// ones; unparseable files follow, in scan order.
    pub fn load_all(&self) -> Vec<LoadedSuite> {
        let mut suites: BTreeMap<String, LoadedSuite> = BTreeMap::new();
        let mut failed = Vec::new();

        for dir in &self.directories {
            if !dir.exists() {
                debug!("Suite directory does not exist, skipping: {:?}", dir);
                continue;
            }

            match self.load_from_directory(dir) {
                Ok(loaded) => {
                    let count = loaded.len();
                    for suite in loaded {
                        match suite.suite_id().map(str::to_string) {
                            Some(id) => {
                                if let Some(previous) = suites.insert(id.clone(), suite) {
                                    debug!(
                                        "Suite '{}' from {:?} overrides {:?}",
                                        id, dir, previous.path
                                    );
                                }
                            }
                            None => failed.push(suite),
                        }
                    }
                    if count > 0 {
                        info!("Loaded {} suite files from {:?}", count, dir);
                    }
                }
                Err(e) => {
                    warn!("Failed to load suites from {:?}: {}", dir, e);
                }
            }
        }

        suites.into_values().chain(failed).collect()
    }

    /// Load exactly the given files, bypassing directory discovery.
    pub fn load_files(&self, paths: &[PathBuf]) -> Vec<LoadedSuite> {
        paths
            .iter()
            .map(|path| LoadedSuite {
                path: path.clone(),
                result: self.load_suite_file(path),
            })
            .collect()
    }

    /// Load suites from a single directory.
    fn load_from_directory(&self, dir: &Path) -> Result<Vec<LoadedSuite>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {:?}", dir))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("Failed to read directory entry in {:?}", dir))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json5") {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(self.load_files(&paths))
    }

    /// Load a single suite file.
    fn load_suite_file(&self, path: &Path) -> Result<TestSuiteConfiguration> {
        debug!("Loading suite from {:?}", path);

        parse_suite_file(path).with_context(|| format!("Failed to parse suite file: {:?}", path))
    }

    /// Check if any suite directories exist and contain files.
    pub fn has_suites(&self) -> bool {
        self.directories.iter().any(|dir| {
            std::fs::read_dir(dir).is_ok_and(|entries| {
                entries
                    .flatten()
                    .any(|e| e.path().extension().and_then(|e| e.to_str()) == Some("json5"))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_suite(id: &str, name: &str) -> String {
        format!(
            r#"{{
    id: "{}",
    name: "{}",
    protocol_segments: [ {{ id: "raw", segments: [ {{ segment_type: "raw_14" }} ] }} ],
    ports: [
        {{ port_slot: 0, peer_slot: 1, port_group: "east", profile_id: "raw" }},
        {{ port_slot: 1, peer_slot: 0, port_group: "west", profile_id: "raw" }},
    ],
    test_types: {{ throughput: {{ duration: 5 }} }},
}}"#,
            id, name
        )
    }

    #[test]
    fn test_loader_creation() {
        let loader = SuiteLoader::new();
        assert!(!loader.directories().is_empty());
        assert_eq!(
            loader.directories().last(),
            Some(&PathBuf::from(LOCAL_SUITE_DIR))
        );
    }

    #[test]
    fn test_loader_with_custom_directories() {
        let dirs = vec![PathBuf::from("/tmp/test1"), PathBuf::from("/tmp/test2")];
        let loader = SuiteLoader::with_directories(dirs.clone());
        assert_eq!(loader.directories(), &dirs);
    }

    #[test]
    fn test_load_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("lab.json5"),
            create_test_suite("lab-1", "Lab Suite"),
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a suite").unwrap();

        let loader = SuiteLoader::with_directories(vec![temp_dir.path().to_path_buf()]);
        let suites = loader.load_all();

        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].suite_id(), Some("lab-1"));
        assert_eq!(suites[0].result.as_ref().unwrap().name, "Lab Suite");
    }

    #[test]
    fn test_later_directory_overrides() {
        let system_dir = TempDir::new().unwrap();
        let user_dir = TempDir::new().unwrap();
        fs::write(
            system_dir.path().join("suite.json5"),
            create_test_suite("shared", "System Version"),
        )
        .unwrap();
        fs::write(
            user_dir.path().join("suite.json5"),
            create_test_suite("shared", "User Version"),
        )
        .unwrap();

        let loader = SuiteLoader::with_directories(vec![
            system_dir.path().to_path_buf(),
            user_dir.path().to_path_buf(),
        ]);
        let suites = loader.load_all();

        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].result.as_ref().unwrap().name, "User Version");
        assert!(suites[0].path.starts_with(user_dir.path()));
    }

    #[test]
    fn test_unparseable_file_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("good.json5"),
            create_test_suite("good", "Good"),
        )
        .unwrap();
        fs::write(temp_dir.path().join("broken.json5"), "{ id: ").unwrap();

        let loader = SuiteLoader::with_directories(vec![temp_dir.path().to_path_buf()]);
        let suites = loader.load_all();

        assert_eq!(suites.len(), 2);
        assert_eq!(suites[0].suite_id(), Some("good"));
        assert!(suites[1].result.is_err());
        assert!(suites[1].path.ends_with("broken.json5"));
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let loader = SuiteLoader::with_directories(vec![PathBuf::from("/nonexistent/suites")]);
        assert!(loader.load_all().is_empty());
        assert!(!loader.has_suites());
    }

    #[test]
    fn test_load_files_reports_missing_file() {
        let loader = SuiteLoader::with_directories(vec![]);
        let suites = loader.load_files(&[PathBuf::from("/nonexistent/suite.json5")]);
        assert_eq!(suites.len(), 1);
        let err = suites[0].result.as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse suite file"));
    }
}
