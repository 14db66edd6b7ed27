//! Configuration management for the suite checker.
//!
//! Combines CLI parsing with the derived application configuration and
//! builds the suite loader from it.

pub mod app_config;
pub mod cli;

pub use app_config::{AppConfig, LogLevel};
pub use cli::CliConfig;

use anyhow::Result;

use crate::loader::{LoadedSuite, SuiteLoader};

/// Main configuration manager that combines all configuration sources
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub app: AppConfig,
}

impl ConfigManager {
    /// Creates a new configuration manager from CLI arguments and environment
    pub fn from_cli_and_env() -> Result<Self> {
        let cli_config = CliConfig::from_args()?;
        Self::from_cli(&cli_config)
    }

    pub fn from_cli(cli_config: &CliConfig) -> Result<Self> {
        Ok(Self {
            app: AppConfig::from_cli(cli_config)?,
        })
    }

    /// Validates the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.app.validate()
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        self.app.init_logging()
    }

    /// Loader over the default directories (unless disabled) plus `--suite-dir`s.
    pub fn suite_loader(&self) -> SuiteLoader {
        let mut loader = if self.app.no_default_suites {
            SuiteLoader::with_directories(Vec::new())
        } else {
            SuiteLoader::new()
        };
        loader.add_directories(self.app.suite_dirs.iter().cloned());
        loader
    }

    /// Explicit files when given, directory discovery otherwise.
    pub fn load_suites(&self) -> Vec<LoadedSuite> {
        let loader = self.suite_loader();
        if self.app.files.is_empty() {
            loader.load_all()
        } else {
            loader.load_files(&self.app.files)
        }
    }
}
