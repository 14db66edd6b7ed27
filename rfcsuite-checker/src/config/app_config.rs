//! Application configuration for the suite checker.
//!
//! This module handles logging setup and the resolved set of suite sources
//! derived from the command line.

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use super::cli::CliConfig;

/// Log level enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub verbose: bool,
    pub json_output: bool,
    pub files: Vec<PathBuf>,
    pub suite_dirs: Vec<PathBuf>,
    pub no_default_suites: bool,
}

impl AppConfig {
    /// Create application configuration from CLI config
    pub fn from_cli(cli_config: &CliConfig) -> Result<Self> {
        cli_config.validate()?;

        let log_level = if cli_config.verbose {
            LogLevel::Debug
        } else {
            match env::var("RUST_LOG") {
                Ok(level_str) => Self::parse_log_level(&level_str),
                Err(_) => LogLevel::Info,
            }
        };

        Ok(Self {
            log_level,
            verbose: cli_config.verbose,
            json_output: cli_config.json,
            files: cli_config.files.iter().map(PathBuf::from).collect(),
            suite_dirs: cli_config.suite_dirs.iter().map(PathBuf::from).collect(),
            no_default_suites: cli_config.no_default_suites,
        })
    }

    /// Parse log level from string
    fn parse_log_level(level_str: &str) -> LogLevel {
        // Extract the main level from complex RUST_LOG format
        let main_level = level_str
            .split(',')
            .next()
            .unwrap_or(level_str)
            .split('=')
            .next()
            .unwrap_or(level_str)
            .to_lowercase();

        match main_level.as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    /// `--verbose` forces the level; otherwise RUST_LOG wins when set.
    fn env_filter(&self) -> EnvFilter {
        if self.verbose {
            return EnvFilter::new(self.log_level.to_filter_string());
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.to_filter_string()))
    }

    /// Initialize logging based on configuration.
    ///
    /// Logs go to stderr so a `--json` report on stdout stays machine readable.
    pub fn init_logging(&self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
            .event_format(
                tracing_subscriber::fmt::format()
                    .with_target(false)
                    .compact(),
            )
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

        tracing::debug!("Logging initialized with level: {:?}", self.log_level);
        Ok(())
    }

    /// Validate application configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = self.suite_dirs.iter().find(|d| d.is_file()) {
            return Err(anyhow::anyhow!(
                "Suite directory {:?} is a file; pass it as a positional argument instead",
                dir
            ));
        }
        Ok(())
    }
}
