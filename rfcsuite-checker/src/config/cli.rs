//! CLI argument parsing for the suite checker.
//!
//! Parsing uses the clap builder API and produces a plain [`CliConfig`] that
//! the rest of the configuration layer consumes.

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

/// CLI configuration structure containing all parsed command line arguments
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub verbose: bool,
    pub json: bool,
    pub files: Vec<String>,
    pub suite_dirs: Vec<String>,
    pub no_default_suites: bool,
}

impl CliConfig {
    /// Parse CLI arguments and create CliConfig
    pub fn from_args() -> Result<Self> {
        let matches = Self::build_cli().get_matches();
        Self::from_matches(&matches)
    }

    /// Create CliConfig from pre-parsed ArgMatches (useful for testing)
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let verbose = matches.get_flag("verbose");
        let json = matches.get_flag("json");
        let no_default_suites = matches.get_flag("no-default-suites");

        let files: Vec<String> = matches
            .get_many::<String>("files")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();

        let suite_dirs: Vec<String> = matches
            .get_many::<String>("suite-dir")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            verbose,
            json,
            files,
            suite_dirs,
            no_default_suites,
        })
    }

    /// Build the clap Command structure
    pub fn build_cli() -> Command {
        Command::new("rfcsuite-checker")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Validate RFC 2544/2889 benchmark suite files")
            .long_about("Loads JSON5 benchmark suite files, runs every configuration check on them \
                       and reports which suites are ready to run. Exits with 0 when all suites are \
                       valid, 1 when any suite is rejected or cannot be parsed, 2 when no suite was found.")
            .arg(
                Arg::new("files")
                    .value_name("FILE")
                    .num_args(0..)
                    .help("Suite files to check")
                    .long_help("Suite files to check. When given, directory discovery is skipped \
                              and only these files are loaded."),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue)
                    .help("Enable verbose logging")
                    .long_help("Enable debug logging, including every validation pass run on each suite."),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(clap::ArgAction::SetTrue)
                    .help("Print the report as JSON"),
            )
            .arg(
                Arg::new("suite-dir")
                    .long("suite-dir")
                    .value_name("DIRECTORY")
                    .action(clap::ArgAction::Append)
                    .help("Additional directory to load suite files from")
                    .long_help("Additional directory to scan for .json5 suite files. \
                              Can be specified multiple times. Directories are scanned in order \
                              with later ones taking priority (can override suites with same ID). \
                              Default directories: ~/.config/rfcsuite/suites, ./suites"),
            )
            .arg(
                Arg::new("no-default-suites")
                    .long("no-default-suites")
                    .action(clap::ArgAction::SetTrue)
                    .help("Disable loading suites from default directories")
                    .long_help("Disable automatic loading of suites from default directories \
                              (~/.config/rfcsuite/suites, ./suites). \
                              Only suites from explicitly specified --suite-dir will be loaded."),
            )
    }

    /// Validate CLI configuration
    pub fn validate(&self) -> Result<()> {
        if self.files.iter().chain(&self.suite_dirs).any(|p| p.trim().is_empty()) {
            return Err(anyhow::anyhow!("Suite paths cannot be empty"));
        }
        Ok(())
    }
}
