//! Validation report for a batch of suite files.

use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use rfcsuite_shared::constants::TestType;

use crate::loader::LoadedSuite;

/// Exit status when every suite validated.
pub const EXIT_VALID: u8 = 0;
/// Exit status when any suite was rejected or could not be parsed.
pub const EXIT_INVALID: u8 = 1;
/// Exit status when no suite file was found.
pub const EXIT_NOTHING_FOUND: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuiteOutcome {
    Valid {
        enabled_test_types: Vec<TestType>,
        port_count: usize,
        traffic_pairs: Vec<(usize, usize)>,
    },
    Rejected {
        error: String,
    },
    Unparseable {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub path: PathBuf,
    pub suite_id: Option<String>,
    #[serde(flatten)]
    pub outcome: SuiteOutcome,
}

impl SuiteReport {
    /// Validate one loaded suite.
    pub fn check(loaded: LoadedSuite) -> Self {
        let LoadedSuite { path, result } = loaded;
        let suite = match result {
            Ok(suite) => suite,
            Err(e) => {
                info!("Could not parse {:?}", path);
                return Self {
                    path,
                    suite_id: None,
                    outcome: SuiteOutcome::Unparseable {
                        error: format!("{:#}", e),
                    },
                };
            }
        };

        let outcome = match suite.validate() {
            Ok(validated) => {
                debug!("Suite '{}' passed validation", suite.id);
                SuiteOutcome::Valid {
                    enabled_test_types: validated
                        .enabled_test_types()
                        .map(|t| t.test_type())
                        .collect(),
                    port_count: validated.ports().len(),
                    traffic_pairs: validated.traffic_pairs(),
                }
            }
            Err(e) => {
                info!("Suite '{}' rejected: {}", suite.id, e);
                SuiteOutcome::Rejected {
                    error: e.to_string(),
                }
            }
        };
        Self {
            path,
            suite_id: Some(suite.id),
            outcome,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, SuiteOutcome::Valid { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub valid: usize,
    pub rejected: usize,
    pub unparseable: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub suites: Vec<SuiteReport>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    pub fn from_loaded(loaded: Vec<LoadedSuite>) -> Self {
        let suites: Vec<SuiteReport> = loaded.into_iter().map(SuiteReport::check).collect();
        let mut summary = ReportSummary::default();
        for report in &suites {
            match report.outcome {
                SuiteOutcome::Valid { .. } => summary.valid += 1,
                SuiteOutcome::Rejected { .. } => summary.rejected += 1,
                SuiteOutcome::Unparseable { .. } => summary.unparseable += 1,
            }
        }
        Self { suites, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn all_valid(&self) -> bool {
        self.suites.iter().all(SuiteReport::is_valid)
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_empty() {
            EXIT_NOTHING_FOUND
        } else if self.all_valid() {
            EXIT_VALID
        } else {
            EXIT_INVALID
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One line per suite followed by the totals.
    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return "No suite files found\n".to_string();
        }
        let mut out = String::new();
        for report in &self.suites {
            let id = report.suite_id.as_deref().unwrap_or("-");
            let _ = match &report.outcome {
                SuiteOutcome::Valid {
                    enabled_test_types,
                    port_count,
                    ..
                } => writeln!(
                    out,
                    "VALID        {} ({}): {} test type(s), {} port(s)",
                    id,
                    report.path.display(),
                    enabled_test_types.len(),
                    port_count
                ),
                SuiteOutcome::Rejected { error } => writeln!(
                    out,
                    "REJECTED     {} ({}): {}",
                    id,
                    report.path.display(),
                    error
                ),
                SuiteOutcome::Unparseable { error } => {
                    writeln!(out, "UNPARSEABLE  {}: {}", report.path.display(), error)
                }
            };
        }
        let _ = writeln!(
            out,
            "{} valid, {} rejected, {} unparseable",
            self.summary.valid, self.summary.rejected, self.summary.unparseable
        );
        out
    }
}
