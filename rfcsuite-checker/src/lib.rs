//! Command-line validator for RFC 2544/2889 benchmark suite files.
//!
//! * [`config`] - CLI parsing, logging setup and suite source selection
//! * [`loader`] - Discovery and parsing of `.json5` suite files
//! * [`report`] - Per-suite verdicts, text/JSON rendering and exit status

pub mod config;
pub mod loader;
pub mod report;
