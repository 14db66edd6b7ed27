//! Configuration model and validation core for RFC 2544/2889 benchmark suites.
//!
//! A suite describes the tester ports, the protocol header stacks they send,
//! the frame sizes to sweep and the benchmarks to run. This crate turns a
//! suite file into a typed [`TestSuiteConfiguration`] and checks it before
//! any traffic is generated.
//!
//! # Key Components
//!
//! * [`field`] - MAC, IP, prefix and bit-string value types
//! * [`protocol`] - Protocol segment profiles and per-port binding
//! * [`port`] - Port declarations and their resolved TX/RX state
//! * [`frame_size`] - Frame size sweeps and the mixed-size distribution
//! * [`test_types`] - One configuration per benchmark, with port roles
//! * [`suite`] - The suite model and its ordered validation passes
//! * [`suite_json`] - JSON5 suite files
//! * [`capabilities`] - Checks against what each tester port reports
//! * [`allocator`] - Test payload id allocation
//! * [`statistics`] - Per-port counters and latency/jitter aggregation
//!
//! # Validation Flow
//!
//! ```text
//! suite file ──► parse_suite ──► TestSuiteConfiguration
//!                                       │ validate()
//!                                       ▼
//!                                ValidatedSuite ──► check_capabilities(caps)
//!                                       │
//!                                       ├──► traffic_pairs()
//!                                       └──► allocator() ──► TPLD ids
//! ```

pub mod allocator;
pub mod capabilities;
pub mod constants;
pub mod errors;
pub mod field;
pub mod frame_size;
pub mod port;
pub mod protocol;
pub mod statistics;
pub mod suite;
pub mod suite_json;
pub mod test_types;

pub use allocator::TpldIdAllocator;
pub use capabilities::{PortCapabilities, TestPort};
pub use constants::{TestTopology, TestType, TidAllocationScope, TrafficDirection};
pub use errors::{ConfigError, ConfigResult, SuiteParseError};
pub use port::{PortConfiguration, PortIdentity, ResolvedPort};
pub use protocol::{ProfileRegistry, ProtocolSegmentProfile, SegmentType};
pub use statistics::{DelayReducer, SharedStatistics, StatisticsData};
pub use suite::{ExecutionSettings, TestSuiteConfiguration, ValidatedSuite};
pub use suite_json::{parse_suite, parse_suite_file};
pub use test_types::TestTypeConfig;
