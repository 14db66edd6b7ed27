//! JSON5 parsing for suite files.
//!
//! Suite files list protocol profiles as an array and configure test types
//! through a keyed table; any test type present in the table is configured
//! and enabled unless it says `enabled: false`.
//!
//! Durations in the execution settings are strings in the `duration-string`
//! format: "500ms", "5s", "1m", "1m30s".

use duration_string::DurationString;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::constants::{FlowCreationType, TestTopology, TidAllocationScope, TrafficDirection};
use crate::errors::{ConfigError, SuiteParseError};
use crate::frame_size::FrameSizeConfiguration;
use crate::port::PortConfiguration;
use crate::protocol::{ProfileRegistry, ProtocolSegmentProfile};
use crate::suite::{
    ExecutionSettings, LearningConfig, MultiStreamConfig, ResetConfig, TestSuiteConfiguration,
    ToggleSyncConfig,
};
use crate::test_types::{
    AddressCachingCapacityTest, AddressLearningRateTest, BackToBackTest, BroadcastForwardingTest,
    CongestionControlTest, ErroredFramesFilteringTest, ForwardPressureTest, FrameLossRateTest,
    LatencyTest, MaxForwardingRateTest, RateTest, TestTypeConfig, ThroughputTest,
};

/// Parse a duration string like "50ms", "5s", "1m" into milliseconds.
pub fn parse_duration_string(s: &str) -> Result<u64, String> {
    let duration: DurationString = s.trim().parse().map_err(|e| format!("{}", e))?;
    let std_duration: std::time::Duration = duration.into();
    Ok(std_duration.as_millis() as u64)
}

fn duration_ms(value: Option<&str>, default_ms: u64) -> Result<u64, SuiteParseError> {
    match value {
        None => Ok(default_ms),
        Some(text) => parse_duration_string(text).map_err(|reason| SuiteParseError::Duration {
            value: text.to_string(),
            reason,
        }),
    }
}

/// Intermediate struct for JSON5 deserialization of a suite file
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: SettingsJson,
    #[serde(default)]
    pub frame_sizes: FrameSizeConfiguration,
    #[serde(default)]
    pub protocol_segments: Vec<ProtocolSegmentProfile>,
    #[serde(default)]
    pub ports: Vec<PortConfiguration>,
    #[serde(default)]
    pub test_types: TestTypesJson,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsJson {
    #[serde(default)]
    pub topology: TestTopology,
    #[serde(default)]
    pub direction: TrafficDirection,
    #[serde(default)]
    pub flow_creation_type: FlowCreationType,
    #[serde(default)]
    pub tid_allocation_scope: TidAllocationScope,
    #[serde(default)]
    pub require_ip_segment: bool,
    #[serde(default)]
    pub use_micro_tpld_on_demand: bool,
    pub payload_pattern: Option<String>,
    #[serde(default)]
    pub multi_stream: MultiStreamConfig,
    #[serde(default)]
    pub reset: ResetJson,
    #[serde(default)]
    pub learning: LearningJson,
    #[serde(default)]
    pub toggle_sync: ToggleSyncJson,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetJson {
    #[serde(default)]
    pub stop_on_los: bool,
    pub delay_after_port_reset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LearningJson {
    pub learning_rate_pct: Option<f64>,
    pub learning_duration: Option<String>,
    #[serde(default)]
    pub arp_refresh_enabled: bool,
    pub arp_refresh_period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleSyncJson {
    #[serde(default)]
    pub enabled: bool,
    pub sync_off_duration: Option<String>,
    pub delay_after_sync_on: Option<String>,
}

/// One optional entry per test type; presence means configured.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestTypesJson {
    pub throughput: Option<ThroughputTest>,
    pub latency: Option<LatencyTest>,
    pub frame_loss: Option<FrameLossRateTest>,
    pub back_to_back: Option<BackToBackTest>,
    pub rate_test: Option<RateTest>,
    pub congestion_control: Option<CongestionControlTest>,
    pub forward_pressure: Option<ForwardPressureTest>,
    pub max_forwarding_rate: Option<MaxForwardingRateTest>,
    pub address_caching_capacity: Option<AddressCachingCapacityTest>,
    pub address_learning_rate: Option<AddressLearningRateTest>,
    pub errored_frames_filtering: Option<ErroredFramesFilteringTest>,
    pub broadcast_forwarding: Option<BroadcastForwardingTest>,
}

impl TestTypesJson {
    pub fn into_test_types(self) -> Vec<TestTypeConfig> {
        [
            self.throughput.map(TestTypeConfig::Throughput),
            self.latency.map(TestTypeConfig::Latency),
            self.frame_loss.map(TestTypeConfig::FrameLoss),
            self.back_to_back.map(TestTypeConfig::BackToBack),
            self.rate_test.map(TestTypeConfig::RateTest),
            self.congestion_control.map(TestTypeConfig::CongestionControl),
            self.forward_pressure.map(TestTypeConfig::ForwardPressure),
            self.max_forwarding_rate
                .map(TestTypeConfig::MaxForwardingRate),
            self.address_caching_capacity
                .map(TestTypeConfig::AddressCachingCapacity),
            self.address_learning_rate
                .map(TestTypeConfig::AddressLearningRate),
            self.errored_frames_filtering
                .map(TestTypeConfig::ErroredFramesFiltering),
            self.broadcast_forwarding
                .map(TestTypeConfig::BroadcastForwarding),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl SettingsJson {
    pub fn to_execution_settings(self) -> Result<ExecutionSettings, SuiteParseError> {
        let defaults = ExecutionSettings::default();
        Ok(ExecutionSettings {
            topology: self.topology,
            direction: self.direction,
            flow_creation_type: self.flow_creation_type,
            tid_allocation_scope: self.tid_allocation_scope,
            require_ip_segment: self.require_ip_segment,
            use_micro_tpld_on_demand: self.use_micro_tpld_on_demand,
            payload_pattern: self.payload_pattern.unwrap_or(defaults.payload_pattern),
            multi_stream: self.multi_stream,
            reset: ResetConfig {
                stop_on_los: self.reset.stop_on_los,
                delay_after_port_reset_ms: duration_ms(
                    self.reset.delay_after_port_reset.as_deref(),
                    defaults.reset.delay_after_port_reset_ms,
                )?,
            },
            learning: LearningConfig {
                learning_rate_pct: self
                    .learning
                    .learning_rate_pct
                    .unwrap_or(defaults.learning.learning_rate_pct),
                learning_duration_ms: duration_ms(
                    self.learning.learning_duration.as_deref(),
                    defaults.learning.learning_duration_ms,
                )?,
                arp_refresh_enabled: self.learning.arp_refresh_enabled,
                arp_refresh_period_ms: duration_ms(
                    self.learning.arp_refresh_period.as_deref(),
                    defaults.learning.arp_refresh_period_ms,
                )?,
            },
            toggle_sync: ToggleSyncConfig {
                enabled: self.toggle_sync.enabled,
                sync_off_duration_ms: duration_ms(
                    self.toggle_sync.sync_off_duration.as_deref(),
                    defaults.toggle_sync.sync_off_duration_ms,
                )?,
                delay_after_sync_on_ms: duration_ms(
                    self.toggle_sync.delay_after_sync_on.as_deref(),
                    defaults.toggle_sync.delay_after_sync_on_ms,
                )?,
            },
        })
    }
}

impl SuiteFile {
    /// Convert to TestSuiteConfiguration.
    /// Fails on invalid duration strings and duplicate profile ids.
    pub fn to_suite_configuration(self) -> Result<TestSuiteConfiguration, SuiteParseError> {
        let mut protocol_segments: ProfileRegistry = BTreeMap::new();
        for profile in self.protocol_segments {
            if protocol_segments.contains_key(&profile.id) {
                return Err(ConfigError::DuplicateProfile {
                    profile_id: profile.id,
                }
                .into());
            }
            protocol_segments.insert(profile.id.clone(), profile);
        }

        Ok(TestSuiteConfiguration {
            id: self.id,
            name: self.name,
            description: self.description,
            settings: self.settings.to_execution_settings()?,
            frame_sizes: self.frame_sizes,
            protocol_segments,
            ports: self.ports,
            test_types: self.test_types.into_test_types(),
        })
    }
}

/// Parse a suite file from a JSON5 string
pub fn parse_suite_json5(json5_content: &str) -> Result<SuiteFile, SuiteParseError> {
    json5::from_str(json5_content).map_err(|e| SuiteParseError::Json5(e.to_string()))
}

/// Parse and convert a suite from a JSON5 string
pub fn parse_suite(json5_content: &str) -> Result<TestSuiteConfiguration, SuiteParseError> {
    let suite_file = parse_suite_json5(json5_content)?;
    suite_file.to_suite_configuration()
}

/// Parse a suite from a file path
pub fn parse_suite_file(path: &std::path::Path) -> Result<TestSuiteConfiguration, SuiteParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_suite(&content)
}
