//! Per-test-type configuration.
//!
//! Every supported benchmark is one variant of [`TestTypeConfig`]. Variants
//! share a [`TestCaseBase`] (enabled flag, duration, iterations, optional
//! port role handler) and add their own search, sweep and pass-criteria
//! fields. Dispatch happens in one place per concern:
//!
//! * [`TestTypeConfig::validate_options`] - numeric ranges, run for every
//!   declared variant whether enabled or not
//! * [`TestTypeConfig::role_requirement`] - the port-role shape a variant needs
//! * [`TestTypeConfig::check_configuration`] - everything an enabled variant
//!   must satisfy against the rest of the suite

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::constants::{
    AcceptableLossType, DurationType, DurationUnit, FlowCreationType, LatencyMode,
    LearningPortDMacMode, LearningSequencePortDMacMode, MAX_PACKET_LIMIT_VALUE, PortGroup,
    RateResultScope, SearchType, TestPortMacMode, TestTopology, TestType, TrafficDirection,
};
use crate::errors::{ConfigError, ConfigResult};
use crate::field::MacAddress;

fn default_true() -> bool {
    true
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::ValueOutOfRange {
            field,
            value: value.to_string(),
            range: format!("[{min}, {max}]"),
        });
    }
    Ok(())
}

/// Ordering shared by every iterative search: `minimum <= initial <= maximum`.
fn check_iteration_bounds(initial: f64, minimum: f64, maximum: f64) -> ConfigResult<()> {
    if initial > maximum {
        return Err(ConfigError::RateRestriction {
            value: initial,
            maximum,
        });
    }
    if minimum > maximum {
        return Err(ConfigError::RateRestriction {
            value: minimum,
            maximum,
        });
    }
    if initial < minimum {
        return Err(ConfigError::InitialBelowMinimum { initial, minimum });
    }
    Ok(())
}

/// Duration and repetition shared by all test types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonOptions {
    #[serde(default)]
    pub duration_type: DurationType,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub duration_unit: DurationUnit,
    #[serde(default = "default_iterations", alias = "repetition")]
    pub iterations: u32,
}

fn default_duration() -> f64 {
    30.0
}

fn default_iterations() -> u32 {
    1
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            duration_type: DurationType::Time,
            duration: default_duration(),
            duration_unit: DurationUnit::Seconds,
            iterations: default_iterations(),
        }
    }
}

impl CommonOptions {
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("duration", self.duration, 1.0, 1e9)?;
        check_range("iterations", f64::from(self.iterations), 1.0, 1e6)?;
        if self.duration_unit.is_time_unit() != self.duration_type.is_time_duration() {
            return Err(ConfigError::DurationUnitMismatch {
                unit: self.duration_unit.to_string(),
                duration_type: self.duration_type.to_string(),
            });
        }
        if !self.duration_type.is_time_duration() {
            let packets = self.actual_duration() as u64;
            if packets > MAX_PACKET_LIMIT_VALUE {
                return Err(ConfigError::PacketLimitOverflow { packets });
            }
        }
        Ok(())
    }

    /// Seconds for time durations, frame count for frame durations.
    pub fn actual_duration(&self) -> f64 {
        self.duration * self.duration_unit.scale() as f64
    }
}

/// Converging search for a rate boundary, every value in percent of line rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateIterationSpec")]
pub struct RateIterationOptions {
    pub search_type: SearchType,
    pub result_scope: RateResultScope,
    pub initial_value_pct: f64,
    pub minimum_value_pct: f64,
    pub maximum_value_pct: f64,
    pub value_resolution_pct: f64,
    pub use_pass_threshold: bool,
    pub pass_threshold_pct: f64,
}

/// Unchecked wire shape of [`RateIterationOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct RateIterationSpec {
    #[serde(default)]
    search_type: SearchType,
    #[serde(default)]
    result_scope: RateResultScope,
    #[serde(default = "hundred")]
    initial_value_pct: f64,
    #[serde(default = "tenth")]
    minimum_value_pct: f64,
    #[serde(default = "hundred")]
    maximum_value_pct: f64,
    #[serde(default = "half")]
    value_resolution_pct: f64,
    #[serde(default)]
    use_pass_threshold: bool,
    #[serde(default)]
    pass_threshold_pct: f64,
}

fn hundred() -> f64 {
    100.0
}

fn tenth() -> f64 {
    0.1
}

fn half() -> f64 {
    0.5
}

impl TryFrom<RateIterationSpec> for RateIterationOptions {
    type Error = ConfigError;

    fn try_from(spec: RateIterationSpec) -> Result<Self, Self::Error> {
        let options = Self {
            search_type: spec.search_type,
            result_scope: spec.result_scope,
            initial_value_pct: spec.initial_value_pct,
            minimum_value_pct: spec.minimum_value_pct,
            maximum_value_pct: spec.maximum_value_pct,
            value_resolution_pct: spec.value_resolution_pct,
            use_pass_threshold: spec.use_pass_threshold,
            pass_threshold_pct: spec.pass_threshold_pct,
        };
        options.validate()?;
        Ok(options)
    }
}

impl Default for RateIterationOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::BinarySearch,
            result_scope: RateResultScope::CommonResult,
            initial_value_pct: hundred(),
            minimum_value_pct: tenth(),
            maximum_value_pct: hundred(),
            value_resolution_pct: half(),
            use_pass_threshold: false,
            pass_threshold_pct: 0.0,
        }
    }
}

impl RateIterationOptions {
    pub fn new(initial: f64, minimum: f64, maximum: f64, resolution: f64) -> ConfigResult<Self> {
        let options = Self {
            initial_value_pct: initial,
            minimum_value_pct: minimum,
            maximum_value_pct: maximum,
            value_resolution_pct: resolution,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_range("initial_value_pct", self.initial_value_pct, 0.0, 100.0)?;
        check_range("minimum_value_pct", self.minimum_value_pct, 0.0, 100.0)?;
        check_range("maximum_value_pct", self.maximum_value_pct, 0.0, 100.0)?;
        check_range("value_resolution_pct", self.value_resolution_pct, 0.0, 100.0)?;
        check_range("pass_threshold_pct", self.pass_threshold_pct, 0.0, 100.0)?;
        check_iteration_bounds(
            self.initial_value_pct,
            self.minimum_value_pct,
            self.maximum_value_pct,
        )
    }
}

/// Iterative search over address counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressIterationOptions {
    pub initial_value: f64,
    pub minimum_value: f64,
    pub maximum_value: f64,
    #[serde(default = "half")]
    pub value_resolution_pct: f64,
}

impl Default for AddressIterationOptions {
    fn default() -> Self {
        Self {
            initial_value: 30_000.0,
            minimum_value: 1.0,
            maximum_value: 100_000.0,
            value_resolution_pct: half(),
        }
    }
}

impl AddressIterationOptions {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.minimum_value < 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                field: "minimum_value",
                value: self.minimum_value.to_string(),
                range: "[0, inf)".to_string(),
            });
        }
        check_range("value_resolution_pct", self.value_resolution_pct, 0.0, 100.0)?;
        check_iteration_bounds(self.initial_value, self.minimum_value, self.maximum_value)
    }
}

/// Fixed stepped sweep from `start_value` to `end_value`, end included.
///
/// Values are percent of line rate for rate sweeps and address counts for
/// address sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateSweepSpec")]
pub struct RateSweepOptions {
    pub start_value: f64,
    pub end_value: f64,
    pub step_value: f64,
}

/// Unchecked wire shape of [`RateSweepOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct RateSweepSpec {
    #[serde(alias = "start_value_pct")]
    start_value: f64,
    #[serde(alias = "end_value_pct")]
    end_value: f64,
    #[serde(alias = "step_value_pct")]
    step_value: f64,
}

impl TryFrom<RateSweepSpec> for RateSweepOptions {
    type Error = ConfigError;

    fn try_from(spec: RateSweepSpec) -> Result<Self, Self::Error> {
        Self::new(spec.start_value, spec.end_value, spec.step_value)
    }
}

impl Default for RateSweepOptions {
    fn default() -> Self {
        Self {
            start_value: 50.0,
            end_value: 100.0,
            step_value: 50.0,
        }
    }
}

impl RateSweepOptions {
    pub fn new(start: f64, end: f64, step: f64) -> ConfigResult<Self> {
        let options = Self {
            start_value: start,
            end_value: end,
            step_value: step,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.step_value <= 0.0 {
            return Err(ConfigError::StepValueRestriction);
        }
        if self.end_value < self.start_value {
            return Err(ConfigError::RangeRestriction {
                start: self.start_value,
                end: self.end_value,
            });
        }
        Ok(())
    }

    /// Every value the sweep visits; the end value is always last.
    pub fn sweep_values(&self) -> Vec<f64> {
        const EPSILON: f64 = 1e-9;
        let step = self.step_value.max(EPSILON);
        let steps = ((self.end_value - self.start_value) / step + EPSILON).floor() as usize;
        let mut values: Vec<f64> = (0..=steps)
            .map(|i| self.start_value + i as f64 * step)
            .collect();
        match values.last() {
            Some(last) if self.end_value - last > EPSILON => values.push(self.end_value),
            _ => {}
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSizeIterationOptions {
    #[serde(default = "half")]
    pub burst_resolution: f64,
    #[serde(default = "hundred")]
    pub maximum_burst: f64,
}

impl Default for BurstSizeIterationOptions {
    fn default() -> Self {
        Self {
            burst_resolution: half(),
            maximum_burst: hundred(),
        }
    }
}

impl BurstSizeIterationOptions {
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("burst_resolution", self.burst_resolution, 0.0, 100.0)?;
        check_range("maximum_burst", self.maximum_burst, 0.0, 100.0)
    }
}

/// Role one port plays in a role-counted test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRoleConfig {
    #[serde(default = "default_true")]
    pub is_used: bool,
    #[serde(default)]
    pub role: PortGroup,
    #[serde(default)]
    pub peer_port_id: String,
}

/// Used-port and per-role tallies of a [`PortRoleHandler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortRoleCounter {
    pub enabled: usize,
    by_roles: HashMap<PortGroup, usize>,
}

impl PortRoleCounter {
    pub fn read(&self, role: PortGroup) -> usize {
        self.by_roles.get(&role).copied().unwrap_or(0)
    }
}

/// Port identifier -> role assignment for one test.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortRoleHandler {
    #[serde(default)]
    pub role_map: BTreeMap<String, PortRoleConfig>,
}

impl PortRoleHandler {
    pub fn used_roles(&self) -> impl Iterator<Item = (&String, &PortRoleConfig)> {
        self.role_map.iter().filter(|(_, config)| config.is_used)
    }

    /// Count of used ports and of used ports per role.
    pub fn role_counter(&self) -> PortRoleCounter {
        let mut counter = PortRoleCounter::default();
        for (_, config) in self.used_roles() {
            counter.enabled += 1;
            *counter.by_roles.entry(config.role).or_default() += 1;
        }
        counter
    }
}

/// Port-role shape a test type needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Ports are validated by the suite-level group topology.
    GroupTopology,
    /// Exactly `source` source ports and `destination` destination ports.
    SourceDestination { source: usize, destination: usize },
    /// One learning, one monitoring and one test port.
    AddressTriad,
    /// At least two ports, one source and one or more destinations.
    Broadcast,
    /// Checked per rate sub-test.
    RateSubTests,
}

impl RoleRequirement {
    pub fn check(&self, handler: &PortRoleHandler) -> ConfigResult<()> {
        let counter = handler.role_counter();
        match *self {
            RoleRequirement::GroupTopology | RoleRequirement::RateSubTests => Ok(()),
            RoleRequirement::SourceDestination {
                source,
                destination,
            } => {
                if counter.enabled != source + destination {
                    return Err(ConfigError::PortRoleEnabledNotEnough {
                        required: source + destination,
                        actual: counter.enabled,
                    });
                }
                exact(&counter, PortGroup::Source, source)?;
                exact(&counter, PortGroup::Destination, destination)
            }
            RoleRequirement::AddressTriad => {
                if counter.enabled != 3 {
                    return Err(ConfigError::PortRoleEnabledNotEnough {
                        required: 3,
                        actual: counter.enabled,
                    });
                }
                exact(&counter, PortGroup::LearningPort, 1)?;
                exact(&counter, PortGroup::MonitoringPort, 1)?;
                exact(&counter, PortGroup::TestPort, 1)
            }
            RoleRequirement::Broadcast => {
                if counter.enabled < 2 {
                    return Err(ConfigError::PortConfigNotEnough { required: 2 });
                }
                exact(&counter, PortGroup::Source, 1)?;
                let destinations = counter.read(PortGroup::Destination);
                if destinations < 1 {
                    return Err(ConfigError::PortRoleNotEnoughAtLeast {
                        role: PortGroup::Destination,
                        required: 1,
                        actual: destinations,
                    });
                }
                Ok(())
            }
        }
    }
}

fn exact(counter: &PortRoleCounter, role: PortGroup, required: usize) -> ConfigResult<()> {
    let actual = counter.read(role);
    if actual != required {
        return Err(ConfigError::PortRoleNotEnough {
            role,
            required,
            actual,
        });
    }
    Ok(())
}

/// Fields every test type carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseBase {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub common: CommonOptions,
    #[serde(default)]
    pub port_role_handler: Option<PortRoleHandler>,
}

impl Default for TestCaseBase {
    fn default() -> Self {
        Self {
            enabled: true,
            label: String::new(),
            common: CommonOptions::default(),
            port_role_handler: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThroughputTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_iteration_options: RateIterationOptions,
    #[serde(default)]
    pub use_pass_criteria: bool,
    #[serde(default)]
    pub pass_criteria_throughput_pct: f64,
    #[serde(default)]
    pub acceptable_loss_pct: f64,
    #[serde(default)]
    pub collect_latency_jitter: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencyTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
    #[serde(default)]
    pub latency_mode: LatencyMode,
    #[serde(default)]
    pub use_relative_to_throughput: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameLossRateTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
    #[serde(default)]
    pub use_gap_monitor: bool,
    #[serde(default)]
    pub gap_monitor_start_microsec: u32,
    #[serde(default)]
    pub gap_monitor_stop_frames: u32,
    #[serde(default)]
    pub use_pass_criteria: bool,
    #[serde(default)]
    pub pass_criteria_loss: f64,
    #[serde(default)]
    pub pass_criteria_loss_type: AcceptableLossType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackToBackTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
    #[serde(default)]
    pub burst_size_iteration_options: BurstSizeIterationOptions,
}

impl Default for BackToBackTest {
    fn default() -> Self {
        Self {
            base: TestCaseBase {
                common: CommonOptions {
                    duration_type: DurationType::Frames,
                    duration: 1.0,
                    duration_unit: DurationUnit::MFrames,
                    iterations: 1,
                },
                ..TestCaseBase::default()
            },
            rate_sweep_options: RateSweepOptions::default(),
            burst_size_iteration_options: BurstSizeIterationOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSubTest {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub topology: TestTopology,
    #[serde(default)]
    pub direction: TrafficDirection,
    #[serde(default)]
    pub throughput_test_enabled: bool,
    #[serde(default)]
    pub forwarding_test_enabled: bool,
    #[serde(default)]
    pub port_role_handler: PortRoleHandler,
    #[serde(default)]
    pub rate_iteration_options: RateIterationOptions,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
}

impl RateSubTest {
    fn check(&self) -> ConfigResult<()> {
        if !self.throughput_test_enabled && !self.forwarding_test_enabled {
            return Err(ConfigError::RateTestEmptySubTest);
        }
        let counter = self.port_role_handler.role_counter();
        if counter.enabled < 2 {
            return Err(ConfigError::RateTestPortConfigNotEnough {
                actual: counter.enabled,
            });
        }
        if self.topology.is_mesh_topology() {
            return Ok(());
        }
        for (_, config) in self.port_role_handler.used_roles() {
            if config.role.is_undefined() {
                return Err(ConfigError::PortRoleUndefined);
            }
            if self.topology.is_pair_topology() && config.peer_port_id.is_empty() {
                return Err(ConfigError::PortRoleEmptyPair);
            }
        }
        if counter.read(PortGroup::East) == 0 || counter.read(PortGroup::West) == 0 {
            return Err(ConfigError::PortRoleEmptyGroupRole);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RateTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub sub_tests: Vec<RateSubTest>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CongestionControlTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_iteration_options: RateIterationOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForwardPressureTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub interframe_gap_delta: f64,
    #[serde(default)]
    pub acceptable_rx_max_util_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaxForwardingRateTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub use_throughput_as_start_value: bool,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
}

/// MAC learning parameters shared by both address tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressLearningOptions {
    #[serde(default)]
    pub learn_mac_base_address: MacAddress,
    #[serde(default)]
    pub test_port_mac_mode: TestPortMacMode,
    #[serde(default)]
    pub learning_port_dmac_mode: LearningPortDMacMode,
    #[serde(default)]
    pub learning_sequence_port_dmac_mode: LearningSequencePortDMacMode,
    #[serde(default = "default_learning_rate")]
    pub learning_rate_fps: f64,
    #[serde(default)]
    pub toggle_sync_state: bool,
    #[serde(default = "default_sync_duration")]
    pub sync_off_duration: u32,
    #[serde(default = "default_sync_duration")]
    pub sync_on_duration: u32,
    #[serde(default)]
    pub switch_test_port_roles: bool,
    #[serde(default = "default_aging_time")]
    pub dut_aging_time: u32,
}

fn default_learning_rate() -> f64 {
    1000.0
}

fn default_sync_duration() -> u32 {
    1
}

fn default_aging_time() -> u32 {
    300
}

impl Default for AddressLearningOptions {
    fn default() -> Self {
        Self {
            learn_mac_base_address: MacAddress::default(),
            test_port_mac_mode: TestPortMacMode::default(),
            learning_port_dmac_mode: LearningPortDMacMode::default(),
            learning_sequence_port_dmac_mode: LearningSequencePortDMacMode::default(),
            learning_rate_fps: default_learning_rate(),
            toggle_sync_state: false,
            sync_off_duration: default_sync_duration(),
            sync_on_duration: default_sync_duration(),
            switch_test_port_roles: false,
            dut_aging_time: default_aging_time(),
        }
    }
}

impl AddressLearningOptions {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.learning_rate_fps <= 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                field: "learning_rate_fps",
                value: self.learning_rate_fps.to_string(),
                range: "(0, inf)".to_string(),
            });
        }
        if self.toggle_sync_state {
            check_range("sync_off_duration", f64::from(self.sync_off_duration), 1.0, 60.0)?;
            check_range("sync_on_duration", f64::from(self.sync_on_duration), 1.0, 60.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddressCachingCapacityTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub address_iteration_options: AddressIterationOptions,
    #[serde(default)]
    pub learning: AddressLearningOptions,
    #[serde(default)]
    pub fast_run_resolution_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressLearningRateTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    pub address_sweep_options: RateSweepOptions,
    #[serde(default)]
    pub rate_iteration_options: RateIterationOptions,
    #[serde(default)]
    pub learning: AddressLearningOptions,
    #[serde(default)]
    pub only_use_capacity: bool,
    #[serde(default)]
    pub set_end_address_to_capacity: bool,
}

impl Default for AddressLearningRateTest {
    fn default() -> Self {
        Self {
            base: TestCaseBase::default(),
            address_sweep_options: RateSweepOptions {
                start_value: 1_000.0,
                end_value: 10_000.0,
                step_value: 1_000.0,
            },
            rate_iteration_options: RateIterationOptions::default(),
            learning: AddressLearningOptions::default(),
            only_use_capacity: false,
            set_end_address_to_capacity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErroredFramesFilteringTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_sweep_options: RateSweepOptions,
    #[serde(default)]
    pub oversize_test_enabled: bool,
    #[serde(default = "default_max_frame")]
    pub max_frame_size: u32,
    #[serde(default)]
    pub oversize_span: u32,
    #[serde(default = "default_min_frame")]
    pub min_frame_size: u32,
    #[serde(default)]
    pub undersize_span: u32,
}

fn default_max_frame() -> u32 {
    1518
}

fn default_min_frame() -> u32 {
    64
}

impl Default for ErroredFramesFilteringTest {
    fn default() -> Self {
        Self {
            base: TestCaseBase::default(),
            rate_sweep_options: RateSweepOptions::default(),
            oversize_test_enabled: false,
            max_frame_size: default_max_frame(),
            oversize_span: 0,
            min_frame_size: default_min_frame(),
            undersize_span: 0,
        }
    }
}

impl ErroredFramesFilteringTest {
    fn validate(&self) -> ConfigResult<()> {
        if self.min_frame_size > self.max_frame_size {
            return Err(ConfigError::RangeRestriction {
                start: f64::from(self.min_frame_size),
                end: f64::from(self.max_frame_size),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BroadcastForwardingTest {
    #[serde(flatten)]
    pub base: TestCaseBase,
    #[serde(default)]
    pub rate_iteration_options: RateIterationOptions,
}

/// One configured benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTypeConfig {
    Throughput(ThroughputTest),
    Latency(LatencyTest),
    FrameLoss(FrameLossRateTest),
    BackToBack(BackToBackTest),
    RateTest(RateTest),
    CongestionControl(CongestionControlTest),
    ForwardPressure(ForwardPressureTest),
    MaxForwardingRate(MaxForwardingRateTest),
    AddressCachingCapacity(AddressCachingCapacityTest),
    AddressLearningRate(AddressLearningRateTest),
    ErroredFramesFiltering(ErroredFramesFilteringTest),
    BroadcastForwarding(BroadcastForwardingTest),
}

impl TestTypeConfig {
    pub fn test_type(&self) -> TestType {
        match self {
            TestTypeConfig::Throughput(_) => TestType::Throughput,
            TestTypeConfig::Latency(_) => TestType::Latency,
            TestTypeConfig::FrameLoss(_) => TestType::FrameLoss,
            TestTypeConfig::BackToBack(_) => TestType::BackToBack,
            TestTypeConfig::RateTest(_) => TestType::RateTest,
            TestTypeConfig::CongestionControl(_) => TestType::CongestionControl,
            TestTypeConfig::ForwardPressure(_) => TestType::ForwardPressure,
            TestTypeConfig::MaxForwardingRate(_) => TestType::MaxForwardingRate,
            TestTypeConfig::AddressCachingCapacity(_) => TestType::AddressCachingCapacity,
            TestTypeConfig::AddressLearningRate(_) => TestType::AddressLearningRate,
            TestTypeConfig::ErroredFramesFiltering(_) => TestType::ErroredFramesFiltering,
            TestTypeConfig::BroadcastForwarding(_) => TestType::BroadcastForwarding,
        }
    }

    pub fn base(&self) -> &TestCaseBase {
        match self {
            TestTypeConfig::Throughput(t) => &t.base,
            TestTypeConfig::Latency(t) => &t.base,
            TestTypeConfig::FrameLoss(t) => &t.base,
            TestTypeConfig::BackToBack(t) => &t.base,
            TestTypeConfig::RateTest(t) => &t.base,
            TestTypeConfig::CongestionControl(t) => &t.base,
            TestTypeConfig::ForwardPressure(t) => &t.base,
            TestTypeConfig::MaxForwardingRate(t) => &t.base,
            TestTypeConfig::AddressCachingCapacity(t) => &t.base,
            TestTypeConfig::AddressLearningRate(t) => &t.base,
            TestTypeConfig::ErroredFramesFiltering(t) => &t.base,
            TestTypeConfig::BroadcastForwarding(t) => &t.base,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    pub fn role_requirement(&self) -> RoleRequirement {
        match self {
            TestTypeConfig::Throughput(_)
            | TestTypeConfig::Latency(_)
            | TestTypeConfig::FrameLoss(_)
            | TestTypeConfig::BackToBack(_) => RoleRequirement::GroupTopology,
            TestTypeConfig::RateTest(_) => RoleRequirement::RateSubTests,
            TestTypeConfig::CongestionControl(_) => RoleRequirement::SourceDestination {
                source: 2,
                destination: 2,
            },
            TestTypeConfig::ForwardPressure(_)
            | TestTypeConfig::MaxForwardingRate(_)
            | TestTypeConfig::ErroredFramesFiltering(_) => RoleRequirement::SourceDestination {
                source: 1,
                destination: 1,
            },
            TestTypeConfig::AddressCachingCapacity(_) | TestTypeConfig::AddressLearningRate(_) => {
                RoleRequirement::AddressTriad
            }
            TestTypeConfig::BroadcastForwarding(_) => RoleRequirement::Broadcast,
        }
    }

    /// Numeric ranges of the variant's own fields.
    pub fn validate_options(&self) -> ConfigResult<()> {
        self.base().common.validate()?;
        match self {
            TestTypeConfig::Throughput(t) => {
                t.rate_iteration_options.validate()?;
                check_range(
                    "pass_criteria_throughput_pct",
                    t.pass_criteria_throughput_pct,
                    0.0,
                    100.0,
                )?;
                check_range("acceptable_loss_pct", t.acceptable_loss_pct, 0.0, 100.0)
            }
            TestTypeConfig::Latency(t) => t.rate_sweep_options.validate(),
            TestTypeConfig::FrameLoss(t) => {
                t.rate_sweep_options.validate()?;
                check_range(
                    "gap_monitor_start_microsec",
                    f64::from(t.gap_monitor_start_microsec),
                    0.0,
                    1000.0,
                )?;
                check_range(
                    "gap_monitor_stop_frames",
                    f64::from(t.gap_monitor_stop_frames),
                    0.0,
                    1000.0,
                )?;
                if t.pass_criteria_loss_type == AcceptableLossType::Percent {
                    check_range("pass_criteria_loss", t.pass_criteria_loss, 0.0, 100.0)?;
                } else if t.pass_criteria_loss < 0.0 {
                    return Err(ConfigError::ValueOutOfRange {
                        field: "pass_criteria_loss",
                        value: t.pass_criteria_loss.to_string(),
                        range: "[0, inf)".to_string(),
                    });
                }
                Ok(())
            }
            TestTypeConfig::BackToBack(t) => {
                t.rate_sweep_options.validate()?;
                t.burst_size_iteration_options.validate()
            }
            TestTypeConfig::RateTest(t) => {
                for sub in &t.sub_tests {
                    sub.rate_iteration_options.validate()?;
                    sub.rate_sweep_options.validate()?;
                }
                Ok(())
            }
            TestTypeConfig::CongestionControl(t) => t.rate_iteration_options.validate(),
            TestTypeConfig::ForwardPressure(t) => {
                check_range("interframe_gap_delta", t.interframe_gap_delta, 0.0, 100.0)?;
                check_range(
                    "acceptable_rx_max_util_delta",
                    t.acceptable_rx_max_util_delta,
                    0.0,
                    100.0,
                )
            }
            TestTypeConfig::MaxForwardingRate(t) => t.rate_sweep_options.validate(),
            TestTypeConfig::AddressCachingCapacity(t) => {
                t.address_iteration_options.validate()?;
                t.learning.validate()
            }
            TestTypeConfig::AddressLearningRate(t) => {
                t.address_sweep_options.validate()?;
                t.rate_iteration_options.validate()?;
                t.learning.validate()
            }
            TestTypeConfig::ErroredFramesFiltering(t) => {
                t.rate_sweep_options.validate()?;
                t.validate()
            }
            TestTypeConfig::BroadcastForwarding(t) => t.rate_iteration_options.validate(),
        }
    }

    /// Everything an enabled variant must satisfy; disabled variants pass.
    pub fn check_configuration(&self, flow_creation: FlowCreationType) -> ConfigResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let test_type = self.test_type();
        let common = &self.base().common;
        match (test_type, common.duration_type) {
            (TestType::BackToBack, DurationType::Time) => {
                return Err(ConfigError::FrameDurationRequired { test_type });
            }
            (TestType::BackToBack, _) | (_, DurationType::Time) => {}
            (_, DurationType::Frames) => {
                return Err(ConfigError::TimeDurationRequired { test_type });
            }
        }

        match self {
            TestTypeConfig::Throughput(t) => {
                check_result_scope(&t.rate_iteration_options, flow_creation)?;
            }
            TestTypeConfig::RateTest(t) => {
                for sub in t.sub_tests.iter().filter(|s| s.enabled) {
                    sub.check()?;
                    if sub.throughput_test_enabled {
                        check_result_scope(&sub.rate_iteration_options, flow_creation)?;
                    }
                }
            }
            _ => {}
        }

        let requirement = self.role_requirement();
        match requirement {
            RoleRequirement::GroupTopology | RoleRequirement::RateSubTests => Ok(()),
            _ => {
                let handler = self
                    .base()
                    .port_role_handler
                    .as_ref()
                    .ok_or(ConfigError::PortRoleHandlerMissing { test_type })?;
                requirement.check(handler)
            }
        }
    }
}

fn check_result_scope(
    options: &RateIterationOptions,
    flow_creation: FlowCreationType,
) -> ConfigResult<()> {
    if options.result_scope == RateResultScope::PerSourcePortResult
        && !flow_creation.is_stream_based()
    {
        return Err(ConfigError::ModifierBasedNotSupportPerPortResult);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn handler(roles: &[(&str, PortGroup, &str)]) -> PortRoleHandler {
        PortRoleHandler {
            role_map: roles
                .iter()
                .map(|(id, role, peer)| {
                    (
                        id.to_string(),
                        PortRoleConfig {
                            is_used: true,
                            role: *role,
                            peer_port_id: peer.to_string(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn with_roles(base: TestCaseBase, roles: &[(&str, PortGroup, &str)]) -> TestCaseBase {
        TestCaseBase {
            port_role_handler: Some(handler(roles)),
            ..base
        }
    }

    #[test]
    fn test_rate_iteration_rejects_initial_above_maximum() {
        assert_eq!(
            RateIterationOptions::new(50.0, 10.0, 40.0, 0.5),
            Err(ConfigError::RateRestriction {
                value: 50.0,
                maximum: 40.0
            })
        );
        assert_eq!(
            RateIterationOptions::new(30.0, 35.0, 40.0, 0.5),
            Err(ConfigError::InitialBelowMinimum {
                initial: 30.0,
                minimum: 35.0
            })
        );
        assert!(RateIterationOptions::new(30.0, 10.0, 40.0, 0.5).is_ok());
    }

    #[test]
    fn test_rate_iteration_rejects_out_of_range_percent() {
        assert!(matches!(
            RateIterationOptions::new(100.0, 0.0, 120.0, 0.5),
            Err(ConfigError::ValueOutOfRange {
                field: "maximum_value_pct",
                ..
            })
        ));
    }

    #[test]
    fn test_rate_iteration_checked_on_deserialize() {
        let bad = r#"{ "initial_value_pct": 50, "maximum_value_pct": 40 }"#;
        assert!(serde_json::from_str::<RateIterationOptions>(bad).is_err());

        let good = r#"{ "initial_value_pct": 50, "maximum_value_pct": 60 }"#;
        let options: RateIterationOptions = serde_json::from_str(good).unwrap();
        assert_eq!(options.minimum_value_pct, 0.1);
    }

    #[test]
    fn test_rate_sweep_bounds() {
        assert_eq!(
            RateSweepOptions::new(60.0, 50.0, 10.0),
            Err(ConfigError::RangeRestriction {
                start: 60.0,
                end: 50.0
            })
        );
        assert_eq!(
            RateSweepOptions::new(10.0, 50.0, 0.0),
            Err(ConfigError::StepValueRestriction)
        );
    }

    #[test]
    fn test_sweep_values_always_end_with_end_value() {
        let even = RateSweepOptions::new(10.0, 30.0, 10.0).unwrap();
        assert_eq!(even.sweep_values(), vec![10.0, 20.0, 30.0]);

        let uneven = RateSweepOptions::new(10.0, 35.0, 10.0).unwrap();
        assert_eq!(uneven.sweep_values(), vec![10.0, 20.0, 30.0, 35.0]);

        let single = RateSweepOptions::new(50.0, 50.0, 10.0).unwrap();
        assert_eq!(single.sweep_values(), vec![50.0]);

        let fractional = RateSweepOptions::new(0.1, 0.3, 0.1).unwrap();
        assert_eq!(fractional.sweep_values().len(), 3);
    }

    #[test]
    fn test_common_options_ranges() {
        let zero = CommonOptions {
            duration: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::ValueOutOfRange { field: "duration", .. })
        ));

        let mismatch = CommonOptions {
            duration_unit: DurationUnit::KFrames,
            ..Default::default()
        };
        assert!(matches!(
            mismatch.validate(),
            Err(ConfigError::DurationUnitMismatch { .. })
        ));
    }

    #[test]
    fn test_frame_duration_packet_limit() {
        let options = CommonOptions {
            duration_type: DurationType::Frames,
            duration: 3.0,
            duration_unit: DurationUnit::GFrames,
            iterations: 1,
        };
        assert_eq!(
            options.validate(),
            Err(ConfigError::PacketLimitOverflow {
                packets: 3_000_000_000
            })
        );

        let fits = CommonOptions {
            duration: 2.0,
            ..options
        };
        assert!(fits.validate().is_ok());
        assert_eq!(fits.actual_duration(), 2e9);
    }

    #[test]
    fn test_role_counter_ignores_unused_ports() {
        let mut h = handler(&[
            ("p0", PortGroup::Source, ""),
            ("p1", PortGroup::Destination, ""),
            ("p2", PortGroup::Destination, ""),
        ]);
        if let Some(config) = h.role_map.get_mut("p2") {
            config.is_used = false;
        }
        let counter = h.role_counter();
        assert_eq!(counter.enabled, 2);
        assert_eq!(counter.read(PortGroup::Destination), 1);
        assert_eq!(counter.read(PortGroup::East), 0);
    }

    #[test]
    fn test_congestion_control_needs_two_by_two() {
        let base = with_roles(
            TestCaseBase::default(),
            &[
                ("p0", PortGroup::Source, ""),
                ("p1", PortGroup::Source, ""),
                ("p2", PortGroup::Destination, ""),
                ("p3", PortGroup::Source, ""),
            ],
        );
        let test = TestTypeConfig::CongestionControl(CongestionControlTest {
            base,
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortRoleNotEnough {
                role: PortGroup::Source,
                required: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_source_destination_total_checked_first() {
        let base = with_roles(TestCaseBase::default(), &[("p0", PortGroup::Source, "")]);
        let test = TestTypeConfig::ForwardPressure(ForwardPressureTest {
            base,
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortRoleEnabledNotEnough {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_destination_mismatch_reports_destination_requirement() {
        let base = with_roles(
            TestCaseBase::default(),
            &[
                ("p0", PortGroup::Source, ""),
                ("p1", PortGroup::Source, ""),
                ("p2", PortGroup::Source, ""),
                ("p3", PortGroup::Destination, ""),
            ],
        );
        let requirement = RoleRequirement::SourceDestination {
            source: 3,
            destination: 1,
        };
        assert!(requirement.check(base.port_role_handler.as_ref().unwrap()).is_ok());

        let requirement = RoleRequirement::SourceDestination {
            source: 2,
            destination: 2,
        };
        assert_eq!(
            requirement.check(base.port_role_handler.as_ref().unwrap()),
            Err(ConfigError::PortRoleNotEnough {
                role: PortGroup::Source,
                required: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_address_tests_need_one_of_each_role() {
        let base = with_roles(
            TestCaseBase::default(),
            &[
                ("p0", PortGroup::LearningPort, ""),
                ("p1", PortGroup::LearningPort, ""),
                ("p2", PortGroup::TestPort, ""),
            ],
        );
        let test = TestTypeConfig::AddressCachingCapacity(AddressCachingCapacityTest {
            base,
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortRoleNotEnough {
                role: PortGroup::LearningPort,
                required: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_broadcast_forwarding_roles() {
        let one_port = with_roles(TestCaseBase::default(), &[("p0", PortGroup::Source, "")]);
        let test = TestTypeConfig::BroadcastForwarding(BroadcastForwardingTest {
            base: one_port,
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortConfigNotEnough { required: 2 })
        );

        let no_destination = with_roles(
            TestCaseBase::default(),
            &[("p0", PortGroup::Source, ""), ("p1", PortGroup::Undefined, "")],
        );
        let test = TestTypeConfig::BroadcastForwarding(BroadcastForwardingTest {
            base: no_destination,
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortRoleNotEnoughAtLeast {
                role: PortGroup::Destination,
                required: 1,
                actual: 0
            })
        );

        let fan_out = with_roles(
            TestCaseBase::default(),
            &[
                ("p0", PortGroup::Source, ""),
                ("p1", PortGroup::Destination, ""),
                ("p2", PortGroup::Destination, ""),
            ],
        );
        let test = TestTypeConfig::BroadcastForwarding(BroadcastForwardingTest {
            base: fan_out,
            ..Default::default()
        });
        assert!(test.check_configuration(FlowCreationType::StreamBased).is_ok());
    }

    #[test]
    fn test_role_counted_type_without_handler() {
        let test = TestTypeConfig::MaxForwardingRate(MaxForwardingRateTest::default());
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::PortRoleHandlerMissing {
                test_type: TestType::MaxForwardingRate
            })
        );
    }

    #[test]
    fn test_disabled_variant_is_inert() {
        let test = TestTypeConfig::MaxForwardingRate(MaxForwardingRateTest {
            base: TestCaseBase {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(test.check_configuration(FlowCreationType::StreamBased).is_ok());
    }

    #[test]
    fn test_throughput_per_port_result_needs_streams() {
        let mut throughput = ThroughputTest::default();
        throughput.rate_iteration_options.result_scope = RateResultScope::PerSourcePortResult;
        let test = TestTypeConfig::Throughput(throughput);

        assert_eq!(
            test.check_configuration(FlowCreationType::ModifierBased),
            Err(ConfigError::ModifierBasedNotSupportPerPortResult)
        );
        assert!(test.check_configuration(FlowCreationType::StreamBased).is_ok());
    }

    #[test]
    fn test_duration_type_per_test_type() {
        let test = TestTypeConfig::BackToBack(BackToBackTest {
            base: TestCaseBase::default(),
            ..Default::default()
        });
        assert_eq!(
            test.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::FrameDurationRequired {
                test_type: TestType::BackToBack
            })
        );
        let b2b = TestTypeConfig::BackToBack(BackToBackTest::default());
        assert!(b2b.check_configuration(FlowCreationType::StreamBased).is_ok());

        let latency = TestTypeConfig::Latency(LatencyTest {
            base: BackToBackTest::default().base,
            ..Default::default()
        });
        assert_eq!(
            latency.check_configuration(FlowCreationType::StreamBased),
            Err(ConfigError::TimeDurationRequired {
                test_type: TestType::Latency
            })
        );
    }

    fn rate_test(sub: RateSubTest) -> TestTypeConfig {
        TestTypeConfig::RateTest(RateTest {
            base: TestCaseBase::default(),
            sub_tests: vec![sub],
        })
    }

    fn sub_test(topology: TestTopology, roles: &[(&str, PortGroup, &str)]) -> RateSubTest {
        RateSubTest {
            enabled: true,
            topology,
            direction: TrafficDirection::EastToWest,
            throughput_test_enabled: true,
            forwarding_test_enabled: false,
            port_role_handler: handler(roles),
            rate_iteration_options: RateIterationOptions::default(),
            rate_sweep_options: RateSweepOptions::default(),
        }
    }

    #[test]
    fn test_rate_sub_test_checks() {
        let flow = FlowCreationType::StreamBased;

        let mut empty = sub_test(
            TestTopology::Blocks,
            &[("p0", PortGroup::East, ""), ("p1", PortGroup::West, "")],
        );
        empty.throughput_test_enabled = false;
        assert_eq!(
            rate_test(empty).check_configuration(flow),
            Err(ConfigError::RateTestEmptySubTest)
        );

        let lonely = sub_test(TestTopology::Blocks, &[("p0", PortGroup::East, "")]);
        assert_eq!(
            rate_test(lonely).check_configuration(flow),
            Err(ConfigError::RateTestPortConfigNotEnough { actual: 1 })
        );

        let undefined = sub_test(
            TestTopology::Blocks,
            &[("p0", PortGroup::East, ""), ("p1", PortGroup::Undefined, "")],
        );
        assert_eq!(
            rate_test(undefined).check_configuration(flow),
            Err(ConfigError::PortRoleUndefined)
        );

        let unpaired = sub_test(
            TestTopology::Pairs,
            &[("p0", PortGroup::East, "p1"), ("p1", PortGroup::West, "")],
        );
        assert_eq!(
            rate_test(unpaired).check_configuration(flow),
            Err(ConfigError::PortRoleEmptyPair)
        );

        let one_sided = sub_test(
            TestTopology::Blocks,
            &[("p0", PortGroup::East, ""), ("p1", PortGroup::East, "")],
        );
        assert_eq!(
            rate_test(one_sided).check_configuration(flow),
            Err(ConfigError::PortRoleEmptyGroupRole)
        );

        let mesh = sub_test(
            TestTopology::Mesh,
            &[("p0", PortGroup::Undefined, ""), ("p1", PortGroup::Undefined, "")],
        );
        assert!(rate_test(mesh).check_configuration(flow).is_ok());

        let paired = sub_test(
            TestTopology::Pairs,
            &[("p0", PortGroup::East, "p1"), ("p1", PortGroup::West, "p0")],
        );
        assert!(rate_test(paired).check_configuration(flow).is_ok());
    }

    #[test]
    fn test_validate_options_dispatch() {
        let frame_loss = TestTypeConfig::FrameLoss(FrameLossRateTest {
            gap_monitor_start_microsec: 1001,
            ..Default::default()
        });
        assert!(matches!(
            frame_loss.validate_options(),
            Err(ConfigError::ValueOutOfRange {
                field: "gap_monitor_start_microsec",
                ..
            })
        ));

        let errored = TestTypeConfig::ErroredFramesFiltering(ErroredFramesFilteringTest {
            min_frame_size: 2000,
            ..Default::default()
        });
        assert!(matches!(
            errored.validate_options(),
            Err(ConfigError::RangeRestriction { .. })
        ));

        let learning = TestTypeConfig::AddressLearningRate(AddressLearningRateTest::default());
        assert!(learning.validate_options().is_ok());
    }

    #[test]
    fn test_variant_deserializes_with_flattened_base() {
        let json = r#"{ "throughput": {
            "enabled": true,
            "duration": 60,
            "iterations": 2,
            "rate_iteration_options": { "initial_value_pct": 80, "maximum_value_pct": 100 },
            "acceptable_loss_pct": 0.5
        } }"#;
        let test: TestTypeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(test.test_type(), TestType::Throughput);
        assert_eq!(test.base().common.duration, 60.0);
        assert_eq!(test.base().common.iterations, 2);
        assert!(test.validate_options().is_ok());
    }
}
