//! Enumerations and fixed tables shared by the configuration model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IETF default frame sizes in bytes.
pub const DEFAULT_IETF_PACKET_SIZES: [u32; 7] = [64, 128, 256, 512, 1024, 1280, 1518];

/// Reference sizes of the mixed frame-size distribution.
pub const MIXED_PACKET_SIZES: [u32; 16] = [
    56, 60, 64, 70, 78, 92, 256, 496, 512, 570, 576, 594, 1438, 1518, 9216, 16360,
];

/// Default weights (percent) for [`MIXED_PACKET_SIZES`].
pub const MIXED_DEFAULT_WEIGHTS: [u32; 16] = [0, 0, 0, 0, 57, 3, 5, 1, 2, 5, 1, 4, 4, 18, 0, 0];

/// Positions of the mixed distribution whose size can be overridden.
pub const MIXED_CUSTOM_LENGTH_INDICES: [usize; 4] = [0, 1, 14, 15];

/// Largest frame count a port can be asked to send in one run.
pub const MAX_PACKET_LIMIT_VALUE: u64 = 0x7FFF_FFFF;

/// Micro TPLD: 6 bytes of payload id plus 4 bytes of FCS.
pub const MICRO_TPLD_TOTAL_LENGTH: u32 = 10;

/// Standard TPLD: 20 bytes of payload id, 2 bytes of pattern, 4 bytes of FCS.
pub const STANDARD_TPLD_TOTAL_LENGTH: u32 = 26;

/// Logical group or role a port plays in a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortGroup {
    East,
    West,
    Source,
    Destination,
    TestPort,
    LearningPort,
    MonitoringPort,
    Undefined,
}

impl Default for PortGroup {
    fn default() -> Self {
        PortGroup::Undefined
    }
}

impl PortGroup {
    pub fn is_east(&self) -> bool {
        matches!(self, PortGroup::East)
    }

    pub fn is_west(&self) -> bool {
        matches!(self, PortGroup::West)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, PortGroup::Undefined)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PortGroup::East => "east",
            PortGroup::West => "west",
            PortGroup::Source => "source",
            PortGroup::Destination => "destination",
            PortGroup::TestPort => "test_port",
            PortGroup::LearningPort => "learning_port",
            PortGroup::MonitoringPort => "monitoring_port",
            PortGroup::Undefined => "undefined",
        }
    }
}

impl fmt::Display for PortGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global port topology policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestTopology {
    #[default]
    Pairs,
    Blocks,
    Mesh,
    /// Ports are validated per test type through role counts.
    RoleCounted,
}

impl TestTopology {
    pub fn is_pair_topology(&self) -> bool {
        matches!(self, TestTopology::Pairs)
    }

    pub fn is_mesh_topology(&self) -> bool {
        matches!(self, TestTopology::Mesh)
    }

    pub fn is_role_counted(&self) -> bool {
        matches!(self, TestTopology::RoleCounted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficDirection {
    #[default]
    EastToWest,
    WestToEast,
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowCreationType {
    #[default]
    StreamBased,
    ModifierBased,
}

impl FlowCreationType {
    pub fn is_stream_based(&self) -> bool {
        matches!(self, FlowCreationType::StreamBased)
    }
}

/// Policy used to hand out payload identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TidAllocationScope {
    #[default]
    #[serde(rename = "config_scope")]
    ConfigurationScope,
    #[serde(rename = "port_scope")]
    RxPortScope,
    #[serde(rename = "source_port_id")]
    SourcePortId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketSizeType {
    #[default]
    IetfDefault,
    CustomSizes,
    Specified,
    Incrementing,
    Butterfly,
    Random,
    MixedSizes,
}

impl PacketSizeType {
    /// Modes that send one varying size per stream, reported as a midpoint.
    pub fn is_varying(&self) -> bool {
        matches!(
            self,
            PacketSizeType::Incrementing | PacketSizeType::Butterfly | PacketSizeType::Random
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationType {
    #[default]
    Time,
    Frames,
}

impl DurationType {
    pub fn is_time_duration(&self) -> bool {
        matches!(self, DurationType::Time)
    }
}

impl fmt::Display for DurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationType::Time => f.write_str("time"),
            DurationType::Frames => f.write_str("frames"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    #[serde(alias = "sec")]
    #[default]
    Seconds,
    #[serde(alias = "min")]
    Minutes,
    #[serde(alias = "hour")]
    Hours,
    Frames,
    #[serde(rename = "kframes")]
    KFrames,
    #[serde(rename = "mframes")]
    MFrames,
    #[serde(rename = "gframes")]
    GFrames,
}

impl DurationUnit {
    /// Multiplier applied to a duration value expressed in this unit.
    pub fn scale(&self) -> u64 {
        match self {
            DurationUnit::Seconds | DurationUnit::Frames => 1,
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 3_600,
            DurationUnit::KFrames => 1_000,
            DurationUnit::MFrames => 1_000_000,
            DurationUnit::GFrames => 1_000_000_000,
        }
    }

    pub fn is_time_unit(&self) -> bool {
        matches!(
            self,
            DurationUnit::Seconds | DurationUnit::Minutes | DurationUnit::Hours
        )
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Frames => "frames",
            DurationUnit::KFrames => "kframes",
            DurationUnit::MFrames => "mframes",
            DurationUnit::GFrames => "gframes",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    BinarySearch,
    FastBinarySearch,
}

/// How rate-test results are attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateResultScope {
    #[default]
    CommonResult,
    PerSourcePortResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyMode {
    #[default]
    FirstToLast,
    LastToLast,
    FirstToFirst,
    LastToFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptableLossType {
    #[default]
    Percent,
    Frames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortRateCapProfile {
    #[default]
    PhysicalPortRate,
    CustomRateCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortRateCapUnit {
    #[serde(rename = "Gbps")]
    #[default]
    Gbps,
    #[serde(rename = "Mbps")]
    Mbps,
    #[serde(rename = "kbps")]
    Kbps,
    #[serde(rename = "bps")]
    Bps,
}

impl PortRateCapUnit {
    pub fn scale(&self) -> f64 {
        match self {
            PortRateCapUnit::Gbps => 1e9,
            PortRateCapUnit::Mbps => 1e6,
            PortRateCapUnit::Kbps => 1e3,
            PortRateCapUnit::Bps => 1.0,
        }
    }
}

/// Port speed as configured; `Auto` keeps whatever the port negotiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortSpeedMode {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "10M")]
    F10M,
    #[serde(rename = "100M")]
    F100M,
    #[serde(rename = "1G")]
    F1G,
    #[serde(rename = "2500M")]
    F2500M,
    #[serde(rename = "5G")]
    F5G,
    #[serde(rename = "10G")]
    F10G,
    #[serde(rename = "25G")]
    F25G,
    #[serde(rename = "40G")]
    F40G,
    #[serde(rename = "50G")]
    F50G,
    #[serde(rename = "100G")]
    F100G,
    #[serde(rename = "200G")]
    F200G,
    #[serde(rename = "400G")]
    F400G,
    #[serde(rename = "800G")]
    F800G,
}

impl PortSpeedMode {
    /// Configured speed in Mbps, `None` for auto negotiation.
    pub fn to_mbps(&self) -> Option<u32> {
        let mbps = match self {
            PortSpeedMode::Auto => return None,
            PortSpeedMode::F10M => 10,
            PortSpeedMode::F100M => 100,
            PortSpeedMode::F1G => 1_000,
            PortSpeedMode::F2500M => 2_500,
            PortSpeedMode::F5G => 5_000,
            PortSpeedMode::F10G => 10_000,
            PortSpeedMode::F25G => 25_000,
            PortSpeedMode::F40G => 40_000,
            PortSpeedMode::F50G => 50_000,
            PortSpeedMode::F100G => 100_000,
            PortSpeedMode::F200G => 200_000,
            PortSpeedMode::F400G => 400_000,
            PortSpeedMode::F800G => 800_000,
        };
        Some(mbps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FecMode {
    On,
    #[default]
    Off,
    FcFec,
}

impl fmt::Display for FecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FecMode::On => f.write_str("on"),
            FecMode::Off => f.write_str("off"),
            FecMode::FcFec => f.write_str("fc_fec"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MdiMdixMode {
    #[default]
    Auto,
    Mdi,
    Mdix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrrMode {
    #[default]
    Master,
    Slave,
}

/// Source MAC scheme used by the test port of address tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPortMacMode {
    #[default]
    UseTestPortMac,
    UseLearningMacBaseAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningPortDMacMode {
    #[default]
    UseTestPortMac,
    UseBroadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningSequencePortDMacMode {
    #[default]
    Incrementing,
    Randomized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierAction {
    #[default]
    Increment,
    Decrement,
    Random,
}

/// Kind of every supported test, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Throughput,
    Latency,
    FrameLoss,
    BackToBack,
    RateTest,
    CongestionControl,
    ForwardPressure,
    MaxForwardingRate,
    AddressCachingCapacity,
    AddressLearningRate,
    ErroredFramesFiltering,
    BroadcastForwarding,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestType::Throughput => "Throughput",
            TestType::Latency => "Latency",
            TestType::FrameLoss => "Frame Loss",
            TestType::BackToBack => "Back-to-Back",
            TestType::RateTest => "Rate Test",
            TestType::CongestionControl => "Congestion Control",
            TestType::ForwardPressure => "Forward Pressure",
            TestType::MaxForwardingRate => "Max Forwarding Rate",
            TestType::AddressCachingCapacity => "Address Caching Capacity",
            TestType::AddressLearningRate => "Address Learning Rate",
            TestType::ErroredFramesFiltering => "Errored Frames Filtering",
            TestType::BroadcastForwarding => "Broadcast Forwarding",
        };
        f.write_str(s)
    }
}
