use thiserror::Error;

use crate::constants::{PortGroup, TestType};

/// Result alias used throughout the validation core.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Every condition under which a suite configuration is rejected.
///
/// All variants are terminal for the configuration under validation: the
/// caller fixes the input and validates again from scratch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    // value types
    #[error("Invalid MAC address: '{value}'")]
    MacAddressNotValid { value: String },

    #[error("Invalid binary string: '{value}'")]
    BinaryStringNotValid { value: String },

    #[error("Prefix length {prefix} is out of range (max {max})")]
    PrefixOutOfRange { prefix: u8, max: u8 },

    // protocol segments
    #[error("Unknown protocol segment type: '{value}'")]
    UnknownSegmentType { value: String },

    #[error("Field '{field}' expects {expected} bits, got {actual}")]
    FieldLengthMismatch {
        field: String,
        expected: u32,
        actual: u32,
    },

    #[error("Modifier range {start}..{stop} is not reachable with step {step}")]
    ModifierRangeError { start: u32, stop: u32, step: u32 },

    #[error("Value range of field '{field}' exceeds the field maximum {max}")]
    ValueRangeExceed { field: String, max: u64 },

    #[error("Protocol segment profile '{profile_id}' is not defined")]
    ProfileMissing { profile_id: String },

    #[error("Protocol segment profile '{profile_id}' is defined more than once")]
    DuplicateProfile { profile_id: String },

    // ports and topology
    #[error("Port entry {index} declares slot {slot}; slots must match their position")]
    PortSlotMismatch { index: usize, slot: usize },

    #[error("At least {required} port(s) must be configured")]
    PortConfigNotEnough { required: usize },

    #[error("At least one port must be assigned to the {group} group")]
    PortGroupError { group: String },

    #[error("Port {slot} must be assigned to a port group")]
    PortGroupNeeded { slot: usize },

    #[error("Port {slot} needs a valid peer port")]
    PortPeerNeeded { slot: usize },

    #[error("Port {slot} and its peer {peer} do not point to each other")]
    PortPeerInconsistent { slot: usize, peer: usize },

    #[error("Port {slot} has an empty {ip_version} address")]
    IpAddressMissing { slot: usize, ip_version: String },

    #[error("Port {slot} protocol profile carries no IP segment")]
    NoIpSegment { slot: usize },

    #[error("Modifier-based flow creation does not support layer-3 profiles (port {slot})")]
    ModifierBasedNotSupportL3 { slot: usize },

    #[error("Modifier-based flow creation does not support per source port results")]
    ModifierBasedNotSupportPerPortResult,

    #[error("Modifier-based flow creation does not support multi-stream")]
    ModifierBasedNotSupportMultiStream,

    #[error("Modifier-based flow creation does not allow modifiers on TX port {slot}")]
    ModifierBasedNotSupportDefineModifier { slot: usize },

    // test types
    #[error("At least one test type must be enabled")]
    TestTypeNotEnabled,

    #[error("{test_type} requires a port role handler")]
    PortRoleHandlerMissing { test_type: TestType },

    #[error("{required} ports must be enabled, found {actual}")]
    PortRoleEnabledNotEnough { required: usize, actual: usize },

    #[error("Exactly {required} {role} port(s) required, found {actual}")]
    PortRoleNotEnough {
        role: PortGroup,
        required: usize,
        actual: usize,
    },

    #[error("At least {required} {role} port(s) required, found {actual}")]
    PortRoleNotEnoughAtLeast {
        role: PortGroup,
        required: usize,
        actual: usize,
    },

    #[error("Every used port of the rate test must have a defined role")]
    PortRoleUndefined,

    #[error("Every used port of a pair topology must name its peer port")]
    PortRoleEmptyPair,

    #[error("Rate test needs at least one east and one west port")]
    PortRoleEmptyGroupRole,

    #[error("Rate sub-test must enable throughput, forwarding, or both")]
    RateTestEmptySubTest,

    #[error("Rate test needs at least 2 used ports, found {actual}")]
    RateTestPortConfigNotEnough { actual: usize },

    #[error("{test_type} requires a frame count duration")]
    FrameDurationRequired { test_type: TestType },

    #[error("{test_type} requires a time duration")]
    TimeDurationRequired { test_type: TestType },

    #[error("Duration unit {unit} does not match duration type {duration_type}")]
    DurationUnitMismatch { unit: String, duration_type: String },

    #[error("Frame count {packets} exceeds the packet limit")]
    PacketLimitOverflow { packets: u64 },

    #[error("Value {value} must not exceed the maximum {maximum}")]
    RateRestriction { value: f64, maximum: f64 },

    #[error("Initial value {initial} must not be below the minimum {minimum}")]
    InitialBelowMinimum { initial: f64, minimum: f64 },

    #[error("Start value {start} must not be larger than end value {end}")]
    RangeRestriction { start: f64, end: f64 },

    #[error("Step value must be greater than 0")]
    StepValueRestriction,

    #[error("{field} = {value} is outside {range}")]
    ValueOutOfRange {
        field: &'static str,
        value: String,
        range: String,
    },

    // frame sizes
    #[error("Mixed frame sizes need exactly {expected} weights, got {actual}")]
    MixWeightsNotEnough { expected: usize, actual: usize },

    #[error("Mixed frame size weights must sum to 100, got {sum}")]
    MixWeightsSumError { sum: u64 },

    // payload identifiers
    #[error("Payload id {current} exceeds the port maximum {max}")]
    TpldIdExceed { current: u32, max: u32 },

    // port capabilities
    #[error("No capabilities supplied for port {slot}")]
    CapabilitiesMissing { slot: usize },

    #[error("Profile uses {count} segments, port {slot} supports {max}")]
    ProtocolSegmentExceed { slot: usize, count: usize, max: usize },

    #[error("Port {slot} does not support {protocol}")]
    ProtocolNotSupported { slot: usize, protocol: String },

    #[error("Header length {length} exceeds port {slot} maximum {max}")]
    PacketHeaderExceed { slot: usize, length: u32, max: u32 },

    #[error("Modifier repeat {repeat} exceeds port {slot} maximum {max}")]
    ModifierRepeatCountExceed { slot: usize, repeat: u32, max: u32 },

    #[error("{count} modifiers exceed port {slot} maximum {max}")]
    ModifierExceed { slot: usize, count: usize, max: usize },

    #[error("{count} streams exceed port {slot} maximum {max}")]
    StreamExceed { slot: usize, count: usize, max: usize },

    #[error("Port {slot} requires FEC to be enabled")]
    FecModeRequired { slot: usize },

    #[error("Port {slot} does not support FEC mode {mode}")]
    FecModeTypeNotSupported { slot: usize, mode: String },

    #[error("Custom rate cap {rate} bps exceeds port {slot} speed {max} bps")]
    PortRateError { slot: usize, rate: f64, max: f64 },

    #[error("Speed reduction {value} ppm exceeds port {slot} maximum {max}")]
    SpeedReductionError { slot: usize, value: u32, max: u32 },

    #[error("Inter-frame gap {value} on port {slot} is outside {min}..={max}")]
    InterFrameGapError {
        slot: usize,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Packet size {size} is below port {slot} minimum {min}")]
    MinPacketLengthExceed { slot: usize, size: u32, min: u32 },

    #[error("Packet size {size} is above port {slot} maximum {max}")]
    MaxPacketLengthExceed { slot: usize, size: u32, max: u32 },

    #[error("Packet size {size} is smaller than the {needed} bytes port {slot} needs")]
    PacketSizeTooSmall { slot: usize, size: u32, needed: u32 },

    #[error("Payload pattern of {length} bytes exceeds port {slot} maximum {max}")]
    PayloadPatternExceed { slot: usize, length: usize, max: usize },

    #[error("Port {slot} does not support micro TPLD")]
    MicroTpldNotSupported { slot: usize },
}

/// Errors raised while turning suite text into a [`crate::suite::TestSuiteConfiguration`].
#[derive(Error, Debug)]
pub enum SuiteParseError {
    #[error("JSON5 parse error: {0}")]
    Json5(String),

    #[error("Invalid duration '{value}': {reason}")]
    Duration { value: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
