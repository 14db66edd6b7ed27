//! Whole-suite configuration and the validation pipeline.
//!
//! A [`TestSuiteConfiguration`] is the declared input and is never mutated.
//! [`TestSuiteConfiguration::validate`] runs an ordered list of named passes
//! over it, stops at the first failure, and on success hands back a
//! [`ValidatedSuite`] holding the per-port derived state.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{debug, trace};

use crate::allocator::TpldIdAllocator;
use crate::capabilities::{self, PortCapabilities, TrafficDemand};
use crate::constants::{FlowCreationType, PortGroup, TestTopology, TidAllocationScope, TrafficDirection};
use crate::errors::{ConfigError, ConfigResult};
use crate::frame_size::FrameSizeConfiguration;
use crate::port::{PortConfiguration, PortDirection, ResolvedPort};
use crate::protocol::{self, ProfileRegistry, ProtocolSegmentProfile};
use crate::test_types::TestTypeConfig;

fn check_ms(field: &'static str, value: u64, min: u64, max: u64) -> ConfigResult<()> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::ValueOutOfRange {
            field,
            value: format!("{value}ms"),
            range: format!("[{min}ms, {max}ms]"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStreamConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_one")]
    pub per_port_stream_count: u32,
    #[serde(default = "default_one")]
    pub multi_stream_address_offset: u32,
}

fn default_one() -> u32 {
    1
}

impl Default for MultiStreamConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            per_port_stream_count: 1,
            multi_stream_address_offset: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResetConfig {
    #[serde(default)]
    pub stop_on_los: bool,
    #[serde(default)]
    pub delay_after_port_reset_ms: u64,
}

/// MAC/ARP learning phase run before traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_learning_rate_pct")]
    pub learning_rate_pct: f64,
    #[serde(default = "default_learning_duration_ms")]
    pub learning_duration_ms: u64,
    #[serde(default)]
    pub arp_refresh_enabled: bool,
    #[serde(default = "default_arp_refresh_period_ms")]
    pub arp_refresh_period_ms: u64,
}

fn default_learning_rate_pct() -> f64 {
    1.0
}

fn default_learning_duration_ms() -> u64 {
    5000
}

fn default_arp_refresh_period_ms() -> u64 {
    4000
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate_pct: default_learning_rate_pct(),
            learning_duration_ms: default_learning_duration_ms(),
            arp_refresh_enabled: false,
            arp_refresh_period_ms: default_arp_refresh_period_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleSyncConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_sync_ms")]
    pub sync_off_duration_ms: u64,
    #[serde(default = "default_sync_ms")]
    pub delay_after_sync_on_ms: u64,
}

fn default_sync_ms() -> u64 {
    1000
}

impl Default for ToggleSyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sync_off_duration_ms: default_sync_ms(),
            delay_after_sync_on_ms: default_sync_ms(),
        }
    }
}

/// Global execution parameters of a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
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
    #[serde(default = "default_payload_pattern")]
    pub payload_pattern: String,
    #[serde(default)]
    pub multi_stream: MultiStreamConfig,
    #[serde(default)]
    pub reset: ResetConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub toggle_sync: ToggleSyncConfig,
}

fn default_payload_pattern() -> String {
    "0000".to_string()
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            topology: TestTopology::default(),
            direction: TrafficDirection::default(),
            flow_creation_type: FlowCreationType::default(),
            tid_allocation_scope: TidAllocationScope::default(),
            require_ip_segment: false,
            use_micro_tpld_on_demand: false,
            payload_pattern: default_payload_pattern(),
            multi_stream: MultiStreamConfig::default(),
            reset: ResetConfig::default(),
            learning: LearningConfig::default(),
            toggle_sync: ToggleSyncConfig::default(),
        }
    }
}

impl ExecutionSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        check_ms(
            "delay_after_port_reset",
            self.reset.delay_after_port_reset_ms,
            0,
            60_000,
        )?;

        let rate = self.learning.learning_rate_pct;
        if !(rate > 0.0 && rate <= 100.0) {
            return Err(ConfigError::ValueOutOfRange {
                field: "learning_rate_pct",
                value: rate.to_string(),
                range: "(0, 100]".to_string(),
            });
        }
        check_ms(
            "learning_duration",
            self.learning.learning_duration_ms,
            1,
            u64::MAX,
        )?;
        if self.learning.arp_refresh_enabled {
            check_ms(
                "arp_refresh_period",
                self.learning.arp_refresh_period_ms,
                1,
                60_000,
            )?;
        }
        if self.toggle_sync.enabled {
            check_ms(
                "sync_off_duration",
                self.toggle_sync.sync_off_duration_ms,
                1000,
                60_000,
            )?;
            check_ms(
                "delay_after_sync_on",
                self.toggle_sync.delay_after_sync_on_ms,
                1000,
                60_000,
            )?;
        }
        if self.multi_stream.enabled && self.multi_stream.per_port_stream_count == 0 {
            return Err(ConfigError::ValueOutOfRange {
                field: "per_port_stream_count",
                value: "0".to_string(),
                range: "[1, inf)".to_string(),
            });
        }
        Ok(())
    }

    /// Streams a TX port opens towards each of its peers.
    pub fn per_port_stream_count(&self) -> usize {
        if self.multi_stream.enabled {
            self.multi_stream.per_port_stream_count as usize
        } else {
            1
        }
    }
}

/// A benchmark suite as declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: ExecutionSettings,
    #[serde(default)]
    pub frame_sizes: FrameSizeConfiguration,
    #[serde(default)]
    pub protocol_segments: ProfileRegistry,
    #[serde(default)]
    pub ports: Vec<PortConfiguration>,
    #[serde(default)]
    pub test_types: Vec<TestTypeConfig>,
}

/// TX/RX flags for every port under the global direction.
///
/// Loop ports and role-counted topologies keep both flags set.
pub fn resolve_directions(
    ports: &[PortConfiguration],
    topology: TestTopology,
    direction: TrafficDirection,
) -> Vec<PortDirection> {
    ports
        .iter()
        .map(|port| {
            let mut resolved = PortDirection::default();
            if port.is_loop() || topology.is_role_counted() {
                return resolved;
            }
            match (direction, port.port_group) {
                (TrafficDirection::EastToWest, PortGroup::East)
                | (TrafficDirection::WestToEast, PortGroup::West) => resolved.is_rx = false,
                (TrafficDirection::EastToWest, PortGroup::West)
                | (TrafficDirection::WestToEast, PortGroup::East) => resolved.is_tx = false,
                _ => {}
            }
            trace!(
                "Port {} resolved to tx={} rx={}",
                port.port_slot, resolved.is_tx, resolved.is_rx
            );
            resolved
        })
        .collect()
}

/// State threaded through the validation passes.
struct ValidationContext<'a> {
    suite: &'a TestSuiteConfiguration,
    directions: Vec<PortDirection>,
    profiles: Vec<ProtocolSegmentProfile>,
}

type Pass = for<'a> fn(&mut ValidationContext<'a>) -> ConfigResult<()>;

const PASSES: [(&str, Pass); 10] = [
    ("port_slots", check_port_slots),
    ("port_count", check_port_count),
    ("test_types_enabled", check_test_types_enabled),
    ("option_ranges", check_option_ranges),
    ("resolve_directions", resolve_port_directions),
    ("port_groups", check_port_groups),
    ("bind_profiles", bind_profiles),
    ("ip_addresses", check_ip_addresses),
    ("modifier_mode", check_modifier_mode),
    ("test_types", check_test_types),
];

fn check_port_slots(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    for (index, port) in ctx.suite.ports.iter().enumerate() {
        if port.port_slot != index {
            return Err(ConfigError::PortSlotMismatch {
                index,
                slot: port.port_slot,
            });
        }
    }
    Ok(())
}

fn check_port_count(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let required = if ctx.suite.settings.topology.is_pair_topology() {
        1
    } else {
        2
    };
    if ctx.suite.ports.len() < required {
        return Err(ConfigError::PortConfigNotEnough { required });
    }
    Ok(())
}

fn check_test_types_enabled(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    if !ctx.suite.test_types.iter().any(|t| t.is_enabled()) {
        return Err(ConfigError::TestTypeNotEnabled);
    }
    Ok(())
}

fn check_option_ranges(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let suite = ctx.suite;
    suite.settings.validate()?;
    suite.frame_sizes.validate()?;
    for profile in suite.protocol_segments.values() {
        profile.validate()?;
    }
    for test_type in &suite.test_types {
        test_type.validate_options()?;
    }
    Ok(())
}

fn resolve_port_directions(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let settings = &ctx.suite.settings;
    ctx.directions = resolve_directions(&ctx.suite.ports, settings.topology, settings.direction);
    Ok(())
}

fn check_port_groups(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let topology = ctx.suite.settings.topology;
    if topology.is_mesh_topology() || topology.is_role_counted() {
        return Ok(());
    }
    let ports = &ctx.suite.ports;
    let uses_peer = topology.is_pair_topology();

    let (mut east, mut west) = (0usize, 0usize);
    for port in ports {
        match port.port_group {
            PortGroup::East => {
                east += 1;
                if uses_peer && port.is_loop() {
                    west += 1;
                }
            }
            PortGroup::West => {
                west += 1;
                if uses_peer && port.is_loop() {
                    east += 1;
                }
            }
            PortGroup::Undefined => {
                return Err(ConfigError::PortGroupNeeded {
                    slot: port.port_slot,
                });
            }
            _ => {}
        }
        if uses_peer {
            check_port_peer(port, ports)?;
        }
    }
    for (count, group) in [(east, "East"), (west, "West")] {
        if count == 0 {
            return Err(ConfigError::PortGroupError {
                group: group.to_string(),
            });
        }
    }
    Ok(())
}

fn check_port_peer(port: &PortConfiguration, ports: &[PortConfiguration]) -> ConfigResult<()> {
    let slot = port.port_slot;
    let peer = match port.peer_slot {
        Some(peer) if peer < ports.len() => &ports[peer],
        _ => return Err(ConfigError::PortPeerNeeded { slot }),
    };
    if !port.is_pair(peer) || !peer.is_pair(port) {
        return Err(ConfigError::PortPeerInconsistent {
            slot,
            peer: peer.port_slot,
        });
    }
    Ok(())
}

fn bind_profiles(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    ctx.profiles = ctx
        .suite
        .ports
        .iter()
        .map(|port| protocol::bind(port, &ctx.suite.protocol_segments))
        .collect::<ConfigResult<_>>()?;
    Ok(())
}

fn check_ip_addresses(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let require_ip_segment = ctx.suite.settings.require_ip_segment;
    for (port, profile) in ctx.suite.ports.iter().zip(&ctx.profiles) {
        let slot = port.port_slot;
        port.check_prefixes()?;
        let version = profile.protocol_version();
        if !version.is_l3() {
            if require_ip_segment {
                return Err(ConfigError::NoIpSegment { slot });
            }
            continue;
        }
        let present = port
            .primary_address(version)
            .is_some_and(|addr: IpAddr| !addr.is_unspecified());
        if !present {
            return Err(ConfigError::IpAddressMissing {
                slot,
                ip_version: version.to_string(),
            });
        }
    }
    Ok(())
}

fn check_modifier_mode(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let settings = &ctx.suite.settings;
    if settings.flow_creation_type.is_stream_based() {
        return Ok(());
    }
    if settings.multi_stream.enabled {
        return Err(ConfigError::ModifierBasedNotSupportMultiStream);
    }
    for ((port, profile), direction) in ctx
        .suite
        .ports
        .iter()
        .zip(&ctx.profiles)
        .zip(&ctx.directions)
    {
        if profile.is_l3() {
            return Err(ConfigError::ModifierBasedNotSupportL3 {
                slot: port.port_slot,
            });
        }
        if direction.is_tx && profile.modifier_count() > 0 {
            return Err(ConfigError::ModifierBasedNotSupportDefineModifier {
                slot: port.port_slot,
            });
        }
    }
    Ok(())
}

fn check_test_types(ctx: &mut ValidationContext<'_>) -> ConfigResult<()> {
    let flow = ctx.suite.settings.flow_creation_type;
    for test_type in &ctx.suite.test_types {
        test_type.check_configuration(flow)?;
    }
    Ok(())
}

impl TestSuiteConfiguration {
    /// Run every validation pass in order and resolve the ports.
    pub fn validate(&self) -> ConfigResult<ValidatedSuite<'_>> {
        let mut ctx = ValidationContext {
            suite: self,
            directions: Vec::new(),
            profiles: Vec::new(),
        };
        for (name, pass) in PASSES {
            debug!("Suite '{}': running pass '{}'", self.id, name);
            pass(&mut ctx)?;
        }

        let ports = self
            .ports
            .iter()
            .zip(ctx.directions)
            .zip(ctx.profiles)
            .map(|((config, direction), profile)| ResolvedPort {
                config,
                direction,
                profile,
            })
            .collect();
        Ok(ValidatedSuite { suite: self, ports })
    }
}

/// A suite that passed validation, with its derived per-port state.
#[derive(Debug, Clone)]
pub struct ValidatedSuite<'a> {
    suite: &'a TestSuiteConfiguration,
    ports: Vec<ResolvedPort<'a>>,
}

impl<'a> ValidatedSuite<'a> {
    pub fn suite(&self) -> &'a TestSuiteConfiguration {
        self.suite
    }

    pub fn ports(&self) -> &[ResolvedPort<'a>] {
        &self.ports
    }

    pub fn port(&self, slot: usize) -> Option<&ResolvedPort<'a>> {
        self.ports.get(slot)
    }

    pub fn enabled_test_types(&self) -> impl Iterator<Item = &'a TestTypeConfig> {
        self.suite.test_types.iter().filter(|t| t.is_enabled())
    }

    /// Fresh payload id allocator for one run of this suite.
    pub fn allocator(&self) -> TpldIdAllocator {
        TpldIdAllocator::new(self.suite.settings.tid_allocation_scope)
    }

    /// `(source slot, destination slot)` for every port-to-port flow.
    ///
    /// Role-counted suites have no suite-level flows; each test type
    /// derives its own from its role handler.
    pub fn traffic_pairs(&self) -> Vec<(usize, usize)> {
        let settings = &self.suite.settings;
        let mut pairs = Vec::new();
        for source in self.ports.iter().filter(|p| p.is_tx()) {
            let slot = source.slot();
            match settings.topology {
                TestTopology::Pairs => {
                    if let Some(peer) = source.config.peer_slot.and_then(|s| self.ports.get(s)) {
                        if peer.is_rx() {
                            pairs.push((slot, peer.slot()));
                        }
                    }
                }
                TestTopology::Blocks => {
                    let target = match source.config.port_group {
                        PortGroup::East => PortGroup::West,
                        PortGroup::West => PortGroup::East,
                        _ => continue,
                    };
                    pairs.extend(
                        self.ports
                            .iter()
                            .filter(|d| d.is_rx() && d.config.port_group == target)
                            .map(|d| (slot, d.slot())),
                    );
                }
                TestTopology::Mesh => {
                    pairs.extend(
                        self.ports
                            .iter()
                            .filter(|d| d.is_rx() && d.slot() != slot)
                            .map(|d| (slot, d.slot())),
                    );
                }
                TestTopology::RoleCounted => {}
            }
        }
        pairs
    }

    /// Check every port against the capabilities reported for its slot.
    pub fn check_capabilities(&self, caps: &[PortCapabilities]) -> ConfigResult<()> {
        let settings = &self.suite.settings;
        let pairs = self.traffic_pairs();
        let demand = TrafficDemand {
            frame_sizes: &self.suite.frame_sizes,
            payload_pattern: &settings.payload_pattern,
            use_micro_tpld_on_demand: settings.use_micro_tpld_on_demand,
            is_stream_based: settings.flow_creation_type.is_stream_based(),
            per_port_stream_count: settings.per_port_stream_count(),
        };

        let lookup = |slot: usize| caps.get(slot).ok_or(ConfigError::CapabilitiesMissing { slot });
        for port in &self.ports {
            let port_caps = lookup(port.slot())?;
            let peers = pairs.iter().filter(|(src, _)| *src == port.slot()).count();
            capabilities::check_port_config(port, port_caps)?;
            capabilities::check_port_traffic(port, port_caps, &demand, peers)?;
        }

        let mut destinations = Vec::new();
        for port in &self.ports {
            let sources = pairs.iter().filter(|(_, dst)| *dst == port.slot()).count();
            if sources > 0 {
                destinations.push((lookup(port.slot())?, sources));
            }
        }
        capabilities::check_tid_limitations(
            settings.tid_allocation_scope,
            demand.is_stream_based,
            destinations,
        )
    }
}
