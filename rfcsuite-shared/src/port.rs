//! Declared and resolved port configuration.
//!
//! [`PortConfiguration`] is what the suite declares and never changes after
//! parsing. [`ResolvedPort`] is produced once by the validation pass and adds
//! the derived TX/RX flags and the bound profile copy.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::constants::{
    BrrMode, FecMode, MdiMdixMode, PortGroup, PortRateCapProfile, PortRateCapUnit, PortSpeedMode,
};
use crate::errors::ConfigResult;
use crate::field::{AddressExt, MacAddress, Network};
use crate::protocol::{PortProtocolVersion, ProtocolSegmentProfile};

/// Addressing block for one IP family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + AddressExt"))]
pub struct IpProperties<A> {
    pub address: A,
    #[serde(default = "default_routing_prefix")]
    pub routing_prefix: u8,
    #[serde(default = "AddressExt::unspecified")]
    pub public_address: A,
    #[serde(default = "default_routing_prefix")]
    pub public_routing_prefix: u8,
    #[serde(default = "AddressExt::unspecified")]
    pub gateway: A,
    #[serde(default = "AddressExt::unspecified")]
    pub remote_loop_address: A,
}

fn default_routing_prefix() -> u8 {
    24
}

pub type Ipv4Properties = IpProperties<Ipv4Addr>;
pub type Ipv6Properties = IpProperties<Ipv6Addr>;

impl Default for Ipv4Properties {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            routing_prefix: default_routing_prefix(),
            public_address: Ipv4Addr::UNSPECIFIED,
            public_routing_prefix: default_routing_prefix(),
            gateway: Ipv4Addr::UNSPECIFIED,
            remote_loop_address: Ipv4Addr::UNSPECIFIED,
        }
    }
}

impl Default for Ipv6Properties {
    fn default() -> Self {
        Self {
            address: Ipv6Addr::UNSPECIFIED,
            routing_prefix: default_routing_prefix(),
            public_address: Ipv6Addr::UNSPECIFIED,
            public_routing_prefix: default_routing_prefix(),
            gateway: Ipv6Addr::UNSPECIFIED,
            remote_loop_address: Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl<A: AddressExt> IpProperties<A> {
    /// Address peers should send to: the public (NAT) address when set.
    pub fn dst_addr(&self) -> A {
        if self.public_address.is_empty() {
            self.address
        } else {
            self.public_address
        }
    }

    pub fn network(&self) -> ConfigResult<Network> {
        self.address.network(self.routing_prefix)
    }

    /// Both prefixes must fit the address family.
    pub fn check_prefixes(&self) -> ConfigResult<()> {
        self.address.network(self.routing_prefix)?;
        self.public_address.network(self.public_routing_prefix)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortRateCap {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub profile: PortRateCapProfile,
    #[serde(default)]
    pub unit: PortRateCapUnit,
}

impl PortRateCap {
    pub fn bits_per_second(&self) -> f64 {
        self.value * self.unit.scale()
    }

    pub fn is_custom(&self) -> bool {
        self.enabled && self.profile == PortRateCapProfile::CustomRateCap
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPortProperties {
    #[serde(default)]
    pub speed_mode: PortSpeedMode,
    #[serde(default = "default_inter_frame_gap")]
    pub inter_frame_gap: u32,
    #[serde(default)]
    pub speed_reduction_ppm: u32,
    #[serde(default)]
    pub pause_mode_enabled: bool,
    #[serde(default)]
    pub latency_offset_ms: i32,
    #[serde(default)]
    pub fec_mode: FecMode,
}

fn default_inter_frame_gap() -> u32 {
    20
}

impl Default for PhysicalPortProperties {
    fn default() -> Self {
        Self {
            speed_mode: PortSpeedMode::default(),
            inter_frame_gap: default_inter_frame_gap(),
            speed_reduction_ppm: 0,
            pause_mode_enabled: false,
            latency_offset_ms: 0,
            fec_mode: FecMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerNegotiation {
    #[serde(default)]
    pub auto_neg_enabled: bool,
    #[serde(default)]
    pub anlt_enabled: bool,
    #[serde(default)]
    pub mdi_mdix_mode: MdiMdixMode,
    #[serde(default)]
    pub broadr_reach_mode: BrrMode,
}

/// Stable hardware location of a test port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PortIdentity {
    pub tester_index: u32,
    pub module_index: u16,
    pub port_index: u16,
}

impl PortIdentity {
    pub fn new(tester_index: u32, module_index: u16, port_index: u16) -> Self {
        Self {
            tester_index,
            module_index,
            port_index,
        }
    }

    /// Display name such as `P-0-2-1`.
    pub fn name(&self) -> String {
        format!(
            "P-{}-{}-{}",
            self.tester_index, self.module_index, self.port_index
        )
    }
}

/// One physical port as declared by the suite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortConfiguration {
    pub port_slot: usize,
    #[serde(default)]
    pub peer_slot: Option<usize>,
    #[serde(default)]
    pub port_group: PortGroup,
    #[serde(default)]
    pub identity: PortIdentity,
    pub profile_id: String,
    #[serde(default)]
    pub ipv4_properties: Option<Ipv4Properties>,
    #[serde(default)]
    pub ipv6_properties: Option<Ipv6Properties>,
    #[serde(default)]
    pub ip_gateway_mac_address: MacAddress,
    #[serde(default)]
    pub remote_loop_mac_address: MacAddress,
    #[serde(default)]
    pub reply_arp_requests: bool,
    #[serde(default)]
    pub reply_ping_requests: bool,
    #[serde(default)]
    pub rate_cap: PortRateCap,
    #[serde(default)]
    pub physical: PhysicalPortProperties,
    #[serde(default)]
    pub negotiation: PeerNegotiation,
}

impl PortConfiguration {
    pub fn is_loop(&self) -> bool {
        self.peer_slot == Some(self.port_slot)
    }

    /// True when `other` names this port as its peer.
    pub fn is_pair(&self, other: &PortConfiguration) -> bool {
        other.peer_slot == Some(self.port_slot)
    }

    /// Prefix lengths of every configured address block.
    pub fn check_prefixes(&self) -> ConfigResult<()> {
        if let Some(ipv4) = &self.ipv4_properties {
            ipv4.check_prefixes()?;
        }
        if let Some(ipv6) = &self.ipv6_properties {
            ipv6.check_prefixes()?;
        }
        Ok(())
    }

    /// Primary address for the given family, if that block is configured.
    pub fn primary_address(&self, version: PortProtocolVersion) -> Option<IpAddr> {
        match version {
            PortProtocolVersion::Ethernet => None,
            PortProtocolVersion::Ipv4 => self
                .ipv4_properties
                .as_ref()
                .map(|p| IpAddr::V4(p.address)),
            PortProtocolVersion::Ipv6 => self
                .ipv6_properties
                .as_ref()
                .map(|p| IpAddr::V6(p.address)),
        }
    }
}

/// TX/RX flags derived for one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDirection {
    pub is_tx: bool,
    pub is_rx: bool,
}

impl Default for PortDirection {
    fn default() -> Self {
        Self {
            is_tx: true,
            is_rx: true,
        }
    }
}

/// A declared port joined with everything the validation pass derived for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPort<'a> {
    pub config: &'a PortConfiguration,
    pub direction: PortDirection,
    pub profile: ProtocolSegmentProfile,
}

impl<'a> ResolvedPort<'a> {
    pub fn slot(&self) -> usize {
        self.config.port_slot
    }

    pub fn is_tx(&self) -> bool {
        self.direction.is_tx
    }

    pub fn is_rx(&self) -> bool {
        self.direction.is_rx
    }

    pub fn protocol_version(&self) -> PortProtocolVersion {
        self.profile.protocol_version()
    }

    /// Destination address peers use for this port under its profile family.
    pub fn dst_addr(&self) -> Option<IpAddr> {
        match self.protocol_version() {
            PortProtocolVersion::Ethernet => None,
            PortProtocolVersion::Ipv4 => self
                .config
                .ipv4_properties
                .as_ref()
                .map(|p| IpAddr::V4(p.dst_addr())),
            PortProtocolVersion::Ipv6 => self
                .config
                .ipv6_properties
                .as_ref()
                .map(|p| IpAddr::V6(p.dst_addr())),
        }
    }
}
