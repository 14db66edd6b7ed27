//! Protocol segment profiles.
//!
//! A profile is the ordered header stack (Ethernet, VLAN, IPv4, UDP, ...) a
//! port's traffic carries. Profiles are declared once per suite and bound to
//! ports by value: every port gets its own copy, so per-port changes never
//! leak back into the shared template.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::ModifierAction;
use crate::errors::{ConfigError, ConfigResult};
use crate::field::BinaryString;
use crate::port::PortConfiguration;

/// Profiles of a suite keyed by profile id.
pub type ProfileRegistry = BTreeMap<String, ProtocolSegmentProfile>;

/// Header kinds a profile may be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SegmentType {
    Ethernet,
    Vlan,
    Arp,
    Ipv4,
    Ipv6,
    Udp,
    Tcp,
    Llc,
    Snap,
    Gtp,
    Icmp,
    Icmpv6,
    Rtp,
    Rtcp,
    Stp,
    Sctp,
    MacCtrl,
    Mpls,
    PbbTag,
    Fcoe,
    Fc,
    FcoeTail,
    Igmpv3L0,
    Igmpv3L1,
    UdpCheck,
    Igmpv2,
    GreNoCheck,
    GreCheck,
    TcpCheck,
    Igmpv1,
    Vxlan,
    Nvgre,
    /// Raw segment of 1..=64 bytes.
    Raw(u8),
}

const NAMED_SEGMENTS: &[(&str, SegmentType)] = &[
    ("ethernet", SegmentType::Ethernet),
    ("vlan", SegmentType::Vlan),
    ("arp", SegmentType::Arp),
    ("ipv4", SegmentType::Ipv4),
    ("ipv6", SegmentType::Ipv6),
    ("udp", SegmentType::Udp),
    ("tcp", SegmentType::Tcp),
    ("llc", SegmentType::Llc),
    ("snap", SegmentType::Snap),
    ("gtp", SegmentType::Gtp),
    ("icmp", SegmentType::Icmp),
    ("icmpv6", SegmentType::Icmpv6),
    ("rtp", SegmentType::Rtp),
    ("rtcp", SegmentType::Rtcp),
    ("stp", SegmentType::Stp),
    ("sctp", SegmentType::Sctp),
    ("macctrl", SegmentType::MacCtrl),
    ("mpls", SegmentType::Mpls),
    ("pbbtag", SegmentType::PbbTag),
    ("fcoe", SegmentType::Fcoe),
    ("fc", SegmentType::Fc),
    ("fcoetail", SegmentType::FcoeTail),
    ("igmpv3l0", SegmentType::Igmpv3L0),
    ("igmpv3l1", SegmentType::Igmpv3L1),
    ("udpcheck", SegmentType::UdpCheck),
    ("igmpv2", SegmentType::Igmpv2),
    ("gre_nocheck", SegmentType::GreNoCheck),
    ("gre_check", SegmentType::GreCheck),
    ("tcpcheck", SegmentType::TcpCheck),
    ("igmpv1", SegmentType::Igmpv1),
    ("vxlan", SegmentType::Vxlan),
    ("nvgre", SegmentType::Nvgre),
];

impl SegmentType {
    pub fn is_ipv4(&self) -> bool {
        matches!(self, SegmentType::Ipv4)
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, SegmentType::Ipv6)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, SegmentType::Raw(_))
    }
}

impl FromStr for SegmentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix("raw_") {
            return match n.parse::<u8>() {
                Ok(len @ 1..=64) => Ok(SegmentType::Raw(len)),
                _ => Err(ConfigError::UnknownSegmentType {
                    value: s.to_string(),
                }),
            };
        }
        NAMED_SEGMENTS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| ConfigError::UnknownSegmentType {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let SegmentType::Raw(n) = self {
            return write!(f, "raw_{n}");
        }
        let name = NAMED_SEGMENTS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

impl TryFrom<String> for SegmentType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SegmentType> for String {
    fn from(value: SegmentType) -> Self {
        value.to_string()
    }
}

/// IP family a profile carries, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortProtocolVersion {
    Ethernet,
    Ipv4,
    Ipv6,
}

impl PortProtocolVersion {
    pub fn is_l3(&self) -> bool {
        !matches!(self, PortProtocolVersion::Ethernet)
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, PortProtocolVersion::Ipv4)
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, PortProtocolVersion::Ipv6)
    }
}

impl fmt::Display for PortProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortProtocolVersion::Ethernet => f.write_str("Ethernet"),
            PortProtocolVersion::Ipv4 => f.write_str("IPv4"),
            PortProtocolVersion::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// Hardware modifier sweeping a field through `start..=stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HwModifier {
    #[serde(default)]
    pub start_value: u32,
    #[serde(default = "default_step")]
    pub step_value: u32,
    #[serde(default)]
    pub stop_value: u32,
    #[serde(default = "default_step")]
    pub repeat: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub action: ModifierAction,
    #[serde(default = "default_mask")]
    pub mask: String,
}

fn default_step() -> u32 {
    1
}

fn default_mask() -> String {
    "FFFF0000".to_string()
}

impl HwModifier {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.step_value == 0 {
            return Err(ConfigError::StepValueRestriction);
        }
        let span = self.stop_value.abs_diff(self.start_value);
        if span % self.step_value != 0 {
            return Err(ConfigError::ModifierRangeError {
                start: self.start_value,
                stop: self.stop_value,
                step: self.step_value,
            });
        }
        Ok(())
    }
}

/// Software value range applied to a field per stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub start_value: u64,
    #[serde(default = "default_range_step")]
    pub step_value: u64,
    pub stop_value: u64,
    #[serde(default)]
    pub action: ModifierAction,
    #[serde(default)]
    pub restart_for_each_port: bool,
}

fn default_range_step() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentField {
    pub name: String,
    pub value: BinaryString,
    pub bit_length: u32,
    #[serde(default)]
    pub hw_modifier: Option<HwModifier>,
    #[serde(default)]
    pub value_range: Option<ValueRange>,
}

impl SegmentField {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.value.bit_length() != self.bit_length {
            return Err(ConfigError::FieldLengthMismatch {
                field: self.name.clone(),
                expected: self.bit_length,
                actual: self.value.bit_length(),
            });
        }
        if let Some(modifier) = &self.hw_modifier {
            modifier.validate()?;
        }
        if let Some(range) = &self.value_range {
            if range.step_value == 0 {
                return Err(ConfigError::StepValueRestriction);
            }
            let max = if self.bit_length >= 64 {
                u64::MAX
            } else {
                (1u64 << self.bit_length) - 1
            };
            if range.start_value.max(range.stop_value) > max {
                return Err(ConfigError::ValueRangeExceed {
                    field: self.name.clone(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Replace the field value; the new value must keep the field width.
    pub fn set_field_value(&mut self, value: BinaryString) -> ConfigResult<()> {
        if value.bit_length() != self.bit_length {
            return Err(ConfigError::FieldLengthMismatch {
                field: self.name.clone(),
                expected: self.bit_length,
                actual: value.bit_length(),
            });
        }
        self.value = value;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSegment {
    pub segment_type: SegmentType,
    #[serde(default)]
    pub fields: Vec<SegmentField>,
    #[serde(default)]
    pub checksum_offset: Option<u32>,
}

impl ProtocolSegment {
    pub fn bit_length(&self) -> u32 {
        self.fields.iter().map(|f| f.bit_length).sum()
    }

    pub fn field(&self, name: &str) -> Option<&SegmentField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut SegmentField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn hw_modifiers(&self) -> impl Iterator<Item = &HwModifier> {
        self.fields.iter().filter_map(|f| f.hw_modifier.as_ref())
    }
}

/// Ordered header stack identified by an opaque id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSegmentProfile {
    pub id: String,
    #[serde(default)]
    pub segments: Vec<ProtocolSegment>,
}

impl ProtocolSegmentProfile {
    /// Family of the first IP-bearing segment.
    pub fn protocol_version(&self) -> PortProtocolVersion {
        self.segments
            .iter()
            .find_map(|s| match s.segment_type {
                SegmentType::Ipv4 => Some(PortProtocolVersion::Ipv4),
                SegmentType::Ipv6 => Some(PortProtocolVersion::Ipv6),
                _ => None,
            })
            .unwrap_or(PortProtocolVersion::Ethernet)
    }

    pub fn is_l3(&self) -> bool {
        self.protocol_version().is_l3()
    }

    /// Header length in bytes.
    pub fn packet_header_length(&self) -> u32 {
        self.segments.iter().map(|s| s.bit_length()).sum::<u32>() / 8
    }

    pub fn modifier_count(&self) -> usize {
        self.segments.iter().map(|s| s.hw_modifiers().count()).sum()
    }

    pub fn segment_types(&self) -> impl Iterator<Item = SegmentType> + '_ {
        self.segments.iter().map(|s| s.segment_type)
    }

    pub fn contains(&self, kind: SegmentType) -> bool {
        self.segment_types().any(|t| t == kind)
    }

    pub fn hw_modifiers(&self) -> impl Iterator<Item = &HwModifier> {
        self.segments.iter().flat_map(|s| s.hw_modifiers())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for field in self.segments.iter().flat_map(|s| s.fields.iter()) {
            field.validate()?;
        }
        Ok(())
    }
}

/// Look up `port.profile_id` and hand back an owned copy for that port.
pub fn bind(
    port: &PortConfiguration,
    profiles: &ProfileRegistry,
) -> ConfigResult<ProtocolSegmentProfile> {
    profiles
        .get(&port.profile_id)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileMissing {
            profile_id: port.profile_id.clone(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn field(name: &str, bits: u32) -> SegmentField {
        SegmentField {
            name: name.to_string(),
            value: BinaryString::zeros(bits),
            bit_length: bits,
            hw_modifier: None,
            value_range: None,
        }
    }

    pub(crate) fn segment(kind: SegmentType, bytes: u32) -> ProtocolSegment {
        ProtocolSegment {
            segment_type: kind,
            fields: vec![field("data", bytes * 8)],
            checksum_offset: None,
        }
    }

    pub(crate) fn ethernet_only(id: &str) -> ProtocolSegmentProfile {
        ProtocolSegmentProfile {
            id: id.to_string(),
            segments: vec![segment(SegmentType::Ethernet, 14)],
        }
    }

    pub(crate) fn udp_over(id: &str, ip: SegmentType) -> ProtocolSegmentProfile {
        let ip_len = if ip.is_ipv6() { 40 } else { 20 };
        ProtocolSegmentProfile {
            id: id.to_string(),
            segments: vec![
                segment(SegmentType::Ethernet, 14),
                segment(ip, ip_len),
                segment(SegmentType::Udp, 8),
            ],
        }
    }

    #[test]
    fn test_segment_type_names() {
        assert_eq!("ipv4".parse::<SegmentType>().unwrap(), SegmentType::Ipv4);
        assert_eq!("RAW_12".parse::<SegmentType>().unwrap(), SegmentType::Raw(12));
        assert!("raw_0".parse::<SegmentType>().is_err());
        assert!("raw_65".parse::<SegmentType>().is_err());
        assert!("ipx".parse::<SegmentType>().is_err());
        assert_eq!(SegmentType::GreNoCheck.to_string(), "gre_nocheck");
        assert_eq!(SegmentType::Raw(3).to_string(), "raw_3");
    }

    #[test]
    fn test_profile_version_uses_first_ip_segment() {
        assert_eq!(
            ethernet_only("eth").protocol_version(),
            PortProtocolVersion::Ethernet
        );
        assert!(!ethernet_only("eth").is_l3());

        let mut profile = udp_over("v6", SegmentType::Ipv6);
        profile.segments.push(segment(SegmentType::Ipv4, 20));
        assert_eq!(profile.protocol_version(), PortProtocolVersion::Ipv6);
        assert!(profile.is_l3());
    }

    #[test]
    fn test_header_length_and_modifiers() {
        let mut profile = udp_over("udp", SegmentType::Ipv4);
        assert_eq!(profile.packet_header_length(), 42);
        assert_eq!(profile.modifier_count(), 0);

        profile.segments[0].fields[0].hw_modifier = Some(HwModifier {
            start_value: 0,
            step_value: 1,
            stop_value: 10,
            repeat: 1,
            offset: 0,
            action: ModifierAction::Increment,
            mask: default_mask(),
        });
        assert_eq!(profile.modifier_count(), 1);
    }

    #[test]
    fn test_modifier_range_must_be_reachable() {
        let modifier = HwModifier {
            start_value: 0,
            step_value: 3,
            stop_value: 10,
            repeat: 1,
            offset: 0,
            action: ModifierAction::Increment,
            mask: default_mask(),
        };
        assert!(matches!(
            modifier.validate(),
            Err(ConfigError::ModifierRangeError { .. })
        ));
        let zero_step = HwModifier {
            step_value: 0,
            ..modifier
        };
        assert_eq!(zero_step.validate(), Err(ConfigError::StepValueRestriction));
    }

    #[test]
    fn test_value_range_bounded_by_field_width() {
        let mut f = field("ttl", 8);
        f.value_range = Some(ValueRange {
            start_value: 1,
            step_value: 1,
            stop_value: 256,
            action: ModifierAction::Increment,
            restart_for_each_port: false,
        });
        assert!(matches!(
            f.validate(),
            Err(ConfigError::ValueRangeExceed { max: 255, .. })
        ));
    }

    #[test]
    fn test_set_field_value_checks_width() {
        let mut f = field("flags", 4);
        assert!(f.set_field_value(BinaryString::new("1010").unwrap()).is_ok());
        assert!(matches!(
            f.set_field_value(BinaryString::new("10").unwrap()),
            Err(ConfigError::FieldLengthMismatch { expected: 4, actual: 2, .. })
        ));
    }
}
