//! Hardware capability limits and the checks run against them.
//!
//! Capabilities are reported by the tester for each port and handed in by
//! the execution engine; nothing here talks to hardware.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FecMode, MICRO_TPLD_TOTAL_LENGTH, STANDARD_TPLD_TOTAL_LENGTH, TidAllocationScope,
};
use crate::errors::{ConfigError, ConfigResult};
use crate::frame_size::FrameSizeConfiguration;
use crate::port::{PortIdentity, ResolvedPort};
use crate::protocol::{ProtocolSegmentProfile, SegmentType};

const FEC_RS_KR: u32 = 1 << 0;
const FEC_RS_KP: u32 = 1 << 1;
const FEC_FC: u32 = 1 << 2;
const FEC_MANDATORY: u32 = 1 << 31;

/// Limits of one test port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortCapabilities {
    pub max_protocol_segments: usize,
    pub can_tcp_checksum: bool,
    pub can_udp_checksum: bool,
    pub max_header_length: u32,
    pub max_repeat: u32,
    /// Bitmask: 0 RS FEC KR, 1 RS FEC KP, 2 FC FEC, 31 FEC mandatory.
    pub can_fec: u32,
    pub max_speed_mbps: u32,
    pub max_speed_reduction: u32,
    pub min_interframe_gap: u32,
    pub max_interframe_gap: u32,
    pub max_modifiers: usize,
    pub max_streams_per_port: usize,
    pub min_packet_length: u32,
    pub max_packet_length: u32,
    pub max_pattern_length: usize,
    pub can_micro_tpld: bool,
    pub max_tpld_stats: u32,
}

impl Default for PortCapabilities {
    fn default() -> Self {
        Self {
            max_protocol_segments: 8,
            can_tcp_checksum: false,
            can_udp_checksum: false,
            max_header_length: 128,
            max_repeat: 15,
            can_fec: 0,
            max_speed_mbps: 10_000,
            max_speed_reduction: 1000,
            min_interframe_gap: 16,
            max_interframe_gap: 56,
            max_modifiers: 3,
            max_streams_per_port: 256,
            min_packet_length: 64,
            max_packet_length: 12_288,
            max_pattern_length: 18,
            can_micro_tpld: false,
            max_tpld_stats: 1024,
        }
    }
}

/// A port as seen by stream creation: stable key plus its limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPort {
    pub identity: PortIdentity,
    pub capabilities: PortCapabilities,
}

impl TestPort {
    pub fn new(identity: PortIdentity, capabilities: PortCapabilities) -> Self {
        Self {
            identity,
            capabilities,
        }
    }
}

/// Whether the port accepts `mode` given its FEC bitmask.
pub fn check_can_fec(slot: usize, can_fec: u32, mode: FecMode) -> ConfigResult<()> {
    match mode {
        FecMode::Off if can_fec & FEC_MANDATORY != 0 => Err(ConfigError::FecModeRequired { slot }),
        FecMode::FcFec if can_fec & FEC_FC == 0 => Err(ConfigError::FecModeTypeNotSupported {
            slot,
            mode: mode.to_string(),
        }),
        FecMode::On => {
            // exactly one RS flavour must be offered
            let rs = can_fec & (FEC_RS_KR | FEC_RS_KP);
            if rs == 0 || rs == FEC_RS_KR | FEC_RS_KP {
                return Err(ConfigError::FecModeTypeNotSupported {
                    slot,
                    mode: mode.to_string(),
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Segment count, checksum offload, header length and modifier repeat.
pub fn check_profile(
    slot: usize,
    caps: &PortCapabilities,
    profile: &ProtocolSegmentProfile,
) -> ConfigResult<()> {
    let count = profile.segments.len();
    if count > caps.max_protocol_segments {
        return Err(ConfigError::ProtocolSegmentExceed {
            slot,
            count,
            max: caps.max_protocol_segments,
        });
    }
    if profile.contains(SegmentType::TcpCheck) && !caps.can_tcp_checksum {
        return Err(ConfigError::ProtocolNotSupported {
            slot,
            protocol: "TCPCHECK".to_string(),
        });
    }
    if profile.contains(SegmentType::UdpCheck) && !caps.can_udp_checksum {
        return Err(ConfigError::ProtocolNotSupported {
            slot,
            protocol: "UDPCHECK".to_string(),
        });
    }
    let length = profile.packet_header_length();
    if length > caps.max_header_length {
        return Err(ConfigError::PacketHeaderExceed {
            slot,
            length,
            max: caps.max_header_length,
        });
    }
    if let Some(modifier) = profile.hw_modifiers().find(|m| m.repeat > caps.max_repeat) {
        return Err(ConfigError::ModifierRepeatCountExceed {
            slot,
            repeat: modifier.repeat,
            max: caps.max_repeat,
        });
    }
    Ok(())
}

/// Physical settings of one port against its limits.
pub fn check_port_config(port: &ResolvedPort<'_>, caps: &PortCapabilities) -> ConfigResult<()> {
    let slot = port.slot();
    let config = port.config;

    let max_rate = f64::from(caps.max_speed_mbps) * 1_000_000.0;
    if config.rate_cap.is_custom() && config.rate_cap.bits_per_second() > max_rate {
        return Err(ConfigError::PortRateError {
            slot,
            rate: config.rate_cap.bits_per_second(),
            max: max_rate,
        });
    }

    let physical = &config.physical;
    if physical.speed_reduction_ppm > caps.max_speed_reduction {
        return Err(ConfigError::SpeedReductionError {
            slot,
            value: physical.speed_reduction_ppm,
            max: caps.max_speed_reduction,
        });
    }
    if !(caps.min_interframe_gap..=caps.max_interframe_gap).contains(&physical.inter_frame_gap) {
        return Err(ConfigError::InterFrameGapError {
            slot,
            value: physical.inter_frame_gap,
            min: caps.min_interframe_gap,
            max: caps.max_interframe_gap,
        });
    }
    check_can_fec(slot, caps.can_fec, physical.fec_mode)?;
    check_profile(slot, caps, &port.profile)
}

/// Suite-wide traffic parameters a port has to carry.
#[derive(Debug, Clone, Copy)]
pub struct TrafficDemand<'a> {
    pub frame_sizes: &'a FrameSizeConfiguration,
    pub payload_pattern: &'a str,
    pub use_micro_tpld_on_demand: bool,
    pub is_stream_based: bool,
    pub per_port_stream_count: usize,
}

/// Payload id trailer length the port will use.
pub fn tpld_total_length(caps: &PortCapabilities, use_micro_tpld_on_demand: bool) -> u32 {
    if use_micro_tpld_on_demand && caps.can_micro_tpld {
        MICRO_TPLD_TOTAL_LENGTH
    } else {
        STANDARD_TPLD_TOTAL_LENGTH
    }
}

/// Frame sizes, payload and stream demand of the suite against one port.
///
/// `peer_count` is the number of ports this port sends to.
pub fn check_port_traffic(
    port: &ResolvedPort<'_>,
    caps: &PortCapabilities,
    demand: &TrafficDemand<'_>,
    peer_count: usize,
) -> ConfigResult<()> {
    let slot = port.slot();

    // pattern is hex text, two characters per byte
    let length = demand.payload_pattern.len() / 2;
    if length > caps.max_pattern_length {
        return Err(ConfigError::PayloadPatternExceed {
            slot,
            length,
            max: caps.max_pattern_length,
        });
    }
    if demand.use_micro_tpld_on_demand && !caps.can_micro_tpld {
        return Err(ConfigError::MicroTpldNotSupported { slot });
    }

    let (min_size, max_size) = demand.frame_sizes.size_range();
    if min_size < caps.min_packet_length {
        return Err(ConfigError::MinPacketLengthExceed {
            slot,
            size: min_size,
            min: caps.min_packet_length,
        });
    }
    if max_size > caps.max_packet_length {
        return Err(ConfigError::MaxPacketLengthExceed {
            slot,
            size: max_size,
            max: caps.max_packet_length,
        });
    }
    let needed = port.profile.packet_header_length()
        + tpld_total_length(caps, demand.use_micro_tpld_on_demand);
    if min_size < needed {
        return Err(ConfigError::PacketSizeTooSmall {
            slot,
            size: min_size,
            needed,
        });
    }

    if !port.is_tx() {
        return Ok(());
    }
    let modifiers = port.profile.modifier_count();
    if demand.is_stream_based {
        if modifiers > caps.max_modifiers {
            return Err(ConfigError::ModifierExceed {
                slot,
                count: modifiers,
                max: caps.max_modifiers,
            });
        }
        let streams = peer_count * demand.per_port_stream_count;
        if streams > caps.max_streams_per_port {
            return Err(ConfigError::StreamExceed {
                slot,
                count: streams,
                max: caps.max_streams_per_port,
            });
        }
    } else if modifiers > 0 {
        return Err(ConfigError::ModifierBasedNotSupportDefineModifier { slot });
    }
    Ok(())
}

/// Configuration-scope ids are shared by every destination, so the running
/// total of sources must stay within each destination's payload-id table.
///
/// `destinations` yields, per receiving port, its capabilities and the
/// number of ports sending to it.
pub fn check_tid_limitations<'c>(
    scope: TidAllocationScope,
    is_stream_based: bool,
    destinations: impl IntoIterator<Item = (&'c PortCapabilities, usize)>,
) -> ConfigResult<()> {
    if !is_stream_based || scope != TidAllocationScope::ConfigurationScope {
        return Ok(());
    }
    let mut total = 0u32;
    for (caps, sources) in destinations {
        total += sources as u32;
        if total > caps.max_tpld_stats {
            return Err(ConfigError::TpldIdExceed {
                current: total,
                max: caps.max_tpld_stats,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PacketSizeType, PortGroup, PortRateCapProfile, PortRateCapUnit};
    use crate::port::PortDirection;
    use crate::port::tests::port;
    use crate::protocol::tests::{ethernet_only, udp_over};

    fn demand(frame_sizes: &FrameSizeConfiguration) -> TrafficDemand<'_> {
        TrafficDemand {
            frame_sizes,
            payload_pattern: "0000",
            use_micro_tpld_on_demand: false,
            is_stream_based: true,
            per_port_stream_count: 1,
        }
    }

    #[test]
    fn test_fec_bitmask() {
        assert_eq!(
            check_can_fec(0, FEC_MANDATORY | FEC_RS_KR, FecMode::Off),
            Err(ConfigError::FecModeRequired { slot: 0 })
        );
        assert!(check_can_fec(0, FEC_RS_KR, FecMode::Off).is_ok());
        assert!(check_can_fec(0, FEC_RS_KP, FecMode::On).is_ok());
        assert!(check_can_fec(0, 0, FecMode::On).is_err());
        assert!(check_can_fec(0, FEC_RS_KR | FEC_RS_KP, FecMode::On).is_err());
        assert!(check_can_fec(0, FEC_RS_KR, FecMode::FcFec).is_err());
        assert!(check_can_fec(0, FEC_FC, FecMode::FcFec).is_ok());
    }

    #[test]
    fn test_profile_limits() {
        let caps = PortCapabilities {
            max_protocol_segments: 2,
            ..Default::default()
        };
        let profile = udp_over("udp", SegmentType::Ipv4);
        assert_eq!(
            check_profile(3, &caps, &profile),
            Err(ConfigError::ProtocolSegmentExceed {
                slot: 3,
                count: 3,
                max: 2
            })
        );

        let caps = PortCapabilities {
            max_header_length: 40,
            ..Default::default()
        };
        assert_eq!(
            check_profile(3, &caps, &profile),
            Err(ConfigError::PacketHeaderExceed {
                slot: 3,
                length: 42,
                max: 40
            })
        );
    }

    #[test]
    fn test_port_config_limits() {
        let mut config = port(0, Some(1), PortGroup::East);
        config.rate_cap.enabled = true;
        config.rate_cap.profile = PortRateCapProfile::CustomRateCap;
        config.rate_cap.unit = PortRateCapUnit::Gbps;
        config.rate_cap.value = 25.0;
        let resolved = ResolvedPort {
            config: &config,
            direction: PortDirection::default(),
            profile: ethernet_only("eth"),
        };
        let caps = PortCapabilities::default();
        assert!(matches!(
            check_port_config(&resolved, &caps),
            Err(ConfigError::PortRateError { slot: 0, .. })
        ));

        config.rate_cap.value = 5.0;
        config.physical.inter_frame_gap = 8;
        let resolved = ResolvedPort {
            config: &config,
            direction: PortDirection::default(),
            profile: ethernet_only("eth"),
        };
        assert_eq!(
            check_port_config(&resolved, &caps),
            Err(ConfigError::InterFrameGapError {
                slot: 0,
                value: 8,
                min: 16,
                max: 56
            })
        );
    }

    #[test]
    fn test_packet_must_fit_header_and_tpld() {
        let config = port(0, Some(1), PortGroup::East);
        let resolved = ResolvedPort {
            config: &config,
            direction: PortDirection::default(),
            profile: udp_over("udp", SegmentType::Ipv4),
        };
        let caps = PortCapabilities {
            min_packet_length: 60,
            can_micro_tpld: true,
            ..Default::default()
        };
        let sizes = FrameSizeConfiguration {
            packet_size_type: PacketSizeType::CustomSizes,
            custom_packet_sizes: vec![60, 128],
            ..Default::default()
        };

        // 42 header bytes + 26 standard trailer
        assert_eq!(
            check_port_traffic(&resolved, &caps, &demand(&sizes), 1),
            Err(ConfigError::PacketSizeTooSmall {
                slot: 0,
                size: 60,
                needed: 68
            })
        );

        let micro = TrafficDemand {
            use_micro_tpld_on_demand: true,
            ..demand(&sizes)
        };
        assert!(check_port_traffic(&resolved, &caps, &micro, 1).is_ok());
    }

    #[test]
    fn test_stream_count_only_for_tx_ports() {
        let config = port(0, Some(1), PortGroup::East);
        let sizes = FrameSizeConfiguration::default();
        let caps = PortCapabilities {
            max_streams_per_port: 4,
            ..Default::default()
        };
        let many = TrafficDemand {
            per_port_stream_count: 3,
            ..demand(&sizes)
        };

        let tx = ResolvedPort {
            config: &config,
            direction: PortDirection::default(),
            profile: ethernet_only("eth"),
        };
        assert_eq!(
            check_port_traffic(&tx, &caps, &many, 2),
            Err(ConfigError::StreamExceed {
                slot: 0,
                count: 6,
                max: 4
            })
        );

        let rx_only = ResolvedPort {
            direction: PortDirection {
                is_tx: false,
                is_rx: true,
            },
            ..tx
        };
        assert!(check_port_traffic(&rx_only, &caps, &many, 2).is_ok());
    }

    #[test]
    fn test_payload_pattern_length() {
        let config = port(0, None, PortGroup::East);
        let sizes = FrameSizeConfiguration::default();
        let resolved = ResolvedPort {
            config: &config,
            direction: PortDirection::default(),
            profile: ethernet_only("eth"),
        };
        let caps = PortCapabilities {
            max_pattern_length: 2,
            ..Default::default()
        };
        let long = TrafficDemand {
            payload_pattern: "AABBCC",
            ..demand(&sizes)
        };
        assert_eq!(
            check_port_traffic(&resolved, &caps, &long, 1),
            Err(ConfigError::PayloadPatternExceed {
                slot: 0,
                length: 3,
                max: 2
            })
        );
    }

    #[test]
    fn test_tid_limitations_accumulate_across_destinations() {
        let small = PortCapabilities {
            max_tpld_stats: 3,
            ..Default::default()
        };
        let scope = TidAllocationScope::ConfigurationScope;
        assert!(check_tid_limitations(scope, true, [(&small, 1), (&small, 2)]).is_ok());
        assert_eq!(
            check_tid_limitations(scope, true, [(&small, 2), (&small, 2)]),
            Err(ConfigError::TpldIdExceed { current: 4, max: 3 })
        );
        assert!(check_tid_limitations(scope, false, [(&small, 9)]).is_ok());
        assert!(
            check_tid_limitations(TidAllocationScope::RxPortScope, true, [(&small, 9)]).is_ok()
        );
    }
}
