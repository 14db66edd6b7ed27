//! Address, prefix and bit-string value types.
//!
//! All types here are immutable once built. Text forms are validated on
//! construction, so a value that exists is always well formed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::errors::{ConfigError, ConfigResult};

static HEX12_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{12}$").expect("static regex"));

static BINARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[01]+$").expect("static regex"));

/// 48-bit Ethernet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// An all-zero address counts as "not configured".
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 6]
    }

    pub fn to_hexstring(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }

    pub fn first_three_bytes(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn to_binary_string(&self) -> BinaryString {
        BinaryString(self.0.iter().map(|b| format!("{b:08b}")).collect())
    }

    /// Build an address from comma separated decimal octets, e.g. `"0,1,2,3,4,5"`.
    pub fn from_base_address(base: &str) -> ConfigResult<Self> {
        let invalid = || ConfigError::MacAddressNotValid {
            value: base.to_string(),
        };
        let parts: Vec<&str> = base.split(',').map(str::trim).collect();
        if parts.len() != 6 {
            return Err(invalid());
        }
        let mut octets = [0u8; 6];
        for (slot, part) in octets.iter_mut().zip(parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }

    /// Replace the leading bytes with the given hex prefix, keeping the tail.
    pub fn partial_replace(&self, prefix: &str) -> ConfigResult<Self> {
        let clean = strip_mac_separators(prefix);
        let invalid = || ConfigError::MacAddressNotValid {
            value: prefix.to_string(),
        };
        if clean.len() % 2 != 0 || clean.len() > 12 {
            return Err(invalid());
        }
        let mut octets = self.0;
        for (i, chunk) in clean.as_bytes().chunks(2).enumerate() {
            let text = std::str::from_utf8(chunk).map_err(|_| invalid())?;
            octets[i] = u8::from_str_radix(text, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

fn strip_mac_separators(value: &str) -> String {
    let trimmed = value.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    trimmed.chars().filter(|c| *c != ':' && *c != '-').collect()
}

impl FromStr for MacAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean = strip_mac_separators(s);
        if clean.is_empty() {
            return Ok(Self::default());
        }
        if !HEX12_RE.is_match(&clean) {
            return Err(ConfigError::MacAddressNotValid {
                value: s.to_string(),
            });
        }
        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            // the regex guarantees two ASCII hex digits per octet
            *octet = u8::from_str_radix(&clean[i * 2..i * 2 + 2], 16).map_err(|_| {
                ConfigError::MacAddressNotValid {
                    value: s.to_string(),
                }
            })?;
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// Prefix length tied to an address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix(u8);

impl Prefix {
    pub fn ipv4(len: u8) -> ConfigResult<Self> {
        Self::checked(len, 32)
    }

    pub fn ipv6(len: u8) -> ConfigResult<Self> {
        Self::checked(len, 128)
    }

    /// Prefix valid for the family of `addr`.
    pub fn for_address(addr: &IpAddr, len: u8) -> ConfigResult<Self> {
        match addr {
            IpAddr::V4(_) => Self::ipv4(len),
            IpAddr::V6(_) => Self::ipv6(len),
        }
    }

    fn checked(len: u8, max: u8) -> ConfigResult<Self> {
        if len > max {
            return Err(ConfigError::PrefixOutOfRange { prefix: len, max });
        }
        Ok(Self(len))
    }

    pub fn length(&self) -> u8 {
        self.0
    }

    pub fn to_ipv4_mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(mask_bits_u32(self.0))
    }
}

/// Address masked down to its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network {
    pub address: IpAddr,
    pub prefix: Prefix,
}

impl Network {
    pub fn new(address: IpAddr, prefix_len: u8) -> ConfigResult<Self> {
        let prefix = Prefix::for_address(&address, prefix_len)?;
        let address = match address {
            IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(
                u32::from(v4) & mask_bits_u32(prefix.length()),
            )),
            IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(
                u128::from(v6) & mask_bits_u128(prefix.length()),
            )),
        };
        Ok(Self { address, prefix })
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self.address, addr) {
            (IpAddr::V4(net), IpAddr::V4(a)) => {
                u32::from(*a) & mask_bits_u32(self.prefix.length()) == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(a)) => {
                u128::from(*a) & mask_bits_u128(self.prefix.length()) == u128::from(net)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix.length())
    }
}

fn mask_bits_u32(len: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(len.min(32))).unwrap_or(0)
}

fn mask_bits_u128(len: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(len.min(128))).unwrap_or(0)
}

/// Conversions the configuration core needs on both IP families.
pub trait AddressExt: Copy {
    fn unspecified() -> Self;
    /// True for the unspecified address, i.e. "not configured".
    fn is_empty(&self) -> bool;
    fn to_hexstring(&self) -> String;
    fn last_three_bytes(&self) -> [u8; 3];
    fn to_binary_string(&self) -> BinaryString;
    fn network(&self, prefix_len: u8) -> ConfigResult<Network>;
}

impl AddressExt for Ipv4Addr {
    fn unspecified() -> Self {
        Ipv4Addr::UNSPECIFIED
    }

    fn is_empty(&self) -> bool {
        self.is_unspecified()
    }

    fn to_hexstring(&self) -> String {
        self.octets().iter().map(|b| format!("{b:02X}")).collect()
    }

    fn last_three_bytes(&self) -> [u8; 3] {
        let o = self.octets();
        [o[1], o[2], o[3]]
    }

    fn to_binary_string(&self) -> BinaryString {
        BinaryString(format!("{:032b}", u32::from(*self)))
    }

    fn network(&self, prefix_len: u8) -> ConfigResult<Network> {
        Network::new(IpAddr::V4(*self), prefix_len)
    }
}

impl AddressExt for Ipv6Addr {
    fn unspecified() -> Self {
        Ipv6Addr::UNSPECIFIED
    }

    fn is_empty(&self) -> bool {
        self.is_unspecified()
    }

    fn to_hexstring(&self) -> String {
        self.octets().iter().map(|b| format!("{b:02X}")).collect()
    }

    fn last_three_bytes(&self) -> [u8; 3] {
        let o = self.octets();
        [o[13], o[14], o[15]]
    }

    fn to_binary_string(&self) -> BinaryString {
        BinaryString(format!("{:0128b}", u128::from(*self)))
    }

    fn network(&self, prefix_len: u8) -> ConfigResult<Network> {
        Network::new(IpAddr::V6(*self), prefix_len)
    }
}

/// String made only of `0` and `1`, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BinaryString(String);

impl BinaryString {
    pub fn new(value: impl Into<String>) -> ConfigResult<Self> {
        let value = value.into();
        if !BINARY_RE.is_match(&value) {
            return Err(ConfigError::BinaryStringNotValid { value });
        }
        Ok(Self(value))
    }

    /// All-zero string of `bits` length.
    pub fn zeros(bits: u32) -> Self {
        Self("0".repeat(bits.max(1) as usize))
    }

    /// Expand hex text to bits, four per digit, leading zeros kept.
    pub fn from_hex(hex: &str) -> ConfigResult<Self> {
        let digits = hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(hex.trim());
        let mut bits = String::with_capacity(digits.len() * 4);
        for c in digits.chars() {
            let nibble = c.to_digit(16).ok_or_else(|| ConfigError::BinaryStringNotValid {
                value: hex.to_string(),
            })?;
            bits.push_str(&format!("{nibble:04b}"));
        }
        Self::new(bits)
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    pub fn bit_length(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BinaryString {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BinaryString> for String {
    fn from(value: BinaryString) -> Self {
        value.0
    }
}

impl fmt::Display for BinaryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
