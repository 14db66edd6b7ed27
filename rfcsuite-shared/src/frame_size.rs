//! Frame size selection.
//!
//! A [`FrameSizeConfiguration`] carries the parameters of every sizing mode
//! at once; only the active mode's fields are interpreted.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_IETF_PACKET_SIZES, MIXED_CUSTOM_LENGTH_INDICES, MIXED_DEFAULT_WEIGHTS,
    MIXED_PACKET_SIZES, PacketSizeType,
};
use crate::errors::{ConfigError, ConfigResult};

/// Overrides for the four adjustable positions of the mixed distribution.
///
/// A zero keeps the reference size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MixedLengthConfig {
    #[serde(default)]
    pub field_0: u32,
    #[serde(default)]
    pub field_1: u32,
    #[serde(default)]
    pub field_14: u32,
    #[serde(default)]
    pub field_15: u32,
}

impl MixedLengthConfig {
    fn overrides(&self) -> [u32; 4] {
        [self.field_0, self.field_1, self.field_14, self.field_15]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameSizeSpec", into = "FrameSizeSpec")]
pub struct FrameSizeConfiguration {
    pub packet_size_type: PacketSizeType,
    pub custom_packet_sizes: Vec<u32>,
    pub fixed_packet_start_size: u32,
    pub fixed_packet_end_size: u32,
    pub fixed_packet_step_size: u32,
    pub varying_packet_min_size: u32,
    pub varying_packet_max_size: u32,
    pub mixed_sizes_weights: Vec<u32>,
    pub mixed_length_config: MixedLengthConfig,
}

/// Unchecked wire shape of [`FrameSizeConfiguration`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSizeSpec {
    #[serde(default)]
    packet_size_type: PacketSizeType,
    #[serde(default)]
    custom_packet_sizes: Vec<u32>,
    #[serde(default = "default_start")]
    fixed_packet_start_size: u32,
    #[serde(default = "default_end")]
    fixed_packet_end_size: u32,
    #[serde(default = "default_step")]
    fixed_packet_step_size: u32,
    #[serde(default = "default_start")]
    varying_packet_min_size: u32,
    #[serde(default = "default_end")]
    varying_packet_max_size: u32,
    #[serde(default = "default_weights")]
    mixed_sizes_weights: Vec<u32>,
    #[serde(default)]
    mixed_length_config: MixedLengthConfig,
}

fn default_start() -> u32 {
    64
}

fn default_end() -> u32 {
    1518
}

fn default_step() -> u32 {
    64
}

fn default_weights() -> Vec<u32> {
    MIXED_DEFAULT_WEIGHTS.to_vec()
}

impl TryFrom<FrameSizeSpec> for FrameSizeConfiguration {
    type Error = ConfigError;

    fn try_from(spec: FrameSizeSpec) -> Result<Self, Self::Error> {
        let config = Self {
            packet_size_type: spec.packet_size_type,
            custom_packet_sizes: spec.custom_packet_sizes,
            fixed_packet_start_size: spec.fixed_packet_start_size,
            fixed_packet_end_size: spec.fixed_packet_end_size,
            fixed_packet_step_size: spec.fixed_packet_step_size,
            varying_packet_min_size: spec.varying_packet_min_size,
            varying_packet_max_size: spec.varying_packet_max_size,
            mixed_sizes_weights: spec.mixed_sizes_weights,
            mixed_length_config: spec.mixed_length_config,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<FrameSizeConfiguration> for FrameSizeSpec {
    fn from(c: FrameSizeConfiguration) -> Self {
        Self {
            packet_size_type: c.packet_size_type,
            custom_packet_sizes: c.custom_packet_sizes,
            fixed_packet_start_size: c.fixed_packet_start_size,
            fixed_packet_end_size: c.fixed_packet_end_size,
            fixed_packet_step_size: c.fixed_packet_step_size,
            varying_packet_min_size: c.varying_packet_min_size,
            varying_packet_max_size: c.varying_packet_max_size,
            mixed_sizes_weights: c.mixed_sizes_weights,
            mixed_length_config: c.mixed_length_config,
        }
    }
}

impl Default for FrameSizeConfiguration {
    fn default() -> Self {
        Self {
            packet_size_type: PacketSizeType::IetfDefault,
            custom_packet_sizes: Vec::new(),
            fixed_packet_start_size: default_start(),
            fixed_packet_end_size: default_end(),
            fixed_packet_step_size: default_step(),
            varying_packet_min_size: default_start(),
            varying_packet_max_size: default_end(),
            mixed_sizes_weights: default_weights(),
            mixed_length_config: MixedLengthConfig::default(),
        }
    }
}

impl FrameSizeConfiguration {
    /// Build a mixed-size configuration, rejecting malformed weights.
    pub fn mixed(weights: Vec<u32>, lengths: MixedLengthConfig) -> ConfigResult<Self> {
        let config = Self {
            packet_size_type: PacketSizeType::MixedSizes,
            mixed_sizes_weights: weights,
            mixed_length_config: lengths,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match self.packet_size_type {
            PacketSizeType::MixedSizes => {
                if self.mixed_sizes_weights.len() != MIXED_PACKET_SIZES.len() {
                    return Err(ConfigError::MixWeightsNotEnough {
                        expected: MIXED_PACKET_SIZES.len(),
                        actual: self.mixed_sizes_weights.len(),
                    });
                }
                let sum: u64 = self
                    .mixed_sizes_weights
                    .iter()
                    .map(|w| u64::from(*w))
                    .sum();
                if sum != 100 {
                    return Err(ConfigError::MixWeightsSumError { sum });
                }
            }
            PacketSizeType::Specified => {
                if self.fixed_packet_step_size == 0 {
                    return Err(ConfigError::StepValueRestriction);
                }
                if self.fixed_packet_start_size > self.fixed_packet_end_size {
                    return Err(ConfigError::RangeRestriction {
                        start: f64::from(self.fixed_packet_start_size),
                        end: f64::from(self.fixed_packet_end_size),
                    });
                }
            }
            PacketSizeType::CustomSizes if self.custom_packet_sizes.is_empty() => {
                return Err(ConfigError::ValueOutOfRange {
                    field: "custom_packet_sizes",
                    value: "[]".to_string(),
                    range: "at least one size".to_string(),
                });
            }
            kind if kind.is_varying() => {
                if self.varying_packet_min_size > self.varying_packet_max_size {
                    return Err(ConfigError::RangeRestriction {
                        start: f64::from(self.varying_packet_min_size),
                        end: f64::from(self.varying_packet_max_size),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Reference sizes with the custom overrides applied.
    pub fn mixed_packet_lengths(&self) -> [u32; 16] {
        let mut lengths = MIXED_PACKET_SIZES;
        for (index, value) in MIXED_CUSTOM_LENGTH_INDICES
            .iter()
            .zip(self.mixed_length_config.overrides())
        {
            if value != 0 {
                lengths[*index] = value;
            }
        }
        lengths
    }

    /// Weighted average of the mixed distribution, rounded to whole bytes.
    pub fn mixed_average_packet_size(&self) -> u32 {
        let weighted: u64 = self
            .mixed_packet_lengths()
            .iter()
            .zip(&self.mixed_sizes_weights)
            .map(|(size, weight)| u64::from(*size) * u64::from(*weight))
            .sum();
        (weighted as f64 / 100.0).round() as u32
    }

    /// Frame sizes a test iterates over, in order.
    pub fn packet_size_list(&self) -> Vec<u32> {
        match self.packet_size_type {
            PacketSizeType::IetfDefault => DEFAULT_IETF_PACKET_SIZES.to_vec(),
            PacketSizeType::CustomSizes => {
                let mut sizes = self.custom_packet_sizes.clone();
                sizes.sort_unstable();
                sizes
            }
            PacketSizeType::Specified => (self.fixed_packet_start_size
                ..=self.fixed_packet_end_size)
                .step_by(self.fixed_packet_step_size.max(1) as usize)
                .collect(),
            PacketSizeType::Incrementing | PacketSizeType::Butterfly | PacketSizeType::Random => {
                let (min, max) = (self.varying_packet_min_size, self.varying_packet_max_size);
                vec![min + max.saturating_sub(min) / 2]
            }
            PacketSizeType::MixedSizes => vec![self.mixed_average_packet_size()],
        }
    }

    /// Smallest and largest frame the port will actually put on the wire.
    pub fn size_range(&self) -> (u32, u32) {
        match self.packet_size_type {
            PacketSizeType::MixedSizes => {
                let used = self
                    .mixed_packet_lengths()
                    .into_iter()
                    .zip(&self.mixed_sizes_weights)
                    .filter(|(_, weight)| **weight > 0)
                    .map(|(size, _)| size);
                let (lo, hi) = used.fold((u32::MAX, 0), |(lo, hi), s| (lo.min(s), hi.max(s)));
                if hi == 0 { (0, 0) } else { (lo, hi) }
            }
            kind if kind.is_varying() => {
                (self.varying_packet_min_size, self.varying_packet_max_size)
            }
            _ => {
                let sizes = self.packet_size_list();
                (
                    sizes.first().copied().unwrap_or(0),
                    sizes.last().copied().unwrap_or(0),
                )
            }
        }
    }

    pub fn min_packet_size(&self) -> u32 {
        self.size_range().0
    }

    pub fn max_packet_size(&self) -> u32 {
        self.size_range().1
    }
}
