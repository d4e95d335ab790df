// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The immutable simulation configuration record.
//!
//! The record is built once at startup (from a TOML file, the environment
//! and command-line overrides), validated, and then passed by shared
//! reference into every component constructor. Nothing mutates it after
//! the network has been built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{SimError, SimResult};

/// Toroidal wrap-around on or off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Shape {
    /// k-ary n-cube without wrap-around edges.
    #[serde(rename = "MESH")]
    Mesh,
    /// k-ary n-cube with wrap-around edges.
    #[serde(rename = "TORUS")]
    Torus,
}

/// Route-generation policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum RoutingAlgorithm {
    /// Dimension-ordered routing: walk X then Y then Z.
    #[serde(rename = "DOR")]
    Dor,
    /// Randomized oblivious multi-phase minimal routing.
    #[serde(rename = "ROMM")]
    Romm,
    /// Minimal adaptive (precomputed): greatest remaining distance first.
    #[serde(rename = "MAD")]
    Mad,
    /// Valiant's randomized algorithm; identical to ROMM when precomputed.
    #[serde(rename = "VAL")]
    Val,
    /// Odd-even turn model for 2-D networks; DOR in 3-D.
    #[serde(rename = "ODD_EVEN")]
    OddEven,
}

/// Fixed or uniformly drawn packet sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PacketSizeOption {
    /// Every packet carries exactly `packet_size` words.
    #[serde(rename = "fixed")]
    Fixed,
    /// Packet sizes drawn uniformly from `1..=packet_size`.
    #[serde(rename = "random uniform")]
    RandomUniform,
}

/// Inter-arrival law for packet injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum InjectionProcess {
    /// One packet every `1/injection_rate` cycles.
    #[serde(rename = "periodic")]
    Periodic,
    /// Independent injection with probability `injection_rate` per cycle.
    #[serde(rename = "bernoulli")]
    Bernoulli,
    /// Markov-modulated on/off process with stationary on-probability
    /// `alpha / (alpha + beta)`.
    #[serde(rename = "markov modulated process")]
    MarkovModulated,
}

/// Destination selection for generated traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum TrafficPattern {
    /// Every packet draws a destination uniformly from the other terminals.
    #[serde(rename = "random uniform")]
    RandomUniform,
    /// A fixed-point-free permutation assigns each source one destination.
    #[serde(rename = "permutation")]
    Permutation,
}

/// Grid size and shape.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TopologyConfig {
    /// Grid size as `[x, y, z]`; total routers = x·y·z.
    pub dimension: [usize; 3],
    /// Mesh or torus.
    pub shape: Shape,
}

/// Route-generation policy selection.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Which policy the route precomputation uses.
    pub algorithm: RoutingAlgorithm,
}

/// Per-router microarchitectural parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MicroarchitectureConfig {
    /// Virtual channels per port.
    pub virtual_channel_number: usize,
    /// Flit slots per virtual channel.
    pub buffer_size: usize,
}

/// Traffic shape and injection parameters.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TrafficConfig {
    /// Payload words per body flit.
    pub flit_size: usize,
    /// Payload words per packet (or the maximum, see
    /// [`PacketSizeOption`]).
    pub packet_size: usize,
    /// Fixed or uniformly drawn packet sizes.
    pub packet_size_option: PacketSizeOption,
    /// Packets per cycle per terminal, in `[0, 1]`.
    pub injection_rate: f64,
    /// Inter-arrival law.
    pub injection_process: InjectionProcess,
    /// Markov on-rate; only used by the Markov-modulated process.
    #[serde(default)]
    pub alpha: f64,
    /// Markov off-rate; only used by the Markov-modulated process.
    #[serde(default)]
    pub beta: f64,
    /// Destination selection.
    pub traffic_pattern: TrafficPattern,
    /// Seed for all randomized generation (traffic, injection and
    /// randomized route policies).
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

/// Simulation timing windows.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CyclesConfig {
    /// Total simulated cycles.
    pub total: u64,
    /// Cycles before measurement starts.
    pub warmup: u64,
    /// Cycles in the measurement window.
    pub measurement: u64,
}

/// The complete simulator configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    /// Grid size and shape.
    pub topology: TopologyConfig,
    /// Route-generation policy.
    pub routing: RoutingConfig,
    /// Per-router microarchitecture.
    pub microarchitecture: MicroarchitectureConfig,
    /// Traffic shape and injection.
    pub traffic: TrafficConfig,
    /// Timing windows.
    pub cycles: CyclesConfig,
}

impl SimConfig {
    /// Check the configuration describes a network that can be built.
    pub fn validate(&self) -> SimResult {
        let [x, y, z] = self.topology.dimension;
        if x == 0 || y == 0 || z == 0 {
            return Err(SimError::InvalidConfiguration(format!(
                "topology.dimension must be non-zero in every axis, got [{x}, {y}, {z}]"
            )));
        }
        if self.microarchitecture.virtual_channel_number == 0 {
            return Err(SimError::InvalidConfiguration(
                "microarchitecture.virtual_channel_number must be non-zero".into(),
            ));
        }
        if self.microarchitecture.buffer_size == 0 {
            return Err(SimError::InvalidConfiguration(
                "microarchitecture.buffer_size must be non-zero".into(),
            ));
        }
        if self.traffic.flit_size == 0 {
            return Err(SimError::InvalidConfiguration(
                "traffic.flit_size must be non-zero".into(),
            ));
        }
        if self.traffic.packet_size == 0 {
            return Err(SimError::InvalidConfiguration(
                "traffic.packet_size must be non-zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.traffic.injection_rate) {
            return Err(SimError::InvalidConfiguration(format!(
                "traffic.injection_rate must be within [0, 1], got {}",
                self.traffic.injection_rate
            )));
        }
        if self.traffic.injection_process == InjectionProcess::MarkovModulated
            && self.traffic.alpha + self.traffic.beta <= 0.0
        {
            return Err(SimError::InvalidConfiguration(
                "traffic.alpha + traffic.beta must be positive for the markov modulated process"
                    .into(),
            ));
        }
        if self.cycles.warmup + self.cycles.measurement > self.cycles.total {
            return Err(SimError::InvalidConfiguration(format!(
                "cycles.warmup + cycles.measurement ({} + {}) exceed cycles.total ({})",
                self.cycles.warmup, self.cycles.measurement, self.cycles.total
            )));
        }
        Ok(())
    }

    /// Total number of routers (and terminals) in the network.
    #[must_use]
    pub fn router_count(&self) -> usize {
        let [x, y, z] = self.topology.dimension;
        x * y * z
    }

    /// Cycles left after the measurement window to let in-flight packets
    /// drain.
    #[must_use]
    pub fn drain_cycles(&self) -> u64 {
        self.cycles.total - self.cycles.warmup - self.cycles.measurement
    }

    /// Number of packets the generator deposits at each terminal.
    #[must_use]
    pub fn packets_per_terminal(&self) -> usize {
        (self.cycles.total as f64 * self.traffic.injection_rate).ceil() as usize
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Mesh => write!(f, "MESH"),
            Shape::Torus => write!(f, "TORUS"),
        }
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingAlgorithm::Dor => write!(f, "DOR"),
            RoutingAlgorithm::Romm => write!(f, "ROMM"),
            RoutingAlgorithm::Mad => write!(f, "MAD"),
            RoutingAlgorithm::Val => write!(f, "VAL"),
            RoutingAlgorithm::OddEven => write!(f, "ODD_EVEN"),
        }
    }
}

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficPattern::RandomUniform => write!(f, "random uniform"),
            TrafficPattern::Permutation => write!(f, "permutation"),
        }
    }
}

impl FromStr for Shape {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MESH" => Ok(Shape::Mesh),
            "TORUS" => Ok(Shape::Torus),
            other => Err(SimError::InvalidConfiguration(format!(
                "unknown topology shape '{other}'"
            ))),
        }
    }
}

impl FromStr for RoutingAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOR" => Ok(RoutingAlgorithm::Dor),
            "ROMM" => Ok(RoutingAlgorithm::Romm),
            "MAD" => Ok(RoutingAlgorithm::Mad),
            "VAL" => Ok(RoutingAlgorithm::Val),
            "ODD_EVEN" => Ok(RoutingAlgorithm::OddEven),
            other => Err(SimError::InvalidConfiguration(format!(
                "unknown routing algorithm '{other}'"
            ))),
        }
    }
}

impl FromStr for TrafficPattern {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random uniform" | "random_uniform" => Ok(TrafficPattern::RandomUniform),
            "permutation" => Ok(TrafficPattern::Permutation),
            other => Err(SimError::InvalidConfiguration(format!(
                "unknown traffic pattern '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> SimConfig {
        SimConfig {
            topology: TopologyConfig {
                dimension: [4, 4, 1],
                shape: Shape::Mesh,
            },
            routing: RoutingConfig {
                algorithm: RoutingAlgorithm::Dor,
            },
            microarchitecture: MicroarchitectureConfig {
                virtual_channel_number: 2,
                buffer_size: 8,
            },
            traffic: TrafficConfig {
                flit_size: 4,
                packet_size: 10,
                packet_size_option: PacketSizeOption::Fixed,
                injection_rate: 0.05,
                injection_process: InjectionProcess::Bernoulli,
                alpha: 0.0,
                beta: 0.0,
                traffic_pattern: TrafficPattern::RandomUniform,
                seed: 42,
            },
            cycles: CyclesConfig {
                total: 2000,
                warmup: 500,
                measurement: 1000,
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(example().validate().is_ok());
        assert_eq!(example().router_count(), 16);
        assert_eq!(example().drain_cycles(), 500);
        assert_eq!(example().packets_per_terminal(), 100);
    }

    #[test]
    fn zero_dimension_rejected() {
        let mut config = example();
        config.topology.dimension = [4, 0, 1];
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_virtual_channels_rejected() {
        let mut config = example();
        config.microarchitecture.virtual_channel_number = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_buffer_rejected() {
        let mut config = example();
        config.microarchitecture.buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_rate_rejected() {
        let mut config = example();
        config.traffic.injection_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_windows_rejected() {
        let mut config = example();
        config.cycles.measurement = 1600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn enum_spellings_round_trip() {
        assert_eq!("TORUS".parse::<Shape>().unwrap(), Shape::Torus);
        assert_eq!(
            "ODD_EVEN".parse::<RoutingAlgorithm>().unwrap(),
            RoutingAlgorithm::OddEven
        );
        assert_eq!(
            "random uniform".parse::<TrafficPattern>().unwrap(),
            TrafficPattern::RandomUniform
        );
        assert!("HYPERCUBE".parse::<Shape>().is_err());
    }
}
