// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Synthetic traffic generation and per-packet bookkeeping.
//!
//! Before simulation begins the generator deposits pending packets into
//! each terminal's output bookkeeping. Injection later admits them in
//! order, stamping the sent time; reassembly at the destination appends a
//! matching entry to the input bookkeeping with the received time. End-of-
//! run analysis works entirely from these two buffers.

use std::fmt;

use noc_engine::clock::Cycle;
use noc_engine::config::{PacketSizeOption, SimConfig, TrafficPattern};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::flit::NodeId;
use crate::network::Network;

/// Lifecycle of one generated packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketStatus {
    /// Deposited, not yet injected.
    Valid,
    /// Injected into the network.
    Sent,
    /// Reassembled at the destination.
    Received,
}

impl fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            PacketStatus::Valid => 'V',
            PacketStatus::Sent => 'S',
            PacketStatus::Received => 'R',
        };
        write!(f, "{c}")
    }
}

/// Bookkeeping record for one packet, kept at the source (output
/// direction) and at the destination (input direction).
#[derive(Clone, Debug)]
pub struct TrafficEntry {
    /// Per-source sequential identifier.
    pub packet_id: u64,
    /// Source terminal id.
    pub source: NodeId,
    /// Destination terminal id.
    pub destination: NodeId,
    /// Payload words in the packet.
    pub packet_size: usize,
    /// Lifecycle status.
    pub status: PacketStatus,
    /// Cycle the packet was injected, zero until then.
    pub sent_time: Cycle,
    /// Cycle the packet was reassembled, zero until then.
    pub received_time: Cycle,
    /// The payload words themselves.
    pub payload: Vec<f32>,
}

impl TrafficEntry {
    /// A pending entry as the generator deposits it.
    #[must_use]
    pub fn pending(packet_id: u64, source: NodeId, destination: NodeId, payload: Vec<f32>) -> Self {
        Self {
            packet_id,
            source,
            destination,
            packet_size: payload.len(),
            status: PacketStatus::Valid,
            sent_time: 0,
            received_time: 0,
            payload,
        }
    }
}

/// Deposit pending packets at every terminal according to the configured
/// traffic pattern.
///
/// A single-router network generates nothing: no destination distinct
/// from the source exists.
pub fn generate_traffic(network: &mut Network, config: &SimConfig) {
    let count = config.router_count() as i32;
    if count < 2 {
        return;
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.traffic.seed);
    let packets = config.packets_per_terminal();

    match config.traffic.traffic_pattern {
        TrafficPattern::RandomUniform => {
            for index in 0..count {
                let source = -index - 1;
                for packet_id in 0..packets {
                    let payload = draw_payload(config, &mut rng);
                    let destination = loop {
                        let candidate = rng.gen_range(-count..=-1);
                        if candidate != source {
                            break candidate;
                        }
                    };
                    network.terminals[index as usize].queue_packet(TrafficEntry::pending(
                        packet_id as u64,
                        source,
                        destination,
                        payload,
                    ));
                }
            }
        }
        TrafficPattern::Permutation => {
            let permutation = derangement(count as usize, &mut rng);
            for index in 0..count {
                let source = -index - 1;
                let destination = -(permutation[index as usize] as i32) - 1;
                for packet_id in 0..packets {
                    let payload = draw_payload(config, &mut rng);
                    network.terminals[index as usize].queue_packet(TrafficEntry::pending(
                        packet_id as u64,
                        source,
                        destination,
                        payload,
                    ));
                }
            }
        }
    }
}

/// Payload words for one packet: the word-index ramp `0.0, 1.0, …` over a
/// fixed or uniformly drawn size.
fn draw_payload(config: &SimConfig, rng: &mut Xoshiro256PlusPlus) -> Vec<f32> {
    let size = match config.traffic.packet_size_option {
        PacketSizeOption::Fixed => config.traffic.packet_size,
        PacketSizeOption::RandomUniform => rng.gen_range(1..=config.traffic.packet_size),
    };
    (0..size).map(|word| word as f32).collect()
}

/// A uniformly drawn fixed-point-free permutation of `0..count`.
///
/// Rejection sampling converges quickly (acceptance tends to 1/e) and
/// `count >= 2` is guaranteed by the caller.
fn derangement(count: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    loop {
        let mut permutation: Vec<usize> = (0..count).collect();
        permutation.shuffle(rng);
        if permutation
            .iter()
            .enumerate()
            .all(|(index, &image)| index != image)
        {
            return permutation;
        }
    }
}
