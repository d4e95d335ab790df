// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Performance accounting over the measurement window.
//!
//! All three aggregates only count events inside the measurement window
//! `[warmup, warmup + measurement)`: received flits for throughput, sent
//! flits for demand, and the per-packet `received − sent − 1` sums for
//! average latency. Flit counts are payload words divided by `flit_size`,
//! so the aggregates come out in flit/cycle/node.

use noc_engine::config::SimConfig;
use noc_models::network::{terminal_index, Network};
use noc_models::traffic::PacketStatus;

/// Raw measurement-window counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrafficSummary {
    /// Packets reassembled inside the window.
    pub received_packets: u64,
    /// Flits reassembled inside the window.
    pub received_flits: f64,
    /// Packets injected inside the window.
    pub sent_packets: u64,
    /// Flits injected inside the window.
    pub sent_flits: f64,
    /// Sum of `received − sent − 1` over delivered window packets.
    pub accumulated_latency: f64,
}

/// The three reported aggregates.
#[derive(Clone, Copy, Debug)]
pub struct Performance {
    /// Received flits per cycle per node.
    pub throughput: f64,
    /// Sent flits per cycle per node.
    pub demand: f64,
    /// Average packet latency in cycles.
    pub average_latency: f64,
}

/// Collect the measurement-window counts from the terminals'
/// bookkeeping.
#[must_use]
pub fn summarize(network: &Network) -> TrafficSummary {
    let config = &network.config;
    let window = config.cycles.warmup..config.cycles.warmup + config.cycles.measurement;
    let flit_size = config.traffic.flit_size as f64;
    let mut summary = TrafficSummary::default();

    for terminal in &network.terminals {
        for entry in &terminal.input_traffic {
            if window.contains(&entry.received_time) {
                summary.received_packets += 1;
                summary.received_flits += entry.packet_size as f64 / flit_size;
            }
        }
    }

    for terminal in &network.terminals {
        for entry in &terminal.output_traffic {
            if entry.status == PacketStatus::Valid || !window.contains(&entry.sent_time) {
                continue;
            }
            summary.sent_packets += 1;
            summary.sent_flits += entry.packet_size as f64 / flit_size;

            let destination = &network.terminals[terminal_index(entry.destination)];
            if let Some(received) = destination
                .input_traffic
                .iter()
                .find(|rx| rx.packet_id == entry.packet_id && rx.source == entry.source)
            {
                summary.accumulated_latency +=
                    (received.received_time - entry.sent_time) as f64 - 1.0;
            }
        }
    }

    summary
}

/// Reduce the counts to the three reported aggregates.
#[must_use]
pub fn performance(summary: &TrafficSummary, config: &SimConfig) -> Performance {
    let cycles = config.cycles.measurement as f64;
    let nodes = config.router_count() as f64;
    let average_latency = if summary.sent_packets == 0 {
        0.0
    } else {
        summary.accumulated_latency / summary.sent_packets as f64
    };
    Performance {
        throughput: summary.received_flits / (cycles * nodes),
        demand: summary.sent_flits / (cycles * nodes),
        average_latency,
    }
}

/// Emit the human-readable performance lines.
pub fn print_performance(performance: &Performance) {
    println!("************** Network performance **************");
    println!("Throughput: {} flit/cycle/node", performance.throughput);
    println!("Demand: {} flit/cycle/node", performance.demand);
    println!("Average latency: {} cycles", performance.average_latency);
}
