// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use noc_engine::config::{
    CyclesConfig, InjectionProcess, MicroarchitectureConfig, PacketSizeOption, RoutingConfig,
    RoutingAlgorithm, Shape, SimConfig, TopologyConfig, TrafficConfig, TrafficPattern,
};
use noc_models::network::Network;
use noc_track::entity::toplevel;
use noc_track::tracker::dev_null_tracker;

/// A valid baseline configuration that individual tests adjust.
pub fn config(
    dimension: [usize; 3],
    shape: Shape,
    virtual_channel_number: usize,
    buffer_size: usize,
    flit_size: usize,
    packet_size: usize,
) -> SimConfig {
    SimConfig {
        topology: TopologyConfig { dimension, shape },
        routing: RoutingConfig {
            algorithm: RoutingAlgorithm::Dor,
        },
        microarchitecture: MicroarchitectureConfig {
            virtual_channel_number,
            buffer_size,
        },
        traffic: TrafficConfig {
            flit_size,
            packet_size,
            packet_size_option: PacketSizeOption::Fixed,
            injection_rate: 1.0,
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

/// Build a network over a silent tracker.
pub fn build(config: SimConfig) -> Network {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    Network::new(&top, Rc::new(config)).expect("configuration should build")
}
