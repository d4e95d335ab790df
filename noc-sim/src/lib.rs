// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The simulator application: configuration loading, the command-line
//! surface, traffic CSV output and performance reporting.
//!
//! The binary in `main.rs` wires these together: parse the CLI, merge the
//! TOML configuration with environment variables and command-line
//! overrides, build the network, drive the configured number of cycles
//! and report throughput, demand and average latency over the
//! measurement window.

pub mod cli;
pub mod report;
pub mod traffic_io;
