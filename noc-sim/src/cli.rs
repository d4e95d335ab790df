// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Command-line arguments and configuration loading.
//!
//! Configuration is merged in priority order: command-line overrides,
//! then `NOC_`-prefixed environment variables (`NOC_TRAFFIC__SEED=7`),
//! then the TOML configuration file.

use std::path::PathBuf;

use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use noc_engine::config::{RoutingAlgorithm, SimConfig, TrafficPattern};
use noc_engine::types::SimError;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "noc-sim", about = "Network-on-Chip (NoC) simulator")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(default_value = "configs/example.toml")]
    pub config: PathBuf,

    /// Show version information.
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Output directory for traffic files.
    #[arg(short, long, default_value = "traffic")]
    pub output: PathBuf,

    /// Override the topology dimension, as `x,y,z`.
    #[arg(short = 't', long)]
    pub topology: Option<String>,

    /// Override the routing algorithm.
    #[arg(short = 'a', long)]
    pub algorithm: Option<RoutingAlgorithm>,

    /// Override the injection rate (packets per cycle per terminal).
    #[arg(short = 'r', long)]
    pub rate: Option<f64>,

    /// Override the packet size in payload words.
    #[arg(short = 's', long)]
    pub size: Option<usize>,

    /// Override the traffic pattern.
    #[arg(short = 'p', long)]
    pub pattern: Option<TrafficPattern>,

    /// Override the total cycle count.
    #[arg(short = 'c', long)]
    pub cycles: Option<u64>,

    /// Override the warmup cycle count.
    #[arg(short = 'w', long)]
    pub warmup: Option<u64>,

    /// Override the measurement cycle count.
    #[arg(short = 'm', long)]
    pub measurement: Option<u64>,

    /// Parse and print the configuration, then exit without simulating.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the merged configuration to the output directory.
    #[arg(long)]
    pub save_config: bool,

    /// Build the network but generate no traffic.
    #[arg(long)]
    pub no_traffic: bool,

    /// Skip the end-of-run performance analysis.
    #[arg(long)]
    pub no_analysis: bool,

    /// Only report errors.
    #[arg(long)]
    pub quiet: bool,

    /// Enable trace-level logging.
    #[arg(long)]
    pub debug: bool,

    /// Regular expression selecting which entities log at the chosen
    /// level; all others only report errors.
    #[arg(long, default_value = "")]
    pub log_filter: String,
}

/// Parse an `x,y,z` topology override.
pub fn parse_dimension(text: &str) -> Result<[usize; 3], SimError> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 3 {
        return Err(SimError::InvalidConfiguration(format!(
            "topology override must be x,y,z, got '{text}'"
        )));
    }
    let mut dimension = [0usize; 3];
    for (slot, part) in dimension.iter_mut().zip(&parts) {
        *slot = part.trim().parse().map_err(|_| {
            SimError::InvalidConfiguration(format!("bad topology axis '{part}' in '{text}'"))
        })?;
    }
    Ok(dimension)
}

/// Apply the command-line overrides on top of a parsed configuration.
pub fn apply_overrides(config: &mut SimConfig, args: &Cli) -> Result<(), SimError> {
    if let Some(topology) = &args.topology {
        config.topology.dimension = parse_dimension(topology)?;
    }
    if let Some(algorithm) = args.algorithm {
        config.routing.algorithm = algorithm;
    }
    if let Some(rate) = args.rate {
        config.traffic.injection_rate = rate;
    }
    if let Some(size) = args.size {
        config.traffic.packet_size = size;
    }
    if let Some(pattern) = args.pattern {
        config.traffic.traffic_pattern = pattern;
    }
    if let Some(cycles) = args.cycles {
        config.cycles.total = cycles;
    }
    if let Some(warmup) = args.warmup {
        config.cycles.warmup = warmup;
    }
    if let Some(measurement) = args.measurement {
        config.cycles.measurement = measurement;
    }
    Ok(())
}

/// Load, merge, override and validate the configuration.
pub fn load_config(args: &Cli) -> Result<SimConfig, SimError> {
    let figment = Figment::new()
        .merge(Toml::file_exact(&args.config))
        .merge(Env::prefixed("NOC_").split("__"));
    let mut config: SimConfig = figment
        .extract()
        .map_err(|e| SimError::ConfigParse(e.to_string()))?;
    apply_overrides(&mut config, args)?;
    config.validate()?;
    Ok(config)
}
