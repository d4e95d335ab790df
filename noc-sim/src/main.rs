// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulate a wormhole-switched, virtual-channel flow-controlled
//! network-on-chip and report its throughput, demand and latency.
//!
//! # Examples
//!
//! Running the example configuration:
//! ```text
//! cargo run --bin noc-sim --release -- configs/example.toml
//! ```
//!
//! Sweeping the injection rate from the command line:
//! ```text
//! cargo run --bin noc-sim --release -- configs/example.toml -r 0.10
//! ```

use std::fs;
use std::rc::Rc;
use std::time::Instant;

use clap::Parser;
use indicatif::ProgressBar;
use noc_engine::types::SimError;
use noc_models::network::Network;
use noc_models::traffic::generate_traffic;
use noc_sim::cli::{load_config, Cli};
use noc_sim::report::{performance, print_performance, summarize};
use noc_sim::traffic_io::write_traffic_files;
use noc_track::builder::build_stdout_tracker;
use noc_track::entity::toplevel;
use noc_track::info;

fn main() {
    let args = Cli::parse();
    match run(&args) {
        Ok(()) => {}
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Cli) -> Result<(), SimError> {
    if args.version {
        println!("noc-sim {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let level = if args.quiet {
        log::Level::Error
    } else if args.debug {
        log::Level::Trace
    } else {
        log::Level::Info
    };
    let tracker = build_stdout_tracker(level, &args.log_filter)
        .map_err(|e| SimError::InvalidConfiguration(e.0))?;
    let top = toplevel(&tracker, "top");

    let config = load_config(args)?;
    let config_text =
        toml::to_string_pretty(&config).map_err(|e| SimError::ConfigParse(e.to_string()))?;
    if !args.quiet {
        println!("************** Simulator configuration **************");
        print!("{config_text}");
    }
    if args.dry_run {
        return Ok(());
    }

    fs::create_dir_all(&args.output)?;
    if args.save_config {
        fs::write(args.output.join("config.toml"), &config_text)?;
    }

    let start = Instant::now();
    let config = Rc::new(config);
    let mut network = Network::new(&top, config.clone())?;
    if !args.no_traffic {
        generate_traffic(&mut network, &config);
    }

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(config.cycles.total)
    };
    for _ in 0..config.cycles.total {
        network.run_one_cycle();
        progress.inc(1);
    }
    progress.finish_and_clear();

    write_traffic_files(&network, &args.output)?;

    if !args.no_analysis {
        let summary = summarize(&network);
        print_performance(&performance(&summary, &config));
    }

    info!(top ;
        "simulated {} cycles in {:.2?}",
        config.cycles.total, start.elapsed());
    tracker.shutdown();
    Ok(())
}
