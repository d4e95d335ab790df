// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! End-of-run traffic CSV artifacts.
//!
//! `TrafficInformation.csv` carries one row per generated packet with its
//! final status and timestamps; `TrafficData.csv` carries the payload
//! words. Both live in the configured output directory.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use noc_models::network::{terminal_index, Network};
use noc_models::traffic::PacketStatus;

/// Write both traffic files for a finished run.
pub fn write_traffic_files(network: &Network, directory: &Path) -> io::Result<()> {
    write_information(network, &directory.join("TrafficInformation.csv"))?;
    write_data(network, &directory.join("TrafficData.csv"))
}

fn write_information(network: &Network, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "PacketID,Source,Destination,PacketSize,Status,SentTime,ReceivedTime"
    )?;

    for terminal in &network.terminals {
        for entry in &terminal.output_traffic {
            let received = network.terminals[terminal_index(entry.destination)]
                .input_traffic
                .iter()
                .find(|rx| rx.packet_id == entry.packet_id && rx.source == entry.source);

            let (status, sent, received) = match (entry.status, received) {
                (PacketStatus::Valid, _) => (PacketStatus::Valid, None, None),
                (_, Some(rx)) => (
                    PacketStatus::Received,
                    Some(entry.sent_time),
                    Some(rx.received_time),
                ),
                (status, None) => (status, Some(entry.sent_time), None),
            };
            let sent = sent.map_or_else(|| "-".to_string(), |t| t.to_string());
            let received = received.map_or_else(|| "-".to_string(), |t| t.to_string());
            writeln!(
                writer,
                "{},{},{},{},{status},{sent},{received}",
                entry.packet_id, entry.source, entry.destination, entry.packet_size
            )?;
        }
    }
    writer.flush()
}

fn write_data(network: &Network, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "Data")?;
    for terminal in &network.terminals {
        for entry in &terminal.output_traffic {
            let words: Vec<String> = entry.payload.iter().map(|w| w.to_string()).collect();
            writeln!(writer, "{}", words.join(","))?;
        }
    }
    writer.flush()
}
