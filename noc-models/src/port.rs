// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A port: the attachment point of one link to one node.

use noc_engine::register::Register;

use crate::channel::VirtualChannel;
use crate::flit::{Credit, Flit, NodeId};

/// Input or output half of a port: one flit latch and one credit latch,
/// each with its own enable.
#[derive(Clone, Debug, Default)]
pub struct RegisterPair {
    /// Flit slot.
    pub flits: Register<Flit>,
    /// Credit slot.
    pub credits: Register<Credit>,
}

impl RegisterPair {
    /// Sample both occupancies into the enables.
    pub fn update_enable(&mut self) {
        self.flits.update_enable();
        self.credits.update_enable();
    }
}

/// One port of a router or terminal.
pub struct Port {
    /// Identifier of the node on the far side of the link; negative iff
    /// that node is a terminal.
    pub port_id: NodeId,
    /// Registers written by the link, read by this node.
    pub input: RegisterPair,
    /// Registers written by this node, read by the link.
    pub output: RegisterPair,
    /// The per-VC buffers and control records.
    pub vcs: Vec<VirtualChannel>,
}

impl Port {
    /// Create a port on node `owner` facing node `port_id`.
    #[must_use]
    pub fn new(port_id: NodeId, owner: NodeId, vc_count: usize, buffer_size: usize) -> Self {
        Self {
            port_id,
            input: RegisterPair::default(),
            output: RegisterPair::default(),
            vcs: (0..vc_count)
                .map(|_| VirtualChannel::new(owner, buffer_size))
                .collect(),
        }
    }

    /// Whether the far side of this port's link is a terminal.
    #[must_use]
    pub fn is_terminal_port(&self) -> bool {
        self.port_id < 0
    }
}
