// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The four-stage router pipeline.
//!
//! Every cycle a router runs, in order: flit ingress, credit ingress,
//! route compute (RC), virtual-channel allocation (VA), switch traversal
//! (ST) and switch allocation (SA). ST consumes the crossbar connections
//! established by the *previous* cycle's SA, since SA fills the crossbar
//! only after ST has drained it; an allocated flit therefore moves
//! exactly one hop per cycle.
//!
//! Each virtual channel carries a per-cycle `enable` latch which RC, VA
//! and SA clear when they act, so a channel advances through at most one
//! pipeline stage per cycle.

use std::rc::Rc;

use noc_engine::clock::Cycle;
use noc_engine::config::SimConfig;
use noc_engine::traits::Synchronous;
use noc_track::entity::Entity;
use noc_track::trace;

use crate::channel::{InputVcState, OutputVcState};
use crate::flit::{Credit, FlitKind, NodeId};
use crate::port::Port;

/// One entry of an arbitration priority table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriorityEntry {
    /// Input port index.
    pub port: usize,
    /// Virtual channel index on that port.
    pub vc: usize,
}

/// A winning switch arbitration, valid for one traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Input port index.
    pub in_port: usize,
    /// Virtual channel on the input port.
    pub in_vc: usize,
    /// Output port index.
    pub out_port: usize,
    /// Virtual channel on the downstream port.
    pub out_vc: usize,
}

/// One router of the network.
pub struct Router {
    /// Entity for tracking.
    pub entity: Rc<Entity>,
    /// This router's identifier (non-negative).
    pub router_id: NodeId,
    /// Ports in creation order: inter-router ports first, then the
    /// terminal port.
    pub ports: Vec<Port>,
    crossbar: Vec<Connection>,
    priority_va: Vec<PriorityEntry>,
    priority_sa: Vec<PriorityEntry>,
    config: Rc<SimConfig>,
}

/// Move each winner to the back of its table so it has the lowest
/// priority in the next round.
fn rotate_winners(table: &mut Vec<PriorityEntry>, winners: &[PriorityEntry]) {
    for winner in winners {
        if let Some(pos) = table.iter().position(|entry| entry == winner) {
            let entry = table.remove(pos);
            table.push(entry);
        }
    }
}

impl Router {
    /// Create a router with no ports yet.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, router_id: NodeId, config: Rc<SimConfig>) -> Self {
        let entity = Rc::new(Entity::new(parent, &format!("router_{router_id}")));
        Self {
            entity,
            router_id,
            ports: Vec::new(),
            crossbar: Vec::new(),
            priority_va: Vec::new(),
            priority_sa: Vec::new(),
            config,
        }
    }

    /// Add a port facing node `port_id` and return its index.
    pub fn create_port(&mut self, port_id: NodeId) -> usize {
        self.ports.push(Port::new(
            port_id,
            self.router_id,
            self.config.microarchitecture.virtual_channel_number,
            self.config.microarchitecture.buffer_size,
        ));
        self.ports.len() - 1
    }

    /// Rebuild both priority tables over all (port, VC) pairs. Must be
    /// called once all ports exist.
    pub fn init_priorities(&mut self) {
        self.priority_va.clear();
        self.priority_sa.clear();
        for port in 0..self.ports.len() {
            for vc in 0..self.config.microarchitecture.virtual_channel_number {
                self.priority_va.push(PriorityEntry { port, vc });
                self.priority_sa.push(PriorityEntry { port, vc });
            }
        }
    }

    /// Flit ingress: move one flit per enabled input register into its
    /// virtual-channel buffer.
    fn receive_flits(&mut self) {
        for port in &mut self.ports {
            if !port.input.flits.enable {
                continue;
            }
            let Some(flit) = port.input.flits.pop() else {
                continue;
            };
            let Some(vc_index) = flit.vc else {
                debug_assert!(false, "flit arrived without an assigned virtual channel");
                continue;
            };
            let vc = &mut port.vcs[vc_index];
            debug_assert!(
                vc.buffer.len() < self.config.microarchitecture.buffer_size,
                "virtual channel buffer overflow"
            );
            vc.buffer.push_back(flit);
            match vc.input_state {
                InputVcState::Idle => vc.input_state = InputVcState::Routing,
                InputVcState::WaitingForFlits => vc.input_state = InputVcState::Active,
                _ => {}
            }
        }
    }

    /// Credit ingress: one credit per enabled input register frees one
    /// downstream buffer slot.
    fn receive_credits(&mut self) {
        for port in &mut self.ports {
            if !port.input.credits.enable {
                continue;
            }
            let Some(credit) = port.input.credits.pop() else {
                continue;
            };
            let vc = &mut port.vcs[credit.vc];
            vc.credit += 1;
            debug_assert!(
                vc.credit <= self.config.microarchitecture.buffer_size,
                "credit count exceeds downstream buffer size"
            );
            if vc.output_state == OutputVcState::WaitingForCredits {
                vc.output_state = OutputVcState::Active;
            }
            if credit.is_tail {
                vc.output_state = OutputVcState::Idle;
            }
        }
    }

    /// Route compute: consume the front of each routing head's route.
    ///
    /// The front is popped only when it names a router; the final
    /// (negative) terminal id stays in place so the next-to-last hop sees
    /// it as its routed output port.
    fn compute_routes(&mut self) {
        for port in &mut self.ports {
            for vc in &mut port.vcs {
                if vc.input_state != InputVcState::Routing || !vc.enable {
                    continue;
                }
                let Some(flit) = vc.buffer.front_mut() else {
                    debug_assert!(false, "routing state with an empty buffer");
                    continue;
                };
                let FlitKind::Head { route, .. } = &mut flit.kind else {
                    debug_assert!(false, "routing state with a non-head flit at the front");
                    continue;
                };
                let Some(&next_hop) = route.front() else {
                    debug_assert!(false, "head flit with an empty route");
                    continue;
                };
                if next_hop >= 0 {
                    route.pop_front();
                }
                vc.routed_output_port = next_hop;
                vc.input_state = InputVcState::VcAllocation;
                vc.enable = false;
            }
        }
    }

    /// Virtual-channel allocation, in VA priority-table order.
    ///
    /// A candidate wins the lowest-indexed idle virtual channel on its
    /// routed output port; winners rotate to the back of the table.
    fn allocate_virtual_channels(&mut self) {
        let mut winners = Vec::new();

        for index in 0..self.priority_va.len() {
            let entry = self.priority_va[index];
            let input = &self.ports[entry.port].vcs[entry.vc];
            if input.input_state != InputVcState::VcAllocation || !input.enable {
                continue;
            }
            let routed = input.routed_output_port;
            let Some(out_port) = self.ports.iter().position(|p| p.port_id == routed) else {
                continue;
            };
            let Some(out_vc) = self.ports[out_port]
                .vcs
                .iter()
                .position(|vc| vc.output_state == OutputVcState::Idle)
            else {
                continue;
            };

            let input = &mut self.ports[entry.port].vcs[entry.vc];
            input.allocated_vc = Some(out_vc);
            input.input_state = InputVcState::Active;
            input.enable = false;
            self.ports[out_port].vcs[out_vc].output_state = OutputVcState::Active;
            trace!(self.entity ;
                "VA: port {} vc {} -> port {} vc {}",
                entry.port, entry.vc, out_port, out_vc);
            winners.push(entry);
        }

        rotate_winners(&mut self.priority_va, &winners);
    }

    /// Whether neither side of a candidate connection is taken already.
    fn connection_is_free(&self, in_port: usize, out_port: usize) -> bool {
        self.crossbar
            .iter()
            .all(|c| c.in_port != in_port && c.out_port != out_port)
    }

    /// Switch allocation, in SA priority-table order.
    ///
    /// A candidate whose downstream virtual channel is still active and
    /// whose ports are unclaimed gets a crossbar connection for the next
    /// cycle's traversal. A candidate blocked by a crossbar conflict
    /// keeps its enable and its table position.
    fn allocate_switch(&mut self) {
        let mut winners = Vec::new();

        for index in 0..self.priority_sa.len() {
            let entry = self.priority_sa[index];
            let input = &self.ports[entry.port].vcs[entry.vc];
            if input.input_state != InputVcState::Active || !input.enable {
                continue;
            }
            let routed = input.routed_output_port;
            let Some(out_vc) = input.allocated_vc else {
                debug_assert!(false, "active channel without an allocated downstream VC");
                continue;
            };

            for out_port in 0..self.ports.len() {
                if self.ports[out_port].port_id != routed
                    || self.ports[out_port].vcs[out_vc].output_state != OutputVcState::Active
                {
                    continue;
                }
                if self.connection_is_free(entry.port, out_port) {
                    self.crossbar.push(Connection {
                        in_port: entry.port,
                        in_vc: entry.vc,
                        out_port,
                        out_vc,
                    });
                    self.ports[entry.port].vcs[entry.vc].enable = false;
                    winners.push(entry);
                }
                break;
            }
        }

        rotate_winners(&mut self.priority_sa, &winners);
    }

    /// Switch traversal: move one flit per crossbar connection.
    ///
    /// The connections are mutually non-conflicting by construction, so
    /// each moves independently: the flit is retagged with the downstream
    /// virtual channel, pushed into the output register, and a credit for
    /// the freed slot travels back out of the input port.
    fn traverse_switch(&mut self) {
        let connections = std::mem::take(&mut self.crossbar);
        for c in connections {
            let Some(mut flit) = self.ports[c.in_port].vcs[c.in_vc].buffer.pop_front() else {
                debug_assert!(false, "crossbar connection with an empty buffer");
                continue;
            };
            let is_tail = flit.is_tail();
            flit.vc = Some(c.out_vc);
            trace!(self.entity ;
                "ST: {} port {} vc {} -> port {} vc {}",
                flit, c.in_port, c.in_vc, c.out_port, c.out_vc);
            self.ports[c.out_port].output.flits.push(flit);

            // Terminals do not run credit flow control on their receive
            // side, so flits leaving through a terminal port cost nothing.
            let out_is_terminal = self.ports[c.out_port].is_terminal_port();
            if !out_is_terminal {
                let out = &mut self.ports[c.out_port].vcs[c.out_vc];
                debug_assert!(out.credit > 0, "credit underflow on switch traversal");
                out.credit -= 1;
            }
            if self.ports[c.out_port].vcs[c.out_vc].credit == 0 {
                self.ports[c.out_port].vcs[c.out_vc].output_state =
                    OutputVcState::WaitingForCredits;
            }

            if self.ports[c.in_port].vcs[c.in_vc].buffer.is_empty() {
                self.ports[c.in_port].vcs[c.in_vc].input_state = InputVcState::WaitingForFlits;
            }

            self.ports[c.in_port].output.credits.push(Credit {
                vc: c.in_vc,
                is_tail,
            });

            if is_tail {
                let input = &mut self.ports[c.in_port].vcs[c.in_vc];
                input.input_state = InputVcState::Idle;
                input.routed_output_port = self.router_id;
                input.allocated_vc = None;
                // A terminal never sends the tail credit that would reset
                // this state, so reset it directly.
                if out_is_terminal {
                    self.ports[c.out_port].vcs[c.out_vc].output_state = OutputVcState::Idle;
                }
            }
        }
    }
}

impl Synchronous for Router {
    fn update_enable(&mut self) {
        for port in &mut self.ports {
            port.input.update_enable();
            for vc in &mut port.vcs {
                vc.enable = true;
            }
        }
    }

    fn run_one_cycle(&mut self, _now: Cycle) {
        self.receive_flits();
        self.receive_credits();
        self.compute_routes();
        self.allocate_virtual_channels();
        self.traverse_switch();
        self.allocate_switch();
    }
}
