// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The terminal interface: the traffic source and sink attached to one
//! router.
//!
//! Each cycle a terminal injects pending traffic, receives credits, sends
//! one flit from its source queue and receives one flit into its reorder
//! buffer. A terminal has exactly one port; this invariant is what lets
//! the live send-side virtual-channel allocation be a single field
//! (`active_vc`) rather than per-port state.

use std::collections::VecDeque;
use std::rc::Rc;

use noc_engine::clock::{Cycle, InjectionTimer};
use noc_engine::config::{InjectionProcess, SimConfig};
use noc_engine::traits::Synchronous;
use noc_track::entity::Entity;
use noc_track::{trace, warn};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::channel::OutputVcState;
use crate::flit::{Flit, FlitKind, NodeId, Packet};
use crate::port::Port;
use crate::routing::RouteTable;
use crate::traffic::{PacketStatus, TrafficEntry};

/// The traffic source/sink attached to one router.
pub struct TerminalInterface {
    /// Entity for tracking.
    pub entity: Rc<Entity>,
    /// This terminal's identifier (negative).
    pub terminal_id: NodeId,
    /// The single port connecting this terminal to its router.
    pub port: Port,
    /// Destination terminal id to precomputed hop sequence.
    pub routing_table: RouteTable,
    /// Flits awaiting injection, in packet order.
    pub source_queue: VecDeque<Flit>,
    /// Pending and sent packets, in generation order.
    pub output_traffic: Vec<TrafficEntry>,
    /// Received packets, in arrival order.
    pub input_traffic: Vec<TrafficEntry>,
    /// Received flits awaiting reassembly, one ordered queue per virtual
    /// channel.
    reorder: Vec<VecDeque<Flit>>,
    /// Send-side virtual channel of the packet currently leaving, if any.
    active_vc: Option<usize>,
    timer: InjectionTimer,
    rng: Xoshiro256PlusPlus,
    config: Rc<SimConfig>,
}

impl TerminalInterface {
    /// Create the terminal with id `terminal_id` attached to router
    /// `router_id`.
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        terminal_id: NodeId,
        router_id: NodeId,
        config: Rc<SimConfig>,
    ) -> Self {
        debug_assert!(terminal_id < 0, "terminal ids are negative");
        let index = (-terminal_id - 1) as u64;
        let entity = Rc::new(Entity::new(parent, &format!("terminal_{index}")));
        // Each terminal gets its own stream so runs are reproducible and
        // terminals stay decorrelated.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.traffic.seed ^ index);
        // Stagger periodic injectors so they do not all fire together.
        let offset = rng.gen_range(0..=10) as f64;
        let vc_count = config.microarchitecture.virtual_channel_number;
        Self {
            entity,
            terminal_id,
            port: Port::new(
                router_id,
                terminal_id,
                vc_count,
                config.microarchitecture.buffer_size,
            ),
            routing_table: RouteTable::new(),
            source_queue: VecDeque::new(),
            output_traffic: Vec::new(),
            input_traffic: Vec::new(),
            reorder: (0..vc_count).map(|_| VecDeque::new()).collect(),
            active_vc: None,
            timer: InjectionTimer::starting_at(offset),
            rng,
            config,
        }
    }

    /// Deposit a pending packet for later injection.
    pub fn queue_packet(&mut self, entry: TrafficEntry) {
        self.output_traffic.push(entry);
    }

    /// Decide, by the configured inter-arrival law, whether to admit one
    /// pending packet this cycle.
    fn inject_traffic(&mut self, now: Cycle) {
        let rate = self.config.traffic.injection_rate;
        if rate <= 0.0 {
            return;
        }
        match self.config.traffic.injection_process {
            InjectionProcess::Periodic => {
                if self.timer.due(now) {
                    self.admit_packet(now);
                    self.timer.schedule(1.0 / rate);
                }
            }
            InjectionProcess::Bernoulli => {
                if self.rng.gen_bool(rate) {
                    self.admit_packet(now);
                }
            }
            InjectionProcess::MarkovModulated => {
                let alpha = self.config.traffic.alpha;
                let beta = self.config.traffic.beta;
                let on_probability = alpha / (alpha + beta);
                if self.rng.gen_bool(on_probability) && self.rng.gen_bool(rate) {
                    self.admit_packet(now);
                }
            }
        }
    }

    /// Admit the oldest pending packet: mark it sent and cut it into
    /// flits on the source queue.
    fn admit_packet(&mut self, now: Cycle) {
        let Some(entry) = self
            .output_traffic
            .iter_mut()
            .find(|entry| entry.status == PacketStatus::Valid)
        else {
            return;
        };
        entry.status = PacketStatus::Sent;
        entry.sent_time = now;
        let packet = Packet {
            packet_id: entry.packet_id,
            source: entry.source,
            destination: entry.destination,
            payload: entry.payload.clone(),
        };
        trace!(self.entity ;
            "inject packet {} -> {} ({} words) at cycle {}",
            packet.packet_id, packet.destination, packet.payload.len(), now);
        self.make_flits(packet);
    }

    /// Cut a packet into head, bodies and tail on the source queue.
    fn make_flits(&mut self, packet: Packet) {
        let route = self.route_to(packet.destination);
        self.source_queue.push_back(Flit::head(packet.source, route));
        let flit_size = self.config.traffic.flit_size;
        for (index, chunk) in packet.payload.chunks(flit_size).enumerate() {
            self.source_queue
                .push_back(Flit::body(chunk.to_vec(), index * flit_size));
        }
        self.source_queue.push_back(Flit::tail(packet.packet_id));
    }

    /// Look up the precomputed hop sequence for a destination.
    ///
    /// An unknown destination yields an empty route. That can only happen
    /// when a source addresses itself, which the traffic generators never
    /// do, so it is treated as a logic error.
    fn route_to(&self, destination: NodeId) -> VecDeque<NodeId> {
        match self.routing_table.get(&destination) {
            Some(route) => route.clone(),
            None => {
                debug_assert!(false, "no route from {} to {destination}", self.terminal_id);
                warn!(self.entity ; "no route to {destination}");
                VecDeque::new()
            }
        }
    }

    /// Credit ingress, exactly as in a router.
    fn receive_credit(&mut self) {
        if !self.port.input.credits.enable {
            return;
        }
        let Some(credit) = self.port.input.credits.pop() else {
            return;
        };
        let vc = &mut self.port.vcs[credit.vc];
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

    /// Send at most one flit from the source queue into the port's output
    /// register.
    fn send_flit(&mut self) {
        let Some(front) = self.source_queue.front() else {
            return;
        };
        if front.is_head() {
            if let Some(vc) = self.allocate_virtual_channel() {
                self.active_vc = Some(vc);
                self.move_flit_out();
            }
        } else {
            let Some(vc) = self.active_vc else {
                debug_assert!(false, "body or tail queued without a live allocation");
                return;
            };
            if self.port.vcs[vc].output_state == OutputVcState::Active {
                self.move_flit_out();
            }
        }
    }

    /// Pick the first idle downstream virtual channel, if any.
    fn allocate_virtual_channel(&mut self) -> Option<usize> {
        let vc = self
            .port
            .vcs
            .iter()
            .position(|vc| vc.output_state == OutputVcState::Idle)?;
        self.port.vcs[vc].output_state = OutputVcState::Active;
        Some(vc)
    }

    /// Move the front flit out on the active virtual channel, spending
    /// one credit.
    fn move_flit_out(&mut self) {
        let Some(vc) = self.active_vc else {
            debug_assert!(false, "flit sent without a live allocation");
            return;
        };
        let Some(mut flit) = self.source_queue.pop_front() else {
            return;
        };
        flit.vc = Some(vc);
        trace!(self.entity ; "send {} on vc {}", flit, vc);
        self.port.output.flits.push(flit);
        let channel = &mut self.port.vcs[vc];
        debug_assert!(channel.credit > 0, "credit underflow on terminal send");
        channel.credit -= 1;
        if channel.credit == 0 {
            channel.output_state = OutputVcState::WaitingForCredits;
        }
    }

    /// Receive at most one flit into the reorder buffer; a tail triggers
    /// reassembly of its packet.
    fn receive_flit(&mut self, now: Cycle) {
        if !self.port.input.flits.enable {
            return;
        }
        let Some(flit) = self.port.input.flits.pop() else {
            return;
        };
        let Some(vc) = flit.vc else {
            debug_assert!(false, "flit arrived without an assigned virtual channel");
            return;
        };
        let is_tail = flit.is_tail();
        self.reorder[vc].push_back(flit);
        if is_tail {
            self.make_packet(vc, now);
        }
    }

    /// Reassemble the packet occupying virtual channel `vc` of the
    /// reorder buffer.
    ///
    /// Within one virtual channel flits arrive in packet order (a channel
    /// carries at most one packet at a time from head through tail), so
    /// draining the queue in arrival order reconstructs the packet.
    fn make_packet(&mut self, vc: usize, now: Cycle) {
        let mut packet = Packet {
            packet_id: 0,
            source: 0,
            destination: 0,
            payload: Vec::new(),
        };
        for flit in std::mem::take(&mut self.reorder[vc]) {
            match flit.kind {
                FlitKind::Head { source, route } => {
                    packet.source = source;
                    packet.destination = route.back().copied().unwrap_or(self.terminal_id);
                }
                FlitKind::Body { payload, .. } => packet.payload.extend_from_slice(&payload),
                FlitKind::Tail { packet_id } => packet.packet_id = packet_id,
            }
        }
        trace!(self.entity ;
            "reassembled packet {} from {} ({} words) at cycle {}",
            packet.packet_id, packet.source, packet.payload.len(), now);
        self.input_traffic.push(TrafficEntry {
            packet_id: packet.packet_id,
            source: packet.source,
            destination: packet.destination,
            packet_size: packet.payload.len(),
            status: PacketStatus::Received,
            sent_time: 0,
            received_time: now,
            payload: packet.payload,
        });
    }
}

impl Synchronous for TerminalInterface {
    fn update_enable(&mut self) {
        self.port.input.update_enable();
    }

    fn run_one_cycle(&mut self, now: Cycle) {
        self.inject_traffic(now);
        self.receive_credit();
        self.send_flit();
        self.receive_flit(now);
    }
}
