// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Per-(port, virtual channel) state.
//!
//! Each virtual channel of a port is one record combining the input-side
//! control fields and flit buffer with the output-side downstream state
//! and credit count. The input side describes flits buffered *here*; the
//! output side mirrors the state of the matching buffer one hop
//! downstream.

use std::collections::VecDeque;
use std::fmt;

use crate::flit::{Flit, NodeId};

/// Input-side state machine of a virtual channel.
///
/// Transitions: `Idle → Routing → VcAllocation → Active`, with
/// `Active ⇄ WaitingForFlits` around mid-packet stalls, and back to `Idle`
/// when the tail traverses the switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputVcState {
    /// No packet occupies this channel.
    Idle,
    /// A head flit is buffered and needs its route computed.
    Routing,
    /// Routed; waiting for a downstream virtual channel.
    VcAllocation,
    /// Connected; flits may arbitrate for the switch.
    Active,
    /// Connected but drained mid-packet; the next flit reactivates it.
    WaitingForFlits,
}

/// Output-side (downstream) state machine of a virtual channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputVcState {
    /// The downstream channel is unallocated.
    Idle,
    /// Allocated to an upstream packet and accepting flits.
    Active,
    /// Allocated but out of credits; sends resume when one returns.
    WaitingForCredits,
}

impl fmt::Display for InputVcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            InputVcState::Idle => 'I',
            InputVcState::Routing => 'R',
            InputVcState::VcAllocation => 'V',
            InputVcState::Active => 'A',
            InputVcState::WaitingForFlits => 'F',
        };
        write!(f, "{c}")
    }
}

impl fmt::Display for OutputVcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            OutputVcState::Idle => 'I',
            OutputVcState::Active => 'A',
            OutputVcState::WaitingForCredits => 'C',
        };
        write!(f, "{c}")
    }
}

/// One virtual channel of one port.
#[derive(Clone, Debug)]
pub struct VirtualChannel {
    /// Per-cycle latch; true while this channel may still take one
    /// pipeline action (route compute, VC allocation or switch
    /// allocation) this cycle. Reset during the enable phase.
    pub enable: bool,

    /// Input-side state.
    pub input_state: InputVcState,
    /// Output port chosen by route compute. The owning node's own id
    /// serves as the never-matching idle sentinel, since ports are named
    /// by the far node.
    pub routed_output_port: NodeId,
    /// Downstream virtual channel index assigned by VC allocation.
    pub allocated_vc: Option<usize>,
    /// Buffered flits, at most `buffer_size` of them.
    pub buffer: VecDeque<Flit>,

    /// Output-side state.
    pub output_state: OutputVcState,
    /// Free buffer slots on the downstream virtual channel.
    pub credit: usize,
}

impl VirtualChannel {
    /// Create an idle channel for a port owned by node `owner`.
    #[must_use]
    pub fn new(owner: NodeId, buffer_size: usize) -> Self {
        Self {
            enable: true,
            input_state: InputVcState::Idle,
            routed_output_port: owner,
            allocated_vc: None,
            buffer: VecDeque::new(),
            output_state: OutputVcState::Idle,
            credit: buffer_size,
        }
    }
}
