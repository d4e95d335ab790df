// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The flow-control units carried through the network.
//!
//! A packet is cut into exactly one head flit, zero or more body flits and
//! one tail flit, in that order. The head carries the precomputed route,
//! the bodies carry the payload words and the tail carries the packet
//! identifier. The three kinds share no other fields, so they are a tagged
//! variant rather than one struct with unused slots.

use std::collections::VecDeque;
use std::fmt;

/// Identifier of a network node. Routers are `0, 1, …`; terminals are
/// `-1, -2, …`. A negative id therefore always names a terminal.
pub type NodeId = i32;

/// Kind-specific contents of a flit.
#[derive(Clone, Debug, PartialEq)]
pub enum FlitKind {
    /// First flit of a packet; opens the virtual-channel connection.
    Head {
        /// Originating terminal.
        source: NodeId,
        /// Remaining hops. The front is consumed by each router's route
        /// compute stage except for the final element, the (negative)
        /// destination terminal id, which stays visible so the last
        /// router can route to its terminal port.
        route: VecDeque<NodeId>,
    },
    /// Payload-carrying flit.
    Body {
        /// Up to `flit_size` payload words; the last body of a packet may
        /// carry fewer.
        payload: Vec<f32>,
        /// Word offset of this body within the packet payload.
        offset: usize,
    },
    /// Last flit of a packet; tears the virtual-channel connection down.
    Tail {
        /// Identifier of the containing packet.
        packet_id: u64,
    },
}

/// One flow-control unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Flit {
    /// Virtual channel carrying this flit; assigned at VC allocation and
    /// rewritten to the downstream index at every switch traversal.
    pub vc: Option<usize>,
    /// Head, body or tail contents.
    pub kind: FlitKind,
}

impl Flit {
    /// Create a head flit.
    #[must_use]
    pub fn head(source: NodeId, route: VecDeque<NodeId>) -> Self {
        Self {
            vc: None,
            kind: FlitKind::Head { source, route },
        }
    }

    /// Create a body flit.
    #[must_use]
    pub fn body(payload: Vec<f32>, offset: usize) -> Self {
        Self {
            vc: None,
            kind: FlitKind::Body { payload, offset },
        }
    }

    /// Create a tail flit.
    #[must_use]
    pub fn tail(packet_id: u64) -> Self {
        Self {
            vc: None,
            kind: FlitKind::Tail { packet_id },
        }
    }

    /// Whether this is a head flit.
    #[must_use]
    pub fn is_head(&self) -> bool {
        matches!(self.kind, FlitKind::Head { .. })
    }

    /// Whether this is a tail flit.
    #[must_use]
    pub fn is_tail(&self) -> bool {
        matches!(self.kind, FlitKind::Tail { .. })
    }
}

impl fmt::Display for Flit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vc = match self.vc {
            Some(vc) => vc as i64,
            None => -1,
        };
        match &self.kind {
            FlitKind::Head { source, route } => {
                write!(f, "H[vc{vc} {source} via {route:?}]")
            }
            FlitKind::Body { payload, offset } => {
                write!(f, "B[vc{vc} +{offset} {} words]", payload.len())
            }
            FlitKind::Tail { packet_id } => write!(f, "T[vc{vc} packet {packet_id}]"),
        }
    }
}

/// A whole packet, as deposited by the traffic generator and as
/// reassembled at the destination terminal.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    /// Per-source sequential identifier.
    pub packet_id: u64,
    /// Source terminal (negative id).
    pub source: NodeId,
    /// Destination terminal (negative id).
    pub destination: NodeId,
    /// Payload words.
    pub payload: Vec<f32>,
}

/// Acknowledgement returned upstream when a buffer slot frees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credit {
    /// Virtual channel the slot belongs to.
    pub vc: usize,
    /// True when the freed flit was a tail; the sender's downstream state
    /// for this channel returns to idle.
    pub is_tail: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let head = Flit::head(-1, VecDeque::from([1, -2]));
        let body = Flit::body(vec![0.0, 1.0], 0);
        let tail = Flit::tail(7);

        assert!(head.is_head() && !head.is_tail());
        assert!(!body.is_head() && !body.is_tail());
        assert!(tail.is_tail() && !tail.is_head());
        assert_eq!(head.vc, None);
    }
}
