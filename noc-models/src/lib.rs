// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The simulated hardware of a wormhole-switched, virtual-channel
//! flow-controlled network-on-chip.
//!
//! The network is a regular k-ary n-cube (3-D mesh or torus) of routers,
//! each with one attached traffic terminal. Packets are cut into flits
//! (head, body, tail) which travel through a four-stage router pipeline
//! (route compute, virtual-channel allocation, switch allocation, switch
//! traversal) under credit-based flow control. Every link and pipeline
//! stage costs at least one cycle.
//!
//! The [`Network`](crate::network::Network) owns all routers, terminals
//! and links in indexed containers; links refer to their two endpoint
//! ports by (node id, port index). Router ids are non-negative, terminal
//! ids are negative (`-1, -2, …`, terminal `-(k+1)` attached to router
//! `k`), and a port is named by the id of the node on the far side of its
//! link.

pub mod channel;
pub mod flit;
pub mod network;
pub mod port;
pub mod router;
pub mod routing;
pub mod terminal;
pub mod topology;
pub mod traffic;
