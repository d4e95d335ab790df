// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared plumbing for the cycle-accurate NoC simulator.
//!
//! This crate holds the pieces that every other simulator crate builds on:
//! the [error types](crate::types), the validated immutable
//! [configuration record](crate::config), the simulation
//! [clock](crate::clock), the enable-gated [register](crate::register)
//! latch and the two-phase [`Synchronous`](crate::traits::Synchronous)
//! contract.
//!
//! The simulation advances in whole cycles. Each cycle has an _enable_
//! phase, in which every register samples whether it holds anything, and a
//! _work_ phase, in which components move at most one item across each
//! register boundary. Because the enables are sampled before any work is
//! done, an item written during a cycle cannot also be read in that same
//! cycle, exactly the behaviour of a bank of flip-flops.

pub mod clock;
pub mod config;
pub mod register;
pub mod traits;
pub mod types;
