// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the simulator.

use crate::clock::Cycle;

/// The two-phase contract every clocked component follows.
///
/// The network driver calls [`update_enable`](Synchronous::update_enable)
/// on every component before any component runs its work phase, then calls
/// [`run_one_cycle`](Synchronous::run_one_cycle) on each. Components must
/// only read enables in the work phase and must never refresh them there,
/// otherwise data could cross two register boundaries in one cycle.
pub trait Synchronous {
    /// Sample register occupancy into the enable flags and reset any
    /// per-cycle latches.
    fn update_enable(&mut self);

    /// Perform this component's work for cycle `now`.
    fn run_one_cycle(&mut self, now: Cycle);
}
