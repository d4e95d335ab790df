// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Deterministic route precomputation.
//!
//! Before simulation starts, every terminal is given one hop sequence per
//! other-terminal destination: the ordered router ids to visit, terminated
//! by the destination terminal id. The router pipeline never consults the
//! policy again; it only consumes the hop sequence on each head flit.
//!
//! The randomized policies (ROMM, VAL) draw from a generator seeded by
//! `traffic.seed`, so a configuration reproduces its routes exactly.

use std::collections::{HashMap, VecDeque};

use noc_engine::config::{RoutingAlgorithm, Shape, SimConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::flit::NodeId;
use crate::topology::{coordinate_to_id, id_to_coordinate, Coordinate};

/// Routing table of one terminal: destination terminal id to hop
/// sequence.
pub type RouteTable = HashMap<NodeId, VecDeque<NodeId>>;

/// Precompute the routing table of every terminal, indexed by terminal
/// index (terminal `-(k+1)` is at index `k`).
#[must_use]
pub fn generate_routes(config: &SimConfig) -> Vec<RouteTable> {
    let dimension = config.topology.dimension;
    let shape = config.topology.shape;
    let count = config.router_count();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.traffic.seed);

    (0..count)
        .map(|source| {
            let src = id_to_coordinate(source as NodeId, dimension);
            let mut table = RouteTable::new();
            for destination in 0..count {
                if destination == source {
                    continue;
                }
                let dest = id_to_coordinate(destination as NodeId, dimension);
                let mut route = match config.routing.algorithm {
                    RoutingAlgorithm::Dor => dor_path(src, dest, dimension, shape),
                    // VAL is ROMM's random-intermediate scheme under
                    // another name once routes are precomputed.
                    RoutingAlgorithm::Romm | RoutingAlgorithm::Val => {
                        randomized_minimal_path(src, dest, dimension, count, &mut rng)
                    }
                    RoutingAlgorithm::Mad => adaptive_path(src, dest, dimension),
                    RoutingAlgorithm::OddEven => odd_even_path(src, dest, dimension),
                };
                let dest_terminal = -(destination as NodeId) - 1;
                route.push_back(dest_terminal);
                table.insert(dest_terminal, route);
            }
            table
        })
        .collect()
}

/// Dimension-ordered walk from `next` to `dest` without wrap-around,
/// appending visited router ids. Used directly by the mesh and as the
/// phase primitive of the randomized policies.
fn mesh_dor_steps(
    next: &mut Coordinate,
    dest: Coordinate,
    dimension: [usize; 3],
    route: &mut VecDeque<NodeId>,
) {
    let [dim_x, dim_y, dim_z] = dimension;
    while dest.x != next.x {
        *next = if dest.x > next.x {
            next.increment_x(dim_x)
        } else {
            next.decrement_x(dim_x)
        };
        route.push_back(coordinate_to_id(*next, dimension));
    }
    while dest.y != next.y {
        *next = if dest.y > next.y {
            next.increment_y(dim_y)
        } else {
            next.decrement_y(dim_y)
        };
        route.push_back(coordinate_to_id(*next, dimension));
    }
    while dest.z != next.z {
        *next = if dest.z > next.z {
            next.increment_z(dim_z)
        } else {
            next.decrement_z(dim_z)
        };
        route.push_back(coordinate_to_id(*next, dimension));
    }
}

/// Torus-aware step choice for one axis: take the shorter way around,
/// with ties broken by the strict comparisons against ±dim/2.
fn torus_axis_step(delta: i64, half: i64) -> bool {
    // Returns true to increment, false to decrement.
    if delta > 0 {
        delta <= half
    } else {
        delta < -half
    }
}

/// Dimension-ordered routing. In a torus each step takes the shorter
/// direction around the ring.
fn dor_path(
    src: Coordinate,
    dest: Coordinate,
    dimension: [usize; 3],
    shape: Shape,
) -> VecDeque<NodeId> {
    let mut route = VecDeque::new();
    let mut next = src;
    match shape {
        Shape::Mesh => mesh_dor_steps(&mut next, dest, dimension, &mut route),
        Shape::Torus => {
            let [dim_x, dim_y, dim_z] = dimension;
            while dest.x != next.x {
                let delta = dest.x as i64 - next.x as i64;
                next = if torus_axis_step(delta, (dim_x / 2) as i64) {
                    next.increment_x(dim_x)
                } else {
                    next.decrement_x(dim_x)
                };
                route.push_back(coordinate_to_id(next, dimension));
            }
            while dest.y != next.y {
                let delta = dest.y as i64 - next.y as i64;
                next = if torus_axis_step(delta, (dim_y / 2) as i64) {
                    next.increment_y(dim_y)
                } else {
                    next.decrement_y(dim_y)
                };
                route.push_back(coordinate_to_id(next, dimension));
            }
            while dest.z != next.z {
                let delta = dest.z as i64 - next.z as i64;
                next = if torus_axis_step(delta, (dim_z / 2) as i64) {
                    next.increment_z(dim_z)
                } else {
                    next.decrement_z(dim_z)
                };
                route.push_back(coordinate_to_id(next, dimension));
            }
        }
    }
    route
}

/// Randomized oblivious multi-phase minimal routing: DOR to a random
/// intermediate distinct from both endpoints, then DOR to the
/// destination. Networks with fewer than three routers have no such
/// intermediate and take the single-phase path.
fn randomized_minimal_path(
    src: Coordinate,
    dest: Coordinate,
    dimension: [usize; 3],
    router_count: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> VecDeque<NodeId> {
    let mut route = VecDeque::new();
    let mut next = src;
    if router_count >= 3 {
        let [dim_x, dim_y, dim_z] = dimension;
        let intermediate = loop {
            let candidate = Coordinate {
                x: rng.gen_range(0..dim_x),
                y: rng.gen_range(0..dim_y),
                z: rng.gen_range(0..dim_z),
            };
            if candidate != src && candidate != dest {
                break candidate;
            }
        };
        mesh_dor_steps(&mut next, intermediate, dimension, &mut route);
    }
    mesh_dor_steps(&mut next, dest, dimension, &mut route);
    route
}

/// Minimal adaptive routing, precomputed flavour: at each hop advance one
/// step in the dimension with the greatest remaining distance.
fn adaptive_path(src: Coordinate, dest: Coordinate, dimension: [usize; 3]) -> VecDeque<NodeId> {
    let [dim_x, dim_y, dim_z] = dimension;
    let mut route = VecDeque::new();
    let mut next = src;

    while next != dest {
        let dx = (dest.x as i64 - next.x as i64).abs();
        let dy = (dest.y as i64 - next.y as i64).abs();
        let dz = (dest.z as i64 - next.z as i64).abs();

        next = if dx >= dy && dx >= dz {
            if dest.x > next.x {
                next.increment_x(dim_x)
            } else {
                next.decrement_x(dim_x)
            }
        } else if dy >= dx && dy >= dz {
            if dest.y > next.y {
                next.increment_y(dim_y)
            } else {
                next.decrement_y(dim_y)
            }
        } else if dest.z > next.z {
            next.increment_z(dim_z)
        } else {
            next.decrement_z(dim_z)
        };
        route.push_back(coordinate_to_id(next, dimension));
    }
    route
}

/// Odd-even turn restriction for 2-D networks: an even column may only
/// turn north/south once in the destination column, an odd column may
/// only turn east/west once in the destination row. Three-dimensional
/// networks fall back to a dimension-ordered walk.
fn odd_even_path(src: Coordinate, dest: Coordinate, dimension: [usize; 3]) -> VecDeque<NodeId> {
    let [dim_x, dim_y, dim_z] = dimension;
    let mut route = VecDeque::new();
    let mut next = src;

    while next != dest {
        let dx = dest.x as i64 - next.x as i64;
        let dy = dest.y as i64 - next.y as i64;

        next = if dim_z == 1 {
            if next.x % 2 == 0 {
                if dx > 0 {
                    next.increment_x(dim_x)
                } else if dx < 0 {
                    next.decrement_x(dim_x)
                } else if dy > 0 {
                    next.increment_y(dim_y)
                } else {
                    next.decrement_y(dim_y)
                }
            } else if dy > 0 {
                next.increment_y(dim_y)
            } else if dy < 0 {
                next.decrement_y(dim_y)
            } else if dx > 0 {
                next.increment_x(dim_x)
            } else {
                next.decrement_x(dim_x)
            }
        } else if dx > 0 {
            next.increment_x(dim_x)
        } else if dx < 0 {
            next.decrement_x(dim_x)
        } else if dy > 0 {
            next.increment_y(dim_y)
        } else if dy < 0 {
            next.decrement_y(dim_y)
        } else if dest.z > next.z {
            next.increment_z(dim_z)
        } else {
            next.decrement_z(dim_z)
        };
        route.push_back(coordinate_to_id(next, dimension));
    }
    route
}
