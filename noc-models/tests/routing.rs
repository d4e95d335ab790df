// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Properties of the precomputed route tables.

mod common;

use noc_engine::config::{RoutingAlgorithm, Shape};
use noc_models::flit::NodeId;
use noc_models::routing::generate_routes;
use noc_models::topology::{id_to_coordinate, terminal_coordinate, Coordinate};

fn manhattan(a: Coordinate, b: Coordinate) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y) + a.z.abs_diff(b.z)
}

/// Consecutive routers on a route must be one grid step apart, allowing
/// the wrap step in a torus.
fn assert_hops_adjacent(route: &[NodeId], start: Coordinate, dimension: [usize; 3], torus: bool) {
    let mut previous = start;
    for &hop in route {
        let here = id_to_coordinate(hop, dimension);
        let step = |from: usize, to: usize, dim: usize| {
            let direct = from.abs_diff(to);
            if torus {
                direct.min(dim - direct)
            } else {
                direct
            }
        };
        let total = step(previous.x, here.x, dimension[0])
            + step(previous.y, here.y, dimension[1])
            + step(previous.z, here.z, dimension[2]);
        assert_eq!(total, 1, "hop from {previous:?} to {here:?} is not one step");
        previous = here;
    }
}

#[test]
fn dor_mesh_routes_are_minimal() {
    let dimension = [4, 3, 2];
    let config = common::config(dimension, Shape::Mesh, 2, 4, 1, 2);
    let tables = generate_routes(&config);

    for (index, table) in tables.iter().enumerate() {
        let source_id = -(index as NodeId) - 1;
        let src = terminal_coordinate(source_id, dimension);
        assert_eq!(table.len(), 23, "one route per other terminal");
        for (&destination, route) in table {
            assert_ne!(destination, source_id);
            let dest = terminal_coordinate(destination, dimension);
            assert_eq!(*route.back().unwrap(), destination);
            let hops: Vec<NodeId> = route.iter().copied().take(route.len() - 1).collect();
            assert_eq!(hops.len(), manhattan(src, dest));
            assert_hops_adjacent(&hops, src, dimension, false);
        }
    }
}

#[test]
fn torus_wrap_route_is_one_hop() {
    // From terminal -1 (router 0) to terminal -4 (router 3) the wrap
    // link is shorter than walking the ring forward.
    let dimension = [4, 1, 1];
    let config = common::config(dimension, Shape::Torus, 2, 4, 1, 2);
    let tables = generate_routes(&config);

    let route: Vec<NodeId> = tables[0][&-4].iter().copied().collect();
    assert_eq!(route, vec![3, -4]);
}

#[test]
fn dor_torus_routes_are_bounded_by_half_dimensions() {
    let dimension = [4, 4, 1];
    let config = common::config(dimension, Shape::Torus, 2, 4, 1, 2);
    let tables = generate_routes(&config);

    for (index, table) in tables.iter().enumerate() {
        let src = terminal_coordinate(-(index as NodeId) - 1, dimension);
        for (&destination, route) in table {
            assert_eq!(*route.back().unwrap(), destination);
            let hops: Vec<NodeId> = route.iter().copied().take(route.len() - 1).collect();
            assert!(hops.len() <= 2 + 2, "torus route longer than half-rings");
            assert_hops_adjacent(&hops, src, dimension, true);
        }
    }
}

#[test]
fn adaptive_routes_walk_the_longest_dimension_first() {
    let dimension = [3, 3, 3];
    let mut config = common::config(dimension, Shape::Mesh, 2, 4, 1, 2);
    config.routing.algorithm = RoutingAlgorithm::Mad;
    let tables = generate_routes(&config);

    for (index, table) in tables.iter().enumerate() {
        let src = terminal_coordinate(-(index as NodeId) - 1, dimension);
        for (&destination, route) in table {
            let dest = terminal_coordinate(destination, dimension);
            let hops: Vec<NodeId> = route.iter().copied().take(route.len() - 1).collect();
            assert_eq!(hops.len(), manhattan(src, dest), "adaptive routes are minimal");
            assert_hops_adjacent(&hops, src, dimension, false);

            if let Some(&first) = hops.first() {
                let here = id_to_coordinate(first, dimension);
                let moved_x = here.x != src.x;
                let dx = src.x.abs_diff(dest.x);
                let dy = src.y.abs_diff(dest.y);
                let dz = src.z.abs_diff(dest.z);
                if moved_x {
                    assert!(dx >= dy && dx >= dz);
                }
            }
        }
    }
}

#[test]
fn odd_even_routes_are_minimal_in_two_dimensions() {
    let dimension = [4, 4, 1];
    let mut config = common::config(dimension, Shape::Mesh, 2, 4, 1, 2);
    config.routing.algorithm = RoutingAlgorithm::OddEven;
    let tables = generate_routes(&config);

    for (index, table) in tables.iter().enumerate() {
        let src = terminal_coordinate(-(index as NodeId) - 1, dimension);
        for (&destination, route) in table {
            let dest = terminal_coordinate(destination, dimension);
            let hops: Vec<NodeId> = route.iter().copied().take(route.len() - 1).collect();
            assert_eq!(hops.len(), manhattan(src, dest));
            assert_hops_adjacent(&hops, src, dimension, false);
        }
    }
}

#[test]
fn randomized_routes_reach_their_destination() {
    let dimension = [4, 4, 1];
    let mut config = common::config(dimension, Shape::Mesh, 2, 4, 1, 2);
    config.routing.algorithm = RoutingAlgorithm::Romm;
    let tables = generate_routes(&config);

    for (index, table) in tables.iter().enumerate() {
        let source_id = -(index as NodeId) - 1;
        let src = terminal_coordinate(source_id, dimension);
        assert_eq!(table.len(), 15);
        for (&destination, route) in table {
            let dest = terminal_coordinate(destination, dimension);
            assert_eq!(*route.back().unwrap(), destination);
            let hops: Vec<NodeId> = route.iter().copied().take(route.len() - 1).collect();
            assert!(hops.len() >= manhattan(src, dest), "routes may detour, never teleport");
            assert_hops_adjacent(&hops, src, dimension, false);
            let last_router = id_to_coordinate(*hops.last().unwrap(), dimension);
            assert_eq!(last_router, dest);
        }
    }
}

#[test]
fn randomized_routes_are_reproducible_for_a_seed() {
    let mut config = common::config([4, 4, 1], Shape::Mesh, 2, 4, 1, 2);
    config.routing.algorithm = RoutingAlgorithm::Val;
    let first = generate_routes(&config);
    let second = generate_routes(&config);
    assert_eq!(first, second);
}

#[test]
fn randomized_routing_falls_back_to_dor_below_three_routers() {
    let mut config = common::config([2, 1, 1], Shape::Mesh, 2, 4, 1, 2);
    config.routing.algorithm = RoutingAlgorithm::Romm;
    let tables = generate_routes(&config);

    let route: Vec<NodeId> = tables[0][&-2].iter().copied().collect();
    assert_eq!(route, vec![1, -2]);
}
