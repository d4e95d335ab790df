// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Coordinate arithmetic and link enumeration for k-ary n-cubes.
//!
//! Router ids are assigned in row-major X-fastest order: the router with
//! id `r` sits at `(r mod x, (r mod (x·y)) div x, r div (x·y))`. All
//! coordinate steps are pure functions returning new coordinates; wrapping
//! is modulo the axis length.

use noc_engine::config::Shape;

use crate::flit::NodeId;

/// A position in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Coordinate {
    /// X position, the fastest-varying axis.
    pub x: usize,
    /// Y position.
    pub y: usize,
    /// Z position, the slowest-varying axis.
    pub z: usize,
}

impl Coordinate {
    /// One step in +X, wrapping at `limit`.
    #[must_use]
    pub fn increment_x(self, limit: usize) -> Self {
        Self {
            x: (self.x + 1) % limit,
            ..self
        }
    }

    /// One step in -X, wrapping at `limit`.
    #[must_use]
    pub fn decrement_x(self, limit: usize) -> Self {
        Self {
            x: (self.x + limit - 1) % limit,
            ..self
        }
    }

    /// One step in +Y, wrapping at `limit`.
    #[must_use]
    pub fn increment_y(self, limit: usize) -> Self {
        Self {
            y: (self.y + 1) % limit,
            ..self
        }
    }

    /// One step in -Y, wrapping at `limit`.
    #[must_use]
    pub fn decrement_y(self, limit: usize) -> Self {
        Self {
            y: (self.y + limit - 1) % limit,
            ..self
        }
    }

    /// One step in +Z, wrapping at `limit`.
    #[must_use]
    pub fn increment_z(self, limit: usize) -> Self {
        Self {
            z: (self.z + 1) % limit,
            ..self
        }
    }

    /// One step in -Z, wrapping at `limit`.
    #[must_use]
    pub fn decrement_z(self, limit: usize) -> Self {
        Self {
            z: (self.z + limit - 1) % limit,
            ..self
        }
    }
}

/// Convert a router id to its grid coordinate.
#[must_use]
pub fn id_to_coordinate(id: NodeId, dimension: [usize; 3]) -> Coordinate {
    debug_assert!(id >= 0, "only routers have grid coordinates");
    let id = id as usize;
    let [x, y, _] = dimension;
    Coordinate {
        x: (id % (x * y)) % x,
        y: (id % (x * y)) / x,
        z: id / (x * y),
    }
}

/// Convert a grid coordinate to a router id.
#[must_use]
pub fn coordinate_to_id(coordinate: Coordinate, dimension: [usize; 3]) -> NodeId {
    let [x, y, _] = dimension;
    (coordinate.x + coordinate.y * x + coordinate.z * x * y) as NodeId
}

/// Grid coordinate of the router a terminal is attached to.
#[must_use]
pub fn terminal_coordinate(terminal_id: NodeId, dimension: [usize; 3]) -> Coordinate {
    debug_assert!(terminal_id < 0, "terminal ids are negative");
    id_to_coordinate(-terminal_id - 1, dimension)
}

/// Enumerate the inter-router links of the grid, as (left router, right
/// router) id pairs in construction order.
///
/// A mesh links each router to its +X/+Y/+Z neighbour; a torus adds the
/// wrap-around link on every axis longer than one. A two-wide torus axis
/// therefore carries a double link between its two routers, one from each
/// side.
#[must_use]
pub fn link_pairs(dimension: [usize; 3], shape: Shape) -> Vec<(NodeId, NodeId)> {
    let [dim_x, dim_y, dim_z] = dimension;
    let mut pairs = Vec::new();
    let id = |x: usize, y: usize, z: usize| (x + y * dim_x + z * dim_x * dim_y) as NodeId;

    for z in 0..dim_z {
        for y in 0..dim_y {
            for x in 0..dim_x {
                match shape {
                    Shape::Mesh => {
                        if x != dim_x - 1 {
                            pairs.push((id(x, y, z), id(x + 1, y, z)));
                        }
                        if y != dim_y - 1 {
                            pairs.push((id(x, y, z), id(x, y + 1, z)));
                        }
                        if z != dim_z - 1 {
                            pairs.push((id(x, y, z), id(x, y, z + 1)));
                        }
                    }
                    Shape::Torus => {
                        if dim_x != 1 {
                            pairs.push((id(x, y, z), id((x + 1) % dim_x, y, z)));
                        }
                        if dim_y != 1 {
                            pairs.push((id(x, y, z), id(x, (y + 1) % dim_y, z)));
                        }
                        if dim_z != 1 {
                            pairs.push((id(x, y, z), id(x, y, (z + 1) % dim_z)));
                        }
                    }
                }
            }
        }
    }
    pairs
}
