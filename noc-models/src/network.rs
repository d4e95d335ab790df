// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Network composition and the cycle driver.
//!
//! The network owns every router, terminal and link in indexed
//! containers. Links do not hold references into the component graph;
//! they name their two endpoint ports by (node id, port index) and the
//! network resolves those on demand, so the structure has no ownership
//! cycles.
//!
//! Each simulated cycle has two phases. First every link, router and
//! terminal refreshes its register enables (and routers reset the per-VC
//! action latches); then every link moves at most one flit and one credit
//! per direction, every router runs its pipeline and every terminal
//! injects and receives. Because all cross-component communication
//! crosses registers whose enables were sampled up front, the order among
//! peers within a phase does not affect the result.

use std::rc::Rc;

use noc_engine::clock::{Clock, Cycle};
use noc_engine::config::SimConfig;
use noc_engine::traits::Synchronous;
use noc_engine::types::SimError;
use noc_track::entity::Entity;
use noc_track::info;

use crate::flit::NodeId;
use crate::port::Port;
use crate::router::Router;
use crate::routing::generate_routes;
use crate::terminal::TerminalInterface;
use crate::topology::link_pairs;

/// One end of a link: a port named by its owning node and port index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkEnd {
    /// Owning node id; negative for a terminal.
    pub node: NodeId,
    /// Index of the port within the owning node.
    pub port_index: usize,
}

/// A point-to-point link between two ports.
///
/// Per cycle and direction the link conveys at most one flit and one
/// credit, from one side's output registers to the other side's input
/// registers.
#[derive(Clone, Copy, Debug)]
pub struct Link {
    /// One end.
    pub left: LinkEnd,
    /// The other end.
    pub right: LinkEnd,
}

/// The composed network: routers, terminals, links and the clock.
pub struct Network {
    /// Entity for tracking.
    pub entity: Rc<Entity>,
    /// Shared simulation configuration.
    pub config: Rc<SimConfig>,
    /// Routers, indexed by router id.
    pub routers: Vec<Router>,
    /// Terminals; terminal `-(k+1)` is at index `k`.
    pub terminals: Vec<TerminalInterface>,
    /// All links, inter-router and terminal.
    pub links: Vec<Link>,
    clock: Clock,
}

/// Index of a terminal in [`Network::terminals`] from its (negative) id.
#[must_use]
pub fn terminal_index(terminal_id: NodeId) -> usize {
    debug_assert!(terminal_id < 0, "terminal ids are negative");
    (-terminal_id - 1) as usize
}

impl Network {
    /// Build the network described by `config`: routers, the mesh or
    /// torus link fabric, one terminal per router, precomputed routes and
    /// the arbitration priority tables.
    pub fn new(parent: &Rc<Entity>, config: Rc<SimConfig>) -> Result<Self, SimError> {
        config.validate()?;
        let entity = Rc::new(Entity::new(parent, "network"));
        let count = config.router_count();

        let mut network = Self {
            entity: entity.clone(),
            config: config.clone(),
            routers: (0..count)
                .map(|id| Router::new(&entity, id as NodeId, config.clone()))
                .collect(),
            terminals: Vec::with_capacity(count),
            links: Vec::new(),
            clock: Clock::new(),
        };

        for (left, right) in link_pairs(config.topology.dimension, config.topology.shape) {
            let left_port = network.routers[left as usize].create_port(right);
            let right_port = network.routers[right as usize].create_port(left);
            network.links.push(Link {
                left: LinkEnd {
                    node: left,
                    port_index: left_port,
                },
                right: LinkEnd {
                    node: right,
                    port_index: right_port,
                },
            });
        }

        for router in 0..count {
            let terminal_id = -(router as NodeId) - 1;
            let router_port = network.routers[router].create_port(terminal_id);
            network.terminals.push(TerminalInterface::new(
                &entity,
                terminal_id,
                router as NodeId,
                config.clone(),
            ));
            network.links.push(Link {
                left: LinkEnd {
                    node: router as NodeId,
                    port_index: router_port,
                },
                right: LinkEnd {
                    node: terminal_id,
                    port_index: 0,
                },
            });
        }

        for (terminal, table) in network
            .terminals
            .iter_mut()
            .zip(generate_routes(&config))
        {
            terminal.routing_table = table;
        }

        for router in &mut network.routers {
            router.init_priorities();
        }

        let [x, y, z] = config.topology.dimension;
        info!(network.entity ;
            "built {x}x{y}x{z} {} with {} routers, {} terminals and {} links",
            config.topology.shape, count, count, network.links.len());

        Ok(network)
    }

    /// The current cycle.
    #[must_use]
    pub fn cycle(&self) -> Cycle {
        self.clock.now()
    }

    /// Resolve a link end to its port.
    fn port_mut(&mut self, end: LinkEnd) -> &mut Port {
        if end.node >= 0 {
            &mut self.routers[end.node as usize].ports[end.port_index]
        } else {
            &mut self.terminals[terminal_index(end.node)].port
        }
    }

    /// Refresh the output-register enables on both ends of a link.
    fn link_update_enable(&mut self, index: usize) {
        let Link { left, right } = self.links[index];
        self.port_mut(left).output.update_enable();
        self.port_mut(right).output.update_enable();
    }

    /// Move at most one flit and one credit in each direction.
    fn link_run_one_cycle(&mut self, index: usize) {
        let Link { left, right } = self.links[index];
        self.transfer(left, right);
        self.transfer(right, left);
    }

    /// Carry one enabled flit and one enabled credit from `from`'s output
    /// registers into `to`'s input registers.
    fn transfer(&mut self, from: LinkEnd, to: LinkEnd) {
        let flit = {
            let port = self.port_mut(from);
            if port.output.flits.enable {
                port.output.flits.pop()
            } else {
                None
            }
        };
        if let Some(flit) = flit {
            self.port_mut(to).input.flits.push(flit);
        }

        let credit = {
            let port = self.port_mut(from);
            if port.output.credits.enable {
                port.output.credits.pop()
            } else {
                None
            }
        };
        if let Some(credit) = credit {
            self.port_mut(to).input.credits.push(credit);
        }
    }

    /// Advance the whole network by one cycle: the enable phase over
    /// links, routers and terminals, then the work phase in the same
    /// order.
    pub fn run_one_cycle(&mut self) {
        for index in 0..self.links.len() {
            self.link_update_enable(index);
        }
        for router in &mut self.routers {
            router.update_enable();
        }
        for terminal in &mut self.terminals {
            terminal.update_enable();
        }

        for index in 0..self.links.len() {
            self.link_run_one_cycle(index);
        }
        let now = self.clock.now();
        for router in &mut self.routers {
            router.run_one_cycle(now);
        }
        for terminal in &mut self.terminals {
            terminal.run_one_cycle(now);
        }

        self.clock.tick();
    }

    /// Run `cycles` whole cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.run_one_cycle();
        }
    }
}
