// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A simulation entity.
//!
//! All parts of a model should contain an entity in order to maintain a
//! hierarchy of simulation entities. They contain a name and a unique id
//! for tracking.

use std::fmt;
use std::rc::Rc;

use crate::{Id, Tracker};

/// A simulation entity
///
/// An entity is a part of a hierarchical simulation in which it must have a
/// parent. The simulation top-level should be created using
/// [`toplevel`](crate::entity::toplevel).
///
/// The entity is used when logging so that its unique id can be emitted and
/// it can determine which messages are emitted.
pub struct Entity {
    /// Name of this entity.
    pub name: String,

    /// Optional parent entity (only the top-level should be None).
    pub parent: Option<Rc<Entity>>,

    /// Unique simulation identifier used for log messages.
    pub id: Id,

    /// [`Tracker`] used to handle log events.
    pub tracker: Tracker,
}

static JOIN: &str = "::";

impl Entity {
    /// Create a new entity.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let mut full_name = parent.full_name();
        full_name.push_str(JOIN);
        full_name.push_str(name);

        let tracker = parent.tracker.clone();
        let id = tracker.unique_id();
        tracker.add_entity(id, &full_name);

        Self {
            name: String::from(name),
            parent: Some(parent.clone()),
            id,
            tracker,
        }
    }

    /// Returns the full hierarchical name of this entity
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => {
                let mut name = parent.full_name();
                name.push_str(JOIN);
                name.push_str(self.name.as_str());
                name
            }
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("id", &self.id)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            parent.fmt(f)?;
            write!(f, "{}{}", JOIN, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Create the top-level entity. This should be the only entity without a
/// parent.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    let id = tracker.unique_id();
    tracker.add_entity(id, name);
    Rc::new(Entity {
        parent: None,
        name: String::from(name),
        id,
        tracker: tracker.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{dev_null_tracker, EntityManager, TextTracker, Tracker};

    fn sink_tracker() -> Tracker {
        let manager = EntityManager::new(log::Level::Warn);
        Rc::new(TextTracker::new(manager, Box::new(std::io::sink())))
    }

    #[test]
    fn full_names() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let network = Rc::new(Entity::new(&top, "network"));
        let router = Entity::new(&network, "router_3");

        assert_eq!(top.full_name(), "top");
        assert_eq!(router.full_name(), "top::network::router_3");
        assert_eq!(format!("{router}"), "top::network::router_3");
    }

    #[test]
    fn unique_ids() {
        let tracker = sink_tracker();
        let top = toplevel(&tracker, "top");
        let a = Entity::new(&top, "a");
        let b = Entity::new(&top, "b");
        assert_ne!(a.id, b.id);
    }
}
