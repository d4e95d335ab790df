// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use crate::tracker::Track;
use crate::{Id, NO_ID};

/// A tracker that does nothing.
///
/// This can be useful for tests and benchmarks that want to have minimum
/// overheads.
pub struct DevNullTracker;

impl Track for DevNullTracker {
    fn unique_id(&self) -> Id {
        NO_ID
    }
    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        false
    }
    fn add_entity(&self, _id: Id, _entity_name: &str) {}
    fn log(&self, _msg_by: Id, _level: log::Level, _msg: std::fmt::Arguments) {}
    fn shutdown(&self) {}
}
