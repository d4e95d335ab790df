// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::io;
use std::rc::Rc;

use crate::tracker::{EntityManager, TextTracker, TrackConfigError};
use crate::Tracker;

/// Create a tracker that prints to stdout.
///
/// The user can pass a filter regular expression which will set the level
/// only for matching entities and set all other entities to only emit
/// errors.
pub fn build_stdout_tracker(
    level: log::Level,
    filter_regex: &str,
) -> Result<Tracker, TrackConfigError> {
    let default_level = if filter_regex.is_empty() {
        level
    } else {
        log::Level::Error
    };
    let mut entity_manager = EntityManager::new(default_level);
    if !filter_regex.is_empty() {
        entity_manager.add_entity_level_filter(filter_regex, level)?;
    }
    let stdout_writer = Box::new(io::BufWriter::new(io::stdout()));
    Ok(Rc::new(TextTracker::new(entity_manager, stdout_writer)))
}
