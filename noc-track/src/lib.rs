// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This crate provides _track_ capabilities for the simulator.
//!
//! _Track_ messages are text-based human-readable log lines emitted at
//! various levels of verbosity (from `Trace` through to `Error`) and scoped
//! to a hierarchical simulation [`Entity`](crate::entity::Entity). Each
//! entity can have its own level, selected by regular expression filters,
//! so that a single component deep in a large network can be traced without
//! drowning in output from its neighbours.

use std::fmt;

pub use log;

pub mod builder;
pub mod entity;
pub mod tracker;
pub use tracker::{Track, Tracker};

/// A type alias for objects that receive _track_ events.
pub type Writer = Box<dyn std::io::Write>;

/// Unique identifier assigned to each tracked entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id value which indicates that there is no valid entity.
pub const NO_ID: Id = Id(0);

/// The root id from which all other ids are derived.
pub const ROOT: Id = Id(1);

/// Take a command-line string and convert it to a [`log::Level`].
#[must_use]
pub fn str_to_level(lvl: &str) -> log::Level {
    match lvl.parse::<log::Level>() {
        Ok(level) => level,
        Err(_) => panic!("Unable to parse level string '{lvl}'"),
    }
}

/// Base macro for log messages of all levels.
///
/// The level check happens before the message is formatted so that disabled
/// entities pay almost nothing.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// The `trace` macro provides a wrapper for [`log_base`](crate::log_base)
/// at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// The `debug` macro provides a wrapper for [`log_base`](crate::log_base)
/// at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// The `info` macro provides a wrapper for [`log_base`](crate::log_base)
/// at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// The `warn` macro provides a wrapper for [`log_base`](crate::log_base)
/// at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// The `error` macro provides a wrapper for [`log_base`](crate::log_base)
/// at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
