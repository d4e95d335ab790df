// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use thiserror::Error;

/// Build a [`SimError::Protocol`] from a message that supports `to_string`
#[macro_export]
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError::Protocol($msg.to_string()))?
    };
}

/// The `SimError` is what should be returned in the case of an error.
///
/// Configuration errors are reported before the network is constructed;
/// the per-cycle operations are infallible under the flow-control
/// protocol and protect their invariants with debug assertions instead.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration could not be read or parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    /// The configuration parsed but describes an impossible network.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A terminal was asked for a route it does not hold. Only possible
    /// when a source addresses itself, which the traffic generators never
    /// do.
    #[error("no route from {src} to {destination}")]
    RouteNotFound {
        /// Source terminal identifier.
        src: i32,
        /// Destination terminal identifier.
        destination: i32,
    },

    /// A flow-control invariant was violated.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Reading or writing a result artifact failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The `SimResult` is the return type for most simulation functions.
pub type SimResult = Result<(), SimError>;
