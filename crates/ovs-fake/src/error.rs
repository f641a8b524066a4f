//! Error types for switch operations.

use sdn_ovs_flow::{ErrorKind, FlowError};
use thiserror::Error;

/// Result type alias for switch operations.
pub type OvsResult<T> = Result<T, OvsError>;

/// Errors returned by [`crate::Ovs`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OvsError {
    /// The bridge has not been created (or was deleted).
    #[error("no bridge named {bridge}")]
    NoBridge {
        /// The bridge name.
        bridge: String,
    },

    /// The port does not exist on the bridge.
    #[error("no row {port:?} in table Interface")]
    NoSuchPort {
        /// The port name.
        port: String,
    },

    /// The port exists with a different ofport than requested.
    #[error("port {port:?} already has ofport {existing}, cannot use {requested}")]
    OfPortMismatch {
        /// The port name.
        port: String,
        /// The ofport currently assigned.
        existing: u16,
        /// The ofport the caller asked for.
        requested: i32,
    },

    /// The requested ofport belongs to another port.
    #[error("ofport {ofport} requested for {port:?} is already used by {owner:?}")]
    OfPortInUse {
        /// The port being added.
        port: String,
        /// The requested ofport.
        ofport: u16,
        /// The port that already owns it.
        owner: String,
    },

    /// The requested ofport is not `-1` and not in 1-65535.
    #[error("invalid ofport {ofport} requested for {port:?}")]
    OfPortOutOfRange {
        /// The port name.
        port: String,
        /// The requested ofport.
        ofport: i32,
    },

    /// Every ofport in 1-65535 is taken.
    #[error("no free ofport for {port:?}")]
    OfPortsExhausted {
        /// The port name.
        port: String,
    },

    /// A flow could not be parsed.
    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl OvsError {
    /// Creates a missing bridge error.
    pub fn no_bridge(bridge: impl Into<String>) -> Self {
        Self::NoBridge {
            bridge: bridge.into(),
        }
    }

    /// Creates a missing port error.
    pub fn no_such_port(port: impl Into<String>) -> Self {
        Self::NoSuchPort { port: port.into() }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoBridge { .. } | Self::NoSuchPort { .. } => ErrorKind::ResourceAbsence,
            Self::OfPortMismatch { .. }
            | Self::OfPortInUse { .. }
            | Self::OfPortOutOfRange { .. }
            | Self::OfPortsExhausted { .. } => ErrorKind::Allocation,
            Self::Flow(err) => err.kind(),
        }
    }
}
