//! Simulated Open vSwitch bridge.
//!
//! This crate provides the bridge-programming interface used by the SDN
//! node code and an in-memory implementation of it, good enough to stand
//! in for a real switch in tests:
//!
//! - [`Ovs`] / [`Transaction`]: bridge, port and flow operations
//! - [`FakeOvs`]: port table with ofport allocation and a flow table with
//!   OVS ordering, replace-on-exact-match and masked delete semantics
//! - [`error`]: error types for switch operations
//!
//! Flow strings are parsed by [`sdn_ovs_flow`].

pub mod error;
mod fake;
mod ovs;

pub use error::{OvsError, OvsResult};
pub use fake::{FakeOvs, FakeTransaction};
pub use ovs::{Ovs, Transaction, OFPORT_AUTO};

pub use sdn_ovs_flow::{ErrorKind, FlowArg};
