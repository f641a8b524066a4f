//! Flow scenario replay for the simulated OVS bridge.
//!
//! - [`scenario`]: YAML scenario files (bridge, ports, transactions)
//! - [`runner`]: replays a scenario against [`sdn_ovs_fake::FakeOvs`]

pub mod runner;
pub mod scenario;

pub use runner::{run_scenario, RunReport};
pub use scenario::{FlowOp, FlowOpKind, PortSpec, Scenario, TransactionSpec};
