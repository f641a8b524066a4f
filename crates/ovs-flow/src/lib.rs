//! OpenFlow flow rules in the `ovs-ofctl` text dialect.
//!
//! This crate turns flow strings such as
//! `table=21, priority=100, ip, nw_dst=10.0.0.0/8, actions=ct(commit,table=70),output:2`
//! into structured [`OvsFlow`] records and decides whether two flows match:
//!
//! - [`template`]: printf-style expansion of flow templates
//! - [`parse_actions`]: nesting-aware action list tokenizer
//! - [`parse_flow`]: the flow parser with per-command validity rules
//! - [`flow_matches`]: exact and masked/subset matching
//!
//! # Example
//!
//! ```
//! use sdn_ovs_flow::{parse_flow, flow_matches, ParseCommand};
//!
//! let flow = parse_flow(
//!     ParseCommand::AddFlow,
//!     "table=%d, ip, nw_dst=%s, actions=drop",
//!     &[10.into(), "10.0.0.0/8".into()],
//! )
//! .unwrap();
//! let filter = parse_flow(ParseCommand::DelFlows, "table=10, ip", &[]).unwrap();
//! assert!(flow_matches(&flow, &filter, false));
//! assert_eq!(flow.to_string(), " cookie=0, table=10, ip, nw_dst=10.0.0.0/8, actions=drop");
//! ```

mod actions;
pub mod error;
mod flow;
mod matcher;
mod parse;
pub mod template;

pub use actions::parse_actions;
pub use error::{ErrorKind, FlowError, FlowResult};
pub use flow::{OvsAction, OvsField, OvsFlow, ParseCommand, DEFAULT_COOKIE, DEFAULT_PRIORITY};
pub use matcher::{field_matches, flow_matches};
pub use parse::{parse_flow, parse_flow_str};
pub use template::{render, FlowArg};
