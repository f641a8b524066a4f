//! In-memory OVS bridge.
//!
//! `FakeOvs` models one bridge: a port table mapping names to ofports and
//! a flow table kept sorted by (table, priority descending, creation
//! order), which is the order `ovs-ofctl dump-flows` reports.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use sdn_ovs_flow::{flow_matches, parse_flow, FlowArg, OvsFlow, ParseCommand};

use crate::error::{OvsError, OvsResult};
use crate::ovs::{Ovs, Transaction, OFPORT_AUTO};

#[derive(Debug, Clone)]
struct PortEntry {
    ofport: u16,
    properties: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct BridgeState {
    properties: Vec<String>,
    ports: BTreeMap<String, PortEntry>,
    flows: Vec<OvsFlow>,
}

/// Simulated OVS bridge.
///
/// # Example
///
/// ```
/// use sdn_ovs_fake::{FakeOvs, Ovs, OFPORT_AUTO};
///
/// let mut ovs = FakeOvs::new("br0");
/// ovs.add_bridge(&[]).unwrap();
/// assert_eq!(ovs.add_port("tun0", OFPORT_AUTO, &[]).unwrap(), 1);
///
/// let mut tx = ovs.new_transaction();
/// tx.add_flow("table=0, priority=200, in_port=%d, actions=goto_table:10", &[1.into()]);
/// tx.end_transaction().unwrap();
/// drop(tx);
///
/// assert_eq!(
///     ovs.dump_flows().unwrap(),
///     vec![" cookie=0, table=0, priority=200, in_port=1, actions=goto_table:10"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FakeOvs {
    bridge: String,
    state: Option<BridgeState>,
    next_created: u64,
}

impl FakeOvs {
    /// Creates a handle for `bridge`. The bridge itself does not exist
    /// until [`Ovs::add_bridge`] is called.
    pub fn new(bridge: impl Into<String>) -> Self {
        Self {
            bridge: bridge.into(),
            state: None,
            next_created: 0,
        }
    }

    /// Returns true between `add_bridge` and `delete_bridge`.
    pub fn bridge_exists(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the properties given to `add_bridge`.
    pub fn bridge_properties(&self) -> OvsResult<&[String]> {
        Ok(&self.state()?.properties)
    }

    /// Returns `(name, ofport)` for every port, sorted by name.
    pub fn ports(&self) -> OvsResult<Vec<(String, u16)>> {
        Ok(self
            .state()?
            .ports
            .iter()
            .map(|(name, entry)| (name.clone(), entry.ofport))
            .collect())
    }

    /// Returns the properties recorded for `port`.
    pub fn port_properties(&self, port: &str) -> OvsResult<&[String]> {
        self.state()?
            .ports
            .get(port)
            .map(|entry| entry.properties.as_slice())
            .ok_or_else(|| OvsError::no_such_port(port))
    }

    /// Returns the stored flows in table order.
    pub fn flows(&self) -> OvsResult<&[OvsFlow]> {
        Ok(&self.state()?.flows)
    }

    fn state(&self) -> OvsResult<&BridgeState> {
        self.state
            .as_ref()
            .ok_or_else(|| OvsError::no_bridge(&self.bridge))
    }

    fn state_mut(&mut self) -> OvsResult<&mut BridgeState> {
        match self.state.as_mut() {
            Some(state) => Ok(state),
            None => Err(OvsError::no_bridge(&self.bridge)),
        }
    }

    fn insert_flow(&mut self, template: &str, args: &[FlowArg]) -> OvsResult<()> {
        self.state()?;
        let mut flow = parse_flow(ParseCommand::AddFlow, template, args)?;
        flow.canonicalize_arp_fields();
        flow.created = self.next_created;
        self.next_created += 1;

        let state = self.state_mut()?;
        if let Some(existing) = state
            .flows
            .iter_mut()
            .find(|existing| flow_matches(existing, &flow, true))
        {
            flow.created = existing.created;
            tracing::debug!(flow = %flow, "Replacing flow");
            *existing = flow;
            return Ok(());
        }

        tracing::debug!(flow = %flow, "Adding flow");
        state.flows.push(flow);
        state.flows.sort_by(flow_order);
        Ok(())
    }

    fn remove_flows(&mut self, template: &str, args: &[FlowArg]) -> OvsResult<()> {
        self.state()?;
        let mut pattern = parse_flow(ParseCommand::DelFlows, template, args)?;
        pattern.canonicalize_arp_fields();

        let state = self.state_mut()?;
        let before = state.flows.len();
        state.flows.retain(|flow| !flow_matches(flow, &pattern, false));
        tracing::debug!(
            pattern = %pattern,
            removed = before - state.flows.len(),
            "Deleted flows"
        );
        Ok(())
    }
}

fn flow_order(a: &OvsFlow, b: &OvsFlow) -> Ordering {
    a.table_id()
        .cmp(&b.table_id())
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.created.cmp(&b.created))
}

impl Ovs for FakeOvs {
    fn bridge_name(&self) -> &str {
        &self.bridge
    }

    fn add_bridge(&mut self, properties: &[&str]) -> OvsResult<()> {
        tracing::debug!(bridge = %self.bridge, ?properties, "Adding bridge");
        self.state = Some(BridgeState {
            properties: properties.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        });
        Ok(())
    }

    fn delete_bridge(&mut self, if_exists: bool) -> OvsResult<()> {
        if self.state.take().is_some() {
            tracing::debug!(bridge = %self.bridge, "Deleted bridge");
        } else if !if_exists {
            return Err(OvsError::no_bridge(&self.bridge));
        }
        Ok(())
    }

    fn get_ofport(&self, port: &str) -> OvsResult<u16> {
        self.state()?
            .ports
            .get(port)
            .map(|entry| entry.ofport)
            .ok_or_else(|| OvsError::no_such_port(port))
    }

    fn add_port(
        &mut self,
        port: &str,
        ofport_request: i32,
        properties: &[&str],
    ) -> OvsResult<u16> {
        let state = self.state_mut()?;

        if let Some(existing) = state.ports.get(port) {
            if ofport_request == OFPORT_AUTO || ofport_request == i32::from(existing.ofport) {
                return Ok(existing.ofport);
            }
            return Err(OvsError::OfPortMismatch {
                port: port.to_string(),
                existing: existing.ofport,
                requested: ofport_request,
            });
        }

        let ofport = if ofport_request == OFPORT_AUTO {
            let used: HashSet<u16> = state.ports.values().map(|entry| entry.ofport).collect();
            (1..=u16::MAX)
                .find(|n| !used.contains(n))
                .ok_or_else(|| OvsError::OfPortsExhausted {
                    port: port.to_string(),
                })?
        } else {
            let ofport = u16::try_from(ofport_request)
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| OvsError::OfPortOutOfRange {
                    port: port.to_string(),
                    ofport: ofport_request,
                })?;
            if let Some((owner, _)) = state.ports.iter().find(|(_, entry)| entry.ofport == ofport) {
                return Err(OvsError::OfPortInUse {
                    port: port.to_string(),
                    ofport,
                    owner: owner.clone(),
                });
            }
            ofport
        };

        tracing::debug!(port = %port, ofport, ?properties, "Adding port");
        state.ports.insert(
            port.to_string(),
            PortEntry {
                ofport,
                properties: properties.iter().map(|p| p.to_string()).collect(),
            },
        );
        Ok(ofport)
    }

    fn delete_port(&mut self, port: &str) -> OvsResult<()> {
        if self.state_mut()?.ports.remove(port).is_some() {
            tracing::debug!(port = %port, "Deleted port");
        }
        Ok(())
    }

    fn dump_flows(&self) -> OvsResult<Vec<String>> {
        Ok(self.state()?.flows.iter().map(ToString::to_string).collect())
    }

    fn dump_flows_matching(&self, template: &str, args: &[FlowArg]) -> OvsResult<Vec<String>> {
        let state = self.state()?;
        let mut filter = parse_flow(ParseCommand::DumpFlows, template, args)?;
        filter.canonicalize_arp_fields();
        Ok(state
            .flows
            .iter()
            .filter(|flow| flow_matches(flow, &filter, false))
            .map(ToString::to_string)
            .collect())
    }

    fn new_transaction(&mut self) -> Box<dyn Transaction + '_> {
        Box::new(FakeTransaction {
            ovs: self,
            err: None,
        })
    }
}

/// Transaction against a [`FakeOvs`].
///
/// Each operation is validated and then applied immediately; a failing
/// operation leaves the flow table untouched.
#[derive(Debug)]
pub struct FakeTransaction<'a> {
    ovs: &'a mut FakeOvs,
    err: Option<OvsError>,
}

impl FakeTransaction<'_> {
    fn record(&mut self, op: &str, result: OvsResult<()>) {
        if let Err(err) = result {
            tracing::warn!(bridge = %self.ovs.bridge, op, error = %err, "Flow operation failed");
            self.err = Some(err);
        }
    }
}

impl Transaction for FakeTransaction<'_> {
    fn add_flow(&mut self, template: &str, args: &[FlowArg]) {
        if self.err.is_some() {
            return;
        }
        let result = self.ovs.insert_flow(template, args);
        self.record("add-flow", result);
    }

    fn delete_flows(&mut self, template: &str, args: &[FlowArg]) {
        if self.err.is_some() {
            return;
        }
        let result = self.ovs.remove_flows(template, args);
        self.record("del-flows", result);
    }

    fn end_transaction(&mut self) -> OvsResult<()> {
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
