//! Scenario replay.

use log::{error, info, warn};
use sdn_ovs_fake::{FakeOvs, Ovs, OvsResult};
use serde::Serialize;

use crate::scenario::{FlowOpKind, Scenario};

/// Outcome of a scenario run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Bridge name.
    pub bridge: String,
    /// `(name, ofport)` for every port, sorted by name.
    pub ports: Vec<(String, u16)>,
    /// Final flow table in dump-flows format.
    pub flows: Vec<String>,
    /// One message per failed port or transaction.
    pub errors: Vec<String>,
}

/// Replays `scenario` against a fresh simulated bridge.
///
/// A failing port or transaction is logged and recorded in the report;
/// the run continues with the next one.
pub fn run_scenario(scenario: &Scenario) -> OvsResult<RunReport> {
    let mut ovs = FakeOvs::new(&scenario.bridge);
    let properties: Vec<&str> = scenario.bridge_properties.iter().map(String::as_str).collect();
    ovs.add_bridge(&properties)?;

    let mut report = RunReport {
        bridge: scenario.bridge.clone(),
        ..Default::default()
    };

    for port in &scenario.ports {
        let properties: Vec<&str> = port.properties.iter().map(String::as_str).collect();
        match ovs.add_port(&port.name, port.ofport, &properties) {
            Ok(ofport) => info!("Added port {} with ofport {}", port.name, ofport),
            Err(e) => {
                error!("Failed to add port {}: {}", port.name, e);
                report.errors.push(format!("port {}: {}", port.name, e));
            }
        }
    }

    for (index, transaction) in scenario.transactions.iter().enumerate() {
        let label = transaction
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1));

        let mut tx = ovs.new_transaction();
        for op in &transaction.ops {
            match op.op {
                FlowOpKind::Add => tx.add_flow(&op.flow, &[]),
                FlowOpKind::Delete => tx.delete_flows(&op.flow, &[]),
            }
        }
        match tx.end_transaction() {
            Ok(()) => info!(
                "Transaction {}: {} operation(s) applied",
                label,
                transaction.ops.len()
            ),
            Err(e) => {
                error!("Transaction {} failed: {}", label, e);
                report.errors.push(format!("transaction {}: {}", label, e));
            }
        }
    }

    report.ports = ovs.ports()?;
    report.flows = match &scenario.dump_filter {
        Some(filter) => match ovs.dump_flows_matching(filter, &[]) {
            Ok(flows) => flows,
            Err(e) => {
                warn!("Ignoring dump filter {:?}: {}", filter, e);
                report.errors.push(format!("dump filter: {}", e));
                ovs.dump_flows()?
            }
        },
        None => ovs.dump_flows()?,
    };
    Ok(report)
}
