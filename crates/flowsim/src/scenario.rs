//! Scenario files.
//!
//! A scenario describes a bridge, its ports and a list of flow
//! transactions to replay against the simulated switch:
//!
//! ```yaml
//! bridge: br0
//! bridge_properties: ["fail-mode=secure", "protocols=OpenFlow13"]
//! ports:
//!   - name: vxlan0
//!     ofport: 1
//!     properties: ["type=vxlan", "options:remote_ip=flow"]
//!   - name: tun0
//! transactions:
//!   - name: base
//!     ops:
//!       - { op: add, flow: "table=0, priority=200, in_port=1, actions=goto_table:10" }
//!       - { op: delete, flow: "table=10" }
//! dump_filter: "table=0"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The kind of flow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowOpKind {
    /// `add-flow`.
    Add,
    /// `del-flows`.
    Delete,
}

/// One operation inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOp {
    /// Add or delete.
    pub op: FlowOpKind,
    /// The flow text.
    pub flow: String,
}

/// A batch of operations committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSpec {
    /// Label used in log messages.
    #[serde(default)]
    pub name: Option<String>,
    /// Operations in order.
    #[serde(default)]
    pub ops: Vec<FlowOp>,
}

/// A port to create before any transaction runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port name.
    pub name: String,
    /// Requested ofport; -1 allocates automatically.
    #[serde(default = "default_ofport")]
    pub ofport: i32,
    /// ovs-vsctl style properties, recorded but not interpreted.
    #[serde(default)]
    pub properties: Vec<String>,
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Bridge name.
    #[serde(default = "default_bridge")]
    pub bridge: String,
    /// Properties passed to add-bridge.
    #[serde(default)]
    pub bridge_properties: Vec<String>,
    /// Ports to add.
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    /// Transactions to replay.
    #[serde(default)]
    pub transactions: Vec<TransactionSpec>,
    /// Optional dump-flows filter for the final report.
    #[serde(default)]
    pub dump_filter: Option<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            bridge: default_bridge(),
            bridge_properties: Vec::new(),
            ports: Vec::new(),
            transactions: Vec::new(),
            dump_filter: None,
        }
    }
}

fn default_bridge() -> String {
    "br0".to_string()
}

fn default_ofport() -> i32 {
    -1
}

impl Scenario {
    /// Parses a scenario from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid scenario")
    }

    /// Loads a scenario file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let scenario = Scenario::from_yaml_str("ports:\n  - name: tun0\n").unwrap();
        assert_eq!(scenario.bridge, "br0");
        assert_eq!(scenario.ports[0].ofport, -1);
        assert!(scenario.ports[0].properties.is_empty());
        assert!(scenario.transactions.is_empty());
        assert_eq!(scenario.dump_filter, None);
    }

    #[test]
    fn test_full_scenario() {
        let yaml = r#"
bridge: br1
bridge_properties: ["fail-mode=secure"]
ports:
  - name: vxlan0
    ofport: 1
    properties: ["type=vxlan"]
transactions:
  - name: setup
    ops:
      - { op: add, flow: "table=0, priority=100, ip, actions=drop" }
      - { op: delete, flow: "table=0" }
dump_filter: "table=0"
"#;
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(scenario.bridge, "br1");
        assert_eq!(scenario.ports[0].ofport, 1);
        assert_eq!(scenario.transactions[0].name.as_deref(), Some("setup"));
        assert_eq!(
            scenario.transactions[0].ops,
            vec![
                FlowOp {
                    op: FlowOpKind::Add,
                    flow: "table=0, priority=100, ip, actions=drop".to_string(),
                },
                FlowOp {
                    op: FlowOpKind::Delete,
                    flow: "table=0".to_string(),
                },
            ]
        );
        assert_eq!(scenario.dump_filter.as_deref(), Some("table=0"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bridge: br-int").unwrap();
        let scenario = Scenario::from_file(file.path()).unwrap();
        assert_eq!(scenario.bridge, "br-int");
    }

    #[test]
    fn test_invalid_files() {
        assert!(Scenario::from_file("/nonexistent/scenario.yaml").is_err());
        assert!(Scenario::from_yaml_str("ports: 5").is_err());
        assert!(Scenario::from_yaml_str("transactions:\n  - ops:\n      - { op: modify, flow: x }\n").is_err());
    }
}
