//! Structured flow records.
//!
//! Match fields are kept as an ordered list of name/value string pairs
//! rather than a typed union of OpenFlow fields, so new field names parse
//! without code changes.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;

use crate::error::{FlowError, FlowResult};

/// Priority assigned to flows that do not specify one.
pub const DEFAULT_PRIORITY: u16 = 32768;

/// Cookie reported for flows that do not specify one.
pub const DEFAULT_COOKIE: &str = "0";

/// The ovs-ofctl command a flow is parsed for.
///
/// Each command has its own validity rules, see [`crate::parse_flow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseCommand {
    /// `add-flow`: a full flow with actions.
    AddFlow,
    /// `del-flows`: a match pattern without priority or actions.
    DelFlows,
    /// `dump-flows`: a match pattern used as a filter.
    DumpFlows,
}

impl ParseCommand {
    /// Returns the ovs-ofctl command name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddFlow => "add-flow",
            Self::DelFlows => "del-flows",
            Self::DumpFlows => "dump-flows",
        }
    }
}

impl fmt::Display for ParseCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParseCommand {
    type Err = FlowError;

    fn from_str(s: &str) -> FlowResult<Self> {
        match s {
            "add-flow" => Ok(Self::AddFlow),
            "del-flows" => Ok(Self::DelFlows),
            "dump-flows" => Ok(Self::DumpFlows),
            other => Err(FlowError::parse(other, "unknown command")),
        }
    }
}

/// A match field: `ip`, `nw_dst=10.0.0.0/8`, `reg0=0x1/0xff`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OvsField {
    /// Field name.
    pub name: String,
    /// Value; empty for bare flags such as `ip`.
    pub value: String,
}

impl OvsField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for OvsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}

/// An action: `drop`, `output:2`, `ct(commit,table=70)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OvsAction {
    /// Action name.
    pub name: String,
    /// Argument, without enclosing parentheses. Not interpreted further.
    pub value: String,
    /// True for the `name(value)` form, false for `name:value`.
    pub grouped: bool,
}

impl OvsAction {
    /// Creates a `name:value` action (or a bare `name` if `value` is empty).
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            grouped: false,
        }
    }

    /// Creates a `name(value)` action.
    pub fn grouped(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            grouped: true,
        }
    }
}

impl fmt::Display for OvsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.grouped {
            write!(f, "{}({})", self.name, self.value)
        } else if self.value.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.value)
        }
    }
}

/// A single OpenFlow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OvsFlow {
    /// Table number; `None` when the flow text did not name one.
    pub table: Option<u8>,
    /// Priority, [`DEFAULT_PRIORITY`] unless given.
    pub priority: u16,
    /// Cookie as written, possibly `value/mask`; `None` when not given.
    pub cookie: Option<String>,
    /// Match fields in encounter order, duplicates preserved.
    pub fields: Vec<OvsField>,
    /// Actions in encounter order.
    pub actions: Vec<OvsAction>,
    /// Creation sequence, stamped by the switch that stores the flow.
    pub created: u64,
}

impl Default for OvsFlow {
    fn default() -> Self {
        Self {
            table: None,
            priority: DEFAULT_PRIORITY,
            cookie: None,
            fields: Vec::new(),
            actions: Vec::new(),
            created: 0,
        }
    }
}

impl OvsFlow {
    /// Returns the effective table number (0 when unset).
    pub fn table_id(&self) -> u8 {
        self.table.unwrap_or(0)
    }

    /// Returns the effective cookie (`"0"` when unset).
    pub fn cookie(&self) -> &str {
        self.cookie.as_deref().unwrap_or(DEFAULT_COOKIE)
    }

    /// Returns the first field named `name`.
    pub fn find_field(&self, name: &str) -> Option<&OvsField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if a field named `name` is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.find_field(name).is_some()
    }

    /// Rewrites `nw_src`/`nw_dst` to `arp_spa`/`arp_tpa` on ARP flows.
    ///
    /// ovs-ofctl reports ARP addresses under the `arp_*` names, so flows
    /// are stored and compared that way.
    pub fn canonicalize_arp_fields(&mut self) {
        if !self.has_field("arp") {
            return;
        }
        for field in &mut self.fields {
            match field.name.as_str() {
                "nw_src" => field.name = "arp_spa".to_string(),
                "nw_dst" => field.name = "arp_tpa".to_string(),
                _ => {}
            }
        }
    }
}

/// Renders the flow the way `ovs-ofctl dump-flows` prints it.
impl fmt::Display for OvsFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " cookie={}, table={}", self.cookie(), self.table_id())?;
        if self.priority != DEFAULT_PRIORITY {
            write!(f, ", priority={}", self.priority)?;
        }
        for field in &self.fields {
            write!(f, ", {}", field)?;
        }
        if !self.actions.is_empty() {
            write!(f, ", actions={}", self.actions.iter().join(","))?;
        }
        Ok(())
    }
}
