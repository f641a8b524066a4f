//! Switch driver interface.
//!
//! Code that programs a bridge talks to it through [`Ovs`] and
//! [`Transaction`]. [`crate::FakeOvs`] implements both in memory; a driver
//! that shells out to `ovs-vsctl`/`ovs-ofctl` would implement the same
//! traits.

use sdn_ovs_flow::FlowArg;

use crate::error::OvsResult;

/// Requests automatic ofport allocation in [`Ovs::add_port`].
pub const OFPORT_AUTO: i32 = -1;

/// A batch of flow modifications against one bridge.
///
/// Operations do not return errors individually. The first failure is
/// recorded, later operations become no-ops, and the error is reported by
/// [`Transaction::end_transaction`].
pub trait Transaction {
    /// Adds a flow (`ovs-ofctl add-flow`), replacing an exact match.
    fn add_flow(&mut self, template: &str, args: &[FlowArg]);

    /// Deletes every flow matching the pattern (`ovs-ofctl del-flows`).
    fn delete_flows(&mut self, template: &str, args: &[FlowArg]);

    /// Returns the first error seen since the last call and clears it.
    fn end_transaction(&mut self) -> OvsResult<()>;
}

/// Operations on a single OVS bridge.
pub trait Ovs {
    /// Returns the bridge name.
    fn bridge_name(&self) -> &str;

    /// Creates the bridge, or resets it to empty if it already exists.
    fn add_bridge(&mut self, properties: &[&str]) -> OvsResult<()>;

    /// Deletes the bridge. With `if_exists`, a missing bridge is not an error.
    fn delete_bridge(&mut self, if_exists: bool) -> OvsResult<()>;

    /// Returns the ofport of `port`.
    fn get_ofport(&self, port: &str) -> OvsResult<u16>;

    /// Adds `port` and returns its ofport.
    ///
    /// `ofport_request` is either [`OFPORT_AUTO`] or an explicit number in
    /// 1-65535. Re-adding an existing port succeeds only if the request is
    /// [`OFPORT_AUTO`] or equals the assigned ofport.
    fn add_port(
        &mut self,
        port: &str,
        ofport_request: i32,
        properties: &[&str],
    ) -> OvsResult<u16>;

    /// Removes `port`; removing an unknown port is not an error.
    fn delete_port(&mut self, port: &str) -> OvsResult<()>;

    /// Returns every flow in `ovs-ofctl dump-flows` format.
    fn dump_flows(&self) -> OvsResult<Vec<String>>;

    /// Returns the flows matching a dump-flows filter.
    fn dump_flows_matching(&self, template: &str, args: &[FlowArg]) -> OvsResult<Vec<String>>;

    /// Starts a flow transaction.
    ///
    /// The transaction borrows the bridge mutably, so no other operation
    /// can run until it is dropped.
    fn new_transaction(&mut self) -> Box<dyn Transaction + '_>;
}
