//! Integration tests for the simulated bridge.
//!
//! These drive `FakeOvs` only through the `Ovs` and `Transaction` traits,
//! the way node code programs a real bridge.

use pretty_assertions::assert_eq;
use sdn_ovs_fake::{ErrorKind, FakeOvs, FlowArg, Ovs, OvsError, OFPORT_AUTO};

fn new_bridge() -> Box<dyn Ovs> {
    let mut ovs = FakeOvs::new("br0");
    ovs.add_bridge(&["fail-mode=secure", "protocols=OpenFlow13"])
        .unwrap();
    Box::new(ovs)
}

fn add_flows(ovs: &mut dyn Ovs, flows: &[&str]) {
    let mut tx = ovs.new_transaction();
    for flow in flows {
        tx.add_flow(flow, &[]);
    }
    tx.end_transaction().unwrap();
}

#[test]
fn test_sort_order() {
    let mut ovs = new_bridge();
    add_flows(
        ovs.as_mut(),
        &[
            "table=30, priority=0, actions=drop",
            "table=0, priority=100, ip, actions=goto_table:10",
            "table=10, priority=0, actions=drop",
            "table=0, priority=200, arp, actions=goto_table:20",
            "table=10, priority=0, reg0=1, actions=drop",
            "table=0, priority=100, arp, actions=goto_table:20",
        ],
    );

    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![
            " cookie=0, table=0, priority=200, arp, actions=goto_table:20",
            " cookie=0, table=0, priority=100, ip, actions=goto_table:10",
            " cookie=0, table=0, priority=100, arp, actions=goto_table:20",
            " cookie=0, table=10, priority=0, actions=drop",
            " cookie=0, table=10, priority=0, reg0=1, actions=drop",
            " cookie=0, table=30, priority=0, actions=drop",
        ]
    );
}

#[test]
fn test_delete_is_subset_match() {
    let mut ovs = new_bridge();
    add_flows(
        ovs.as_mut(),
        &[
            "table=1, ip, cookie=1, actions=a",
            "table=1, ip, tcp, cookie=1, actions=b",
        ],
    );

    let mut tx = ovs.new_transaction();
    tx.delete_flows("table=1,tcp", &[]);
    tx.end_transaction().unwrap();
    drop(tx);

    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![" cookie=1, table=1, ip, actions=a"]
    );
}

#[test]
fn test_delete_by_masked_cookie() {
    let mut ovs = new_bridge();
    add_flows(
        ovs.as_mut(),
        &[
            "table=80, priority=100, cookie=0x3, reg1=7, actions=output:NXM_NX_REG2[]",
            "table=80, priority=100, cookie=0x4, reg1=8, actions=output:NXM_NX_REG2[]",
            "table=90, priority=100, cookie=0x6, ip, actions=drop",
        ],
    );

    let mut tx = ovs.new_transaction();
    tx.delete_flows("cookie=%s/%s", &["2".into(), "2".into()]);
    tx.end_transaction().unwrap();
    drop(tx);

    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![" cookie=0x4, table=80, priority=100, reg1=8, actions=output:NXM_NX_REG2[]"]
    );
}

#[test]
fn test_delete_ignores_priority_and_table() {
    let mut ovs = new_bridge();
    add_flows(
        ovs.as_mut(),
        &[
            "table=20, priority=100, ip, nw_src=10.128.0.5, actions=goto_table:21",
            "table=40, priority=300, ip, nw_src=10.128.0.5, actions=drop",
            "table=40, priority=300, ip, nw_src=10.128.0.6, actions=drop",
        ],
    );

    let ip = FlowArg::from("10.128.0.5");
    let mut tx = ovs.new_transaction();
    tx.delete_flows("ip, nw_src=%s", &[ip]);
    tx.end_transaction().unwrap();
    drop(tx);

    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![" cookie=0, table=40, priority=300, ip, nw_src=10.128.0.6, actions=drop"]
    );
}

#[test]
fn test_failed_operation_leaves_table_untouched() {
    let mut ovs = new_bridge();
    add_flows(ovs.as_mut(), &["table=1, priority=10, ip, actions=drop"]);

    let mut tx = ovs.new_transaction();
    tx.delete_flows("table=1, priority=10", &[]);
    tx.add_flow("table=2, actions=drop", &[]);
    let err = tx.end_transaction().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CommandValidity);
    drop(tx);

    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![" cookie=0, table=1, priority=10, ip, actions=drop"]
    );
}

#[test]
fn test_nested_actions_round_trip_through_dump() {
    let mut ovs = new_bridge();
    add_flows(
        ovs.as_mut(),
        &["table=1,actions=ct(commit,table=70),set_field:1->ct_mark,output:2"],
    );
    assert_eq!(
        ovs.dump_flows().unwrap(),
        vec![" cookie=0, table=1, actions=ct(commit,table=70),set_field:1->ct_mark,output:2"]
    );
}

#[test]
fn test_operations_without_bridge() {
    let mut ovs = FakeOvs::new("br0");
    let no_bridge = OvsError::no_bridge("br0");

    assert_eq!(ovs.add_port("p", OFPORT_AUTO, &[]).unwrap_err(), no_bridge);
    assert_eq!(ovs.get_ofport("p").unwrap_err(), no_bridge);
    assert_eq!(ovs.delete_port("p").unwrap_err(), no_bridge);
    assert_eq!(ovs.dump_flows().unwrap_err(), no_bridge);
    assert_eq!(ovs.dump_flows_matching("ip", &[]).unwrap_err(), no_bridge);
    assert_eq!(no_bridge.kind(), ErrorKind::ResourceAbsence);

    ovs.add_bridge(&[]).unwrap();
    ovs.add_port("p", OFPORT_AUTO, &[]).unwrap();
    ovs.delete_bridge(false).unwrap();

    assert_eq!(ovs.get_ofport("p").unwrap_err(), no_bridge);
    let mut tx = ovs.new_transaction();
    tx.add_flow("table=0, actions=drop", &[]);
    assert_eq!(tx.end_transaction().unwrap_err(), no_bridge);
}

#[test]
fn test_port_allocation_sequence() {
    let mut ovs = new_bridge();
    assert_eq!(ovs.add_port("p", OFPORT_AUTO, &[]).unwrap(), 1);
    assert_eq!(ovs.add_port("q", OFPORT_AUTO, &[]).unwrap(), 2);
    assert!(ovs.add_port("p", 5, &[]).is_err());
    assert_eq!(ovs.get_ofport("q").unwrap(), 2);
    assert_eq!(ovs.bridge_name(), "br0");
}
