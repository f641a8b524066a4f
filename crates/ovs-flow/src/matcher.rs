//! Flow matching.
//!
//! Two modes are supported:
//! - exact: the pattern must describe the candidate completely (same
//!   table, priority and field count, byte-identical values). Used to find
//!   the flow an add-flow replaces.
//! - non-exact: the pattern's fields are a subset of the candidate's, and
//!   `value/mask` pattern values match numerically. Used by del-flows and
//!   dump-flows filters.

use crate::flow::OvsFlow;
use crate::parse::parse_uint;

/// Returns true if `flow` matches `pattern`.
///
/// In non-exact mode a pattern without a table matches every table; an
/// explicit `table=0` matches table 0 only.
///
/// Fields are looked up by name, first occurrence wins. In exact mode a
/// pattern that repeats a field name can therefore match a flow of the same
/// field count that carries that field once plus some other field.
pub fn flow_matches(flow: &OvsFlow, pattern: &OvsFlow, exact: bool) -> bool {
    if exact {
        if flow.table_id() != pattern.table_id()
            || flow.priority != pattern.priority
            || flow.fields.len() != pattern.fields.len()
        {
            return false;
        }
    } else if pattern.table.is_some_and(|t| t != flow.table_id()) {
        return false;
    }

    if let Some(cookie) = &pattern.cookie {
        if !field_matches(flow.cookie(), cookie, exact) {
            return false;
        }
    }

    pattern.fields.iter().all(|pf| {
        flow.find_field(&pf.name)
            .is_some_and(|f| field_matches(&f.value, &pf.value, exact))
    })
}

/// Compares one value against a pattern value.
///
/// Outside exact mode, a pattern of the form `N/M` matches a plain numeric
/// value `V` when `N & M == V & M` (all 32-bit). Values above `u32::MAX`,
/// including 64-bit cookies, never match a masked pattern.
pub fn field_matches(value: &str, pattern: &str, exact: bool) -> bool {
    if value == pattern {
        return true;
    }
    if exact {
        return false;
    }

    let Some((pattern_value, mask)) = pattern.split_once('/') else {
        return false;
    };
    match (
        parse_uint::<u32>(pattern_value),
        parse_uint::<u32>(mask),
        parse_uint::<u32>(value),
    ) {
        (Some(p), Some(m), Some(v)) => p & m == v & m,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ParseCommand;
    use crate::parse::parse_flow_str;

    fn flow(text: &str) -> OvsFlow {
        parse_flow_str(ParseCommand::AddFlow, text).unwrap()
    }

    fn filter(text: &str) -> OvsFlow {
        parse_flow_str(ParseCommand::DelFlows, text).unwrap()
    }

    #[test]
    fn test_masked_cookie() {
        let candidate = flow("cookie=0xe, table=1, actions=drop");
        assert!(!flow_matches(&candidate, &filter("cookie=0/0xFFFF"), false));
        assert!(flow_matches(&candidate, &filter("cookie=0xe/0xFFFF"), false));

        let candidate = flow("cookie=3, actions=drop");
        assert!(flow_matches(&candidate, &filter("cookie=2/2"), false));
        assert!(!flow_matches(&candidate, &filter("cookie=4/4"), false));
    }

    #[test]
    fn test_field_matches() {
        assert!(field_matches("10.0.0.0/8", "10.0.0.0/8", true));
        assert!(!field_matches("0x3", "2/2", true));
        assert!(field_matches("0x3", "2/2", false));
        assert!(!field_matches("10.0.0.1", "10.0.0.0/8", false));
        assert!(!field_matches("1", "1/banana", false));
        assert!(!field_matches("0x100000003", "2/2", false));
    }

    #[test]
    fn test_wide_cookie_never_masked() {
        let candidate = flow("cookie=0x100000003, actions=drop");
        assert!(!flow_matches(&candidate, &filter("cookie=2/2"), false));
        assert!(flow_matches(&candidate, &filter("cookie=0x100000003"), false));
    }

    #[test]
    fn test_exact_match_duplicate_field_names() {
        let stored = flow("table=1, reg0=1, reg1=2, actions=drop");
        let repeated = flow("table=1, reg0=1, reg0=1, actions=drop");
        assert!(flow_matches(&stored, &repeated, true));
        assert!(!flow_matches(&repeated, &stored, true));
    }

    #[test]
    fn test_subset_match() {
        let a = flow("table=1, ip, cookie=1, actions=a");
        let b = flow("table=1, ip, tcp, cookie=1, actions=b");
        let pattern = filter("table=1, tcp");
        assert!(!flow_matches(&a, &pattern, false));
        assert!(flow_matches(&b, &pattern, false));
        assert!(flow_matches(&a, &filter("ip"), false));
        assert!(flow_matches(&b, &filter("ip"), false));
    }

    #[test]
    fn test_table_wildcard() {
        let f = flow("table=7, ip, actions=drop");
        assert!(flow_matches(&f, &filter("ip"), false));
        assert!(flow_matches(&f, &filter("table=7"), false));
        assert!(!flow_matches(&f, &filter("table=0"), false));

        let zero = flow("ip, actions=drop");
        assert!(flow_matches(&zero, &filter("table=0"), false));
    }

    #[test]
    fn test_exact_match() {
        let f = flow("table=1, priority=10, ip, actions=drop");
        assert!(flow_matches(&f, &flow("table=1, priority=10, ip, actions=allow"), true));
        assert!(!flow_matches(&f, &flow("table=1, priority=11, ip, actions=drop"), true));
        assert!(!flow_matches(&f, &flow("table=2, priority=10, ip, actions=drop"), true));
        assert!(!flow_matches(&f, &flow("table=1, priority=10, ip, tcp, actions=drop"), true));
        assert!(!flow_matches(&f, &flow("table=1, priority=10, actions=drop"), true));
        assert!(!flow_matches(
            &flow("table=1, reg0=3, actions=drop"),
            &flow("table=1, reg0=2/2, actions=drop"),
            true
        ));
    }

    #[test]
    fn test_exact_match_cookie() {
        let f = flow("cookie=5, table=1, ip, actions=drop");
        assert!(flow_matches(&f, &flow("table=1, ip, actions=drop"), true));
        assert!(flow_matches(&f, &flow("cookie=5, table=1, ip, actions=drop"), true));
        assert!(!flow_matches(&f, &flow("cookie=6, table=1, ip, actions=drop"), true));
    }
}
