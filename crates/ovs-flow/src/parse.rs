//! Flow text parser.
//!
//! Accepts the restricted ovs-ofctl dialect
//! `[table=T,] [priority=P,] [cookie=C,] {field[=value],}* [actions=...]`
//! where fields may be separated by commas or spaces.

use crate::actions::parse_actions;
use crate::error::{FlowError, FlowResult};
use crate::flow::{OvsField, OvsFlow, ParseCommand};
use crate::template::{render, FlowArg};

const SEPARATORS: [char; 2] = [',', ' '];

/// Expands `template` with `args` and parses the result for `command`.
pub fn parse_flow(command: ParseCommand, template: &str, args: &[FlowArg]) -> FlowResult<OvsFlow> {
    let text = render(template, args)?;
    parse_flow_str(command, &text)
}

/// Parses a literal flow string for `command`.
pub fn parse_flow_str(command: ParseCommand, text: &str) -> FlowResult<OvsFlow> {
    let input = text.trim();
    let mut flow = OvsFlow::default();
    let mut rest = input.trim_start_matches(SEPARATORS);

    while !rest.is_empty() {
        let end = rest.find(SEPARATORS).unwrap_or(rest.len());
        let (name, value, consumed) = match rest.find('=') {
            Some(eq) if eq < end => {
                let name = &rest[..eq];
                let (value, consumed) = if name == "actions" {
                    (&rest[eq + 1..], rest.len())
                } else {
                    (&rest[eq + 1..end], end)
                };
                if value.is_empty() {
                    return Err(FlowError::parse(input, format!("empty field {:?}", name)));
                }
                (name, value, consumed)
            }
            _ => (&rest[..end], "", end),
        };
        if name.is_empty() {
            return Err(FlowError::parse(input, "empty field name"));
        }

        match name {
            "table" => flow.table = Some(parse_table(input, value)?),
            "priority" => {
                if command == ParseCommand::DelFlows {
                    return Err(not_allowed(input, name, command));
                }
                flow.priority = parse_priority(input, value)?;
            }
            "cookie" => {
                validate_cookie(input, value)?;
                flow.cookie = Some(value.to_string());
            }
            "actions" => {
                if command == ParseCommand::DelFlows {
                    return Err(not_allowed(input, name, command));
                }
                flow.actions = parse_actions(value)?;
            }
            "out_port" | "out_group" => {
                if command != ParseCommand::DelFlows {
                    return Err(not_allowed(input, name, command));
                }
                return Err(FlowError::NotImplemented {
                    field: name.to_string(),
                });
            }
            _ => flow.fields.push(OvsField::new(name, value)),
        }

        rest = rest[consumed..].trim_start_matches(SEPARATORS);
    }

    if command == ParseCommand::AddFlow && flow.actions.is_empty() {
        return Err(FlowError::MissingActions {
            input: input.to_string(),
        });
    }
    check_implications(input, &flow)?;

    tracing::debug!(command = %command, flow = %flow, "Parsed flow");
    Ok(flow)
}

fn not_allowed(input: &str, field: &str, command: ParseCommand) -> FlowError {
    FlowError::NotAllowed {
        input: input.to_string(),
        field: field.to_string(),
        command: command.to_string(),
    }
}

fn parse_table(input: &str, value: &str) -> FlowResult<u8> {
    let table: i64 = value
        .parse()
        .map_err(|_| FlowError::parse(input, format!("bad table number {:?}", value)))?;
    u8::try_from(table)
        .map_err(|_| FlowError::parse(input, format!("table number {:?} out of range", value)))
}

fn parse_priority(input: &str, value: &str) -> FlowResult<u16> {
    let priority: i64 = value
        .parse()
        .map_err(|_| FlowError::parse(input, format!("bad priority {:?}", value)))?;
    u16::try_from(priority)
        .map_err(|_| FlowError::parse(input, format!("priority {:?} out of range", value)))
}

/// Parses an unsigned integer in decimal or `0x` hex.
pub(crate) fn parse_uint<T>(s: &str) -> Option<T>
where
    T: TryFrom<u64>,
{
    let v = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => s.parse::<u64>().ok()?,
    };
    T::try_from(v).ok()
}

fn validate_cookie(input: &str, value: &str) -> FlowResult<()> {
    let valid = match value.split_once('/') {
        Some((v, mask)) => parse_uint::<u64>(v).is_some() && parse_uint::<u64>(mask).is_some(),
        None => parse_uint::<u64>(value).is_some(),
    };
    if valid {
        Ok(())
    } else {
        Err(FlowError::parse(input, format!("bad cookie {:?}", value)))
    }
}

fn check_implications(input: &str, flow: &OvsFlow) -> FlowResult<()> {
    let ip = flow.has_field("ip");
    let arp = flow.has_field("arp");
    let tcp = flow.has_field("tcp");
    let udp = flow.has_field("udp");
    let any = |names: &[&str]| names.iter().any(|n| flow.has_field(n));

    let violation = if any(&["nw_src", "nw_dst"]) && !(ip || arp || tcp || udp) {
        Some("specified nw_src/nw_dst without ip/arp/tcp/udp")
    } else if any(&["arp_spa", "arp_tpa", "arp_sha", "arp_tha"]) && !arp {
        Some("specified arp_spa/arp_tpa/arp_sha/arp_tha without arp")
    } else if any(&["tcp_src", "tcp_dst"]) && !tcp {
        Some("specified tcp_src/tcp_dst without tcp")
    } else if any(&["udp_src", "udp_dst"]) && !udp {
        Some("specified udp_src/udp_dst without udp")
    } else if any(&["tp_src", "tp_dst"]) && !(tcp || udp) {
        Some("specified tp_src/tp_dst without tcp/udp")
    } else if flow.has_field("ip_frag") && (tcp || udp) {
        Some("specified ip_frag with tcp/udp")
    } else {
        None
    };

    match violation {
        Some(reason) => Err(FlowError::bad_flow(input, reason)),
        None => Ok(()),
    }
}
