//! Action list tokenizer.
//!
//! Splits the text after `actions=` into individual actions. Commas only
//! separate actions at the top level: `ct(commit,table=70)` and
//! `load:1->NXM_NX_REG0[0..15]` stay whole.

use crate::error::{FlowError, FlowResult};
use crate::flow::OvsAction;

/// Tokenizes an action list such as `ct(commit,table=70),output:2`.
pub fn parse_actions(actions: &str) -> FlowResult<Vec<OvsAction>> {
    let mut parsed = Vec::new();
    let mut paren_depth = 0i32;
    let mut bracket_depth = 0i32;
    let mut start = 0usize;

    for (i, c) in actions.char_indices() {
        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '[' => bracket_depth += 1,
            ']' => bracket_depth -= 1,
            ',' if paren_depth == 0 && bracket_depth == 0 => {
                parsed.push(parse_action(actions, &actions[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
        if paren_depth < 0 || bracket_depth < 0 {
            return Err(FlowError::action(
                actions,
                format!("unexpected {:?} at offset {}", c, i),
            ));
        }
    }

    if paren_depth != 0 {
        return Err(FlowError::action(actions, "mismatched parentheses"));
    }
    if bracket_depth != 0 {
        return Err(FlowError::action(actions, "mismatched brackets"));
    }

    parsed.push(parse_action(actions, &actions[start..])?);
    Ok(parsed)
}

/// Splits one token on its first `:` or `(`.
fn parse_action(actions: &str, token: &str) -> FlowResult<OvsAction> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FlowError::action(actions, "empty action"));
    }

    let Some(sep) = token.find([':', '(']) else {
        return Ok(OvsAction::new(token, ""));
    };
    let name = &token[..sep];
    if name.is_empty() {
        return Err(FlowError::action(
            actions,
            format!("action {:?} has no name", token),
        ));
    }
    if sep == token.len() - 1 {
        return Err(FlowError::action(
            actions,
            format!("action {:?} has no value", name),
        ));
    }

    let rest = &token[sep + 1..];
    if token.as_bytes()[sep] == b':' {
        return Ok(OvsAction::new(name, rest));
    }
    match rest.strip_suffix(')') {
        Some(value) => Ok(OvsAction::grouped(name, value)),
        None => Err(FlowError::action(
            actions,
            format!("trailing text after {:?} group", name),
        )),
    }
}
