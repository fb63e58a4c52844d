//! Directive grammar for coordinator replies.
//!
//! ```text
//! directive := '[' NAME ':' ws* TEXT ']'
//! NAME      := [A-Z_]+
//! TEXT      := any characters up to the first ']' (may span lines)
//! ```
//!
//! Only `CODE_REQUEST`, `BASE_VALIDATION_REQUEST` and
//! `STRICT_VALIDATION_REQUEST` produce delegations. Any other bracketed text
//! is prose and is skipped, so a directive nested inside prose brackets is
//! still found.

use super::entities::{AgentRole, Delegation};
use winnow::ascii::multispace0;
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{take_until, take_while};

/// A directive as written, before the name is resolved to a role.
struct RawDirective<'i> {
    name: &'i str,
    text: &'i str,
}

fn directive_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_uppercase() || c == '_').parse_next(input)
}

fn directive<'i>(input: &mut &'i str) -> ModalResult<RawDirective<'i>> {
    '['.parse_next(input)?;
    let name = directive_name.parse_next(input)?;
    ':'.parse_next(input)?;
    multispace0.parse_next(input)?;
    let text = take_until(0.., "]").parse_next(input)?;
    ']'.parse_next(input)?;
    Ok(RawDirective { name, text })
}

/// Extract every delegation directive from a coordinator reply, in document order.
pub fn parse_delegations(response: &str) -> Vec<Delegation> {
    let mut delegations = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = response[cursor..].find('[') {
        let start = cursor + offset;
        let mut rest = &response[start..];

        let parsed = directive.parse_next(&mut rest);
        let end = response.len() - rest.len();

        match parsed {
            Ok(raw) => match AgentRole::from_marker(raw.name) {
                Some(target) => {
                    delegations.push(Delegation {
                        target,
                        instruction: raw.text.trim().to_string(),
                        raw_marker: response[start..end].to_string(),
                    });
                    cursor = end;
                }
                // Unknown name: resume right after this bracket
                None => cursor = start + 1,
            },
            Err(_) => cursor = start + 1,
        }
    }

    delegations
}

/// Keep the first delegation per target; return `(kept, dropped)`.
pub fn dedupe_by_target(delegations: Vec<Delegation>) -> (Vec<Delegation>, Vec<Delegation>) {
    let mut seen = Vec::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();

    for delegation in delegations {
        if seen.contains(&delegation.target) {
            dropped.push(delegation);
        } else {
            seen.push(delegation.target);
            kept.push(delegation);
        }
    }

    (kept, dropped)
}

/// Whether a reply contains at least one delegation directive.
pub fn has_delegations(response: &str) -> bool {
    !parse_delegations(response).is_empty()
}
