//! Stop detection: consensus, stable dissent, and the round ceiling.

use std::collections::BTreeMap;

use super::roles::DebateRole;
use super::state::{DebateState, StopReason};

/// Role → declared position for one round. Roles that declared nothing are absent.
pub type PositionMap = BTreeMap<DebateRole, String>;

/// Positions declared in `round`.
pub fn positions_in_round(state: &DebateState, round: u32) -> PositionMap {
    state
        .outputs_in_round(round)
        .filter_map(|o| o.output.position().map(|p| (o.output.role, p.to_string())))
        .collect()
}

/// Whether `round` reached consensus: the arbiter spoke with no unresolved
/// challenges, and at least one role declared a position with every
/// declared position identical.
pub fn is_consensus(state: &DebateState, round: u32) -> bool {
    let arbiter_clear = state
        .output_of(round, DebateRole::Arbiter)
        .is_some_and(|o| o.content.unresolved_challenges.is_empty());
    if !arbiter_clear {
        return false;
    }
    let positions = positions_in_round(state, round);
    let mut values = positions.values();
    match values.next() {
        Some(first) => values.all(|p| p == first),
        None => false,
    }
}

/// Whether positions in `round` are unchanged from the round before.
///
/// Two consecutive rounds in which no role declares a position count as
/// unchanged.
pub fn is_stable_dissent(state: &DebateState, round: u32) -> bool {
    round >= 2 && positions_in_round(state, round) == positions_in_round(state, round - 1)
}

/// Stop reason for a just-completed round, checked in priority order.
pub fn detect_stop(state: &DebateState, round: u32, max_rounds: u32) -> Option<StopReason> {
    if is_consensus(state, round) {
        Some(StopReason::Consensus)
    } else if is_stable_dissent(state, round) {
        Some(StopReason::StableDissent)
    } else if round >= max_rounds {
        Some(StopReason::MaxRounds)
    } else {
        None
    }
}
