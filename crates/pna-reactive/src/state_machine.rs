//! Round lifecycle
//!
//! Every round moves `Idle -> Dispatching -> Executing` and ends in either
//! `Committed` or `Failed`. The scheduler checks each step with
//! [`validate_transition`]; terminal states have no exits.

use crate::error::RoundStateError;
use serde::{Deserialize, Serialize};

/// Lifecycle of one evaluation round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Created, nothing resolved yet
    Idle,
    /// Resolving which callbacks the trigger fires
    Dispatching,
    /// Running handlers in dependency order
    Executing,
    /// Every handler that ran succeeded
    Committed,
    /// At least one handler failed; unaffected outputs were still written
    Failed,
}

impl RoundState {
    /// Whether the round has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::Committed | RoundState::Failed)
    }
}

/// Validates a round state transition.
pub fn validate_transition(from: RoundState, to: RoundState) -> Result<(), RoundStateError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(RoundStateError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step. Empty for terminal states.
#[must_use]
pub fn allowed_transitions(from: RoundState) -> Vec<RoundState> {
    use RoundState::*;
    match from {
        Idle => vec![Dispatching],
        Dispatching => vec![Executing],
        Executing => vec![Committed, Failed],
        Committed => vec![],
        Failed => vec![],
    }
}

fn allowed(from: RoundState, to: RoundState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
