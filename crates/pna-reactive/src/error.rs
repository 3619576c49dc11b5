//! Error types for the reactive core
//!
//! - [`RegistrationError`]: rejected callback declarations (fatal at startup)
//! - [`ModelError`]: reads/writes against undeclared components or properties
//! - [`HandlerError`]: a handler body failed during a round (recovered per round)
//! - [`RoundStateError`]: illegal round state transition
//! - [`SchedulerError`]: faults that abort a whole round

use crate::state_machine::RoundState;
use crate::types::{PropertyRef, SpecId};

/// Callback registration and graph validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Output already owned by another spec
    #[error("output {target} of {new} is already produced by {existing}")]
    DuplicateOutput {
        /// Contested property
        target: PropertyRef,
        /// Spec that registered the output first
        existing: SpecId,
        /// Spec being registered
        new: SpecId,
    },

    /// A referenced property is not declared in the layout
    #[error("{spec} references {target}, which is not declared in the layout")]
    MissingTarget {
        /// Referencing spec
        spec: SpecId,
        /// Undeclared property
        target: PropertyRef,
    },

    /// Trigger edges form a cycle
    #[error("callbacks form a dependency cycle: {}", format_cycle(.cycle))]
    CyclicDependency {
        /// Specs on the cycle, in registration order
        cycle: Vec<SpecId>,
    },

    /// Spec declared without outputs
    #[error("callback #{index} declares no outputs")]
    NoOutputs {
        /// Registration index
        index: usize,
    },

    /// Spec declared without trigger inputs
    #[error("{spec} declares no inputs")]
    NoInputs {
        /// Offending spec
        spec: SpecId,
    },
}

fn format_cycle(cycle: &[SpecId]) -> String {
    cycle
        .iter()
        .map(SpecId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Component model access errors
///
/// These should not occur once the graph validated against the layout; the
/// scheduler treats them as fatal for the round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No component with this id
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// Component exists but the property was never declared
    #[error("component `{}` has no property `{}`", .0.component, .0.property)]
    UnknownProperty(PropertyRef),
}

/// A handler failed while executing a round
#[derive(Debug, thiserror::Error)]
#[error("callback {spec_id} failed: {cause:#}")]
pub struct HandlerError {
    /// Failing spec
    pub spec_id: SpecId,
    /// Underlying failure
    #[source]
    pub cause: anyhow::Error,
}

impl HandlerError {
    /// Wrap a handler failure
    #[inline]
    pub fn new(spec_id: SpecId, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            spec_id,
            cause: cause.into(),
        }
    }
}

/// Faults that abort a round outright
///
/// Handler failures are not in here; they are recorded in the round report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// Model access failed (undeclared property in the request or the graph)
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Round state machine violated
    #[error(transparent)]
    State(#[from] RoundStateError),
}

/// Round state machine violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundStateError {
    /// Transition not in the transition table
    #[error("illegal round transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: RoundState,
        /// Requested state
        to: RoundState,
    },
}
