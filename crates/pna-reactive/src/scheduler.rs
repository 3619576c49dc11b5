//! Evaluation scheduler (execution phase)
//!
//! One round per browser interaction:
//! - **Dispatching**: record what changed (or mark the page-ready load)
//! - **Executing**: walk the graph's evaluation order; a spec runs when one of
//!   its trigger inputs is in the changed set when its turn comes, and its
//!   outputs join the changed set so downstream specs see them in the same
//!   round
//! - **Committed** / **Failed**: every successful write stays applied either
//!   way
//!
//! A failing handler taints its outputs. The tainted outputs still join the
//! changed set, so every spec that would run with a tainted trigger input is
//! recorded as blocked and taints its own outputs in turn, in change rounds
//! and initial loads alike. Independent specs carry on.

use crate::context::TriggerContext;
use crate::error::{HandlerError, RoundStateError, SchedulerError};
use crate::graph::CallbackGraph;
use crate::model::ComponentModel;
use crate::registry::{CallArgs, CallbackSpec};
use crate::state_machine::{validate_transition, RoundState};
use crate::types::{PropertyRef, SpecId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::Instrument;

/// What started the round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// First page load: every spec not flagged `skip_on_initial_load`
    InitialLoad,
    /// Properties changed by the browser
    Changed(Vec<PropertyRef>),
}

impl Dispatch {
    /// A single changed property
    #[inline]
    pub fn changed(target: impl Into<PropertyRef>) -> Self {
        Self::Changed(vec![target.into()])
    }
}

/// What happened to one spec during a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecOutcome {
    /// Handler ran and its outputs were written
    Executed {
        /// Spec
        spec: SpecId,
        /// Context the handler saw
        trigger: TriggerContext,
    },
    /// Handler ran and failed; details in [`RoundReport::errors`]
    Failed {
        /// Spec
        spec: SpecId,
    },
    /// Not run because a trigger input came from a failed spec
    Blocked {
        /// Spec
        spec: SpecId,
        /// The stale input
        stale_input: PropertyRef,
    },
}

impl SpecOutcome {
    /// Spec this outcome is about
    #[must_use]
    pub fn spec(&self) -> &SpecId {
        match self {
            SpecOutcome::Executed { spec, .. }
            | SpecOutcome::Failed { spec }
            | SpecOutcome::Blocked { spec, .. } => spec,
        }
    }
}

/// Result of one round
#[derive(Debug)]
pub struct RoundReport {
    /// Terminal state
    pub state: RoundState,
    /// Per-spec outcomes, in execution order
    pub outcomes: Vec<SpecOutcome>,
    /// Property writes, in write order
    pub updates: Vec<(PropertyRef, Value)>,
    /// Handler failures
    pub errors: Vec<HandlerError>,
}

impl RoundReport {
    /// Whether every handler succeeded
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state == RoundState::Committed
    }

    /// Specs whose handlers ran successfully, in execution order
    #[must_use]
    pub fn executed(&self) -> Vec<&SpecId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SpecOutcome::Executed { .. }))
            .map(SpecOutcome::spec)
            .collect()
    }

    /// Specs that were blocked by an upstream failure, transitively
    #[must_use]
    pub fn blocked(&self) -> Vec<&SpecId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SpecOutcome::Blocked { .. }))
            .map(SpecOutcome::spec)
            .collect()
    }

    /// Value written to `target` this round, if any
    #[must_use]
    pub fn update(&self, target: &PropertyRef) -> Option<&Value> {
        self.updates
            .iter()
            .find(|(r, _)| r == target)
            .map(|(_, v)| v)
    }

    /// Trigger context a spec executed with
    #[must_use]
    pub fn trigger_of(&self, spec: &SpecId) -> Option<&TriggerContext> {
        self.outcomes.iter().find_map(|o| match o {
            SpecOutcome::Executed { spec: s, trigger } if s == spec => Some(trigger),
            _ => None,
        })
    }
}

struct Round {
    state: RoundState,
}

impl Round {
    fn new() -> Self {
        Self {
            state: RoundState::Idle,
        }
    }

    fn advance(&mut self, to: RoundState) -> Result<(), RoundStateError> {
        validate_transition(self.state, to)?;
        self.state = to;
        Ok(())
    }
}

/// Runs rounds against session models
///
/// Cheap to clone; the graph is shared.
#[derive(Debug, Clone)]
pub struct Scheduler {
    graph: Arc<CallbackGraph>,
}

impl Scheduler {
    /// Create a scheduler for a validated graph
    #[inline]
    #[must_use]
    pub fn new(graph: Arc<CallbackGraph>) -> Self {
        Self { graph }
    }

    /// The graph being evaluated
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Arc<CallbackGraph> {
        &self.graph
    }

    /// Run one round to completion
    ///
    /// Handlers run one at a time in evaluation order. Outputs are written to
    /// `model` as soon as each handler returns.
    ///
    /// # Errors
    /// [`SchedulerError::Model`] if `dispatch` names an undeclared property
    /// (or, after validation, should never otherwise happen). Handler
    /// failures do not error; they end the round in [`RoundState::Failed`].
    pub async fn run_round(
        &self,
        model: &mut ComponentModel,
        dispatch: Dispatch,
    ) -> Result<RoundReport, SchedulerError> {
        let span = tracing::debug_span!(
            "round",
            initial_load = matches!(dispatch, Dispatch::InitialLoad)
        );
        self.execute(model, dispatch).instrument(span).await
    }

    async fn execute(
        &self,
        model: &mut ComponentModel,
        dispatch: Dispatch,
    ) -> Result<RoundReport, SchedulerError> {
        let mut round = Round::new();
        round.advance(RoundState::Dispatching)?;

        let initial_load = matches!(dispatch, Dispatch::InitialLoad);
        let mut changed: HashSet<PropertyRef> = match dispatch {
            Dispatch::InitialLoad => HashSet::new(),
            Dispatch::Changed(refs) => refs.into_iter().collect(),
        };
        for target in &changed {
            model.get(target)?;
        }
        tracing::debug!(initial_load, changed = changed.len(), "dispatching round");

        round.advance(RoundState::Executing)?;

        let mut outcomes = Vec::new();
        let mut updates = Vec::new();
        let mut errors = Vec::new();
        let mut tainted: HashMap<PropertyRef, SpecId> = HashMap::new();

        for spec in self.graph.in_order() {
            let trigger = if initial_load {
                if spec.skip_on_initial_load() {
                    continue;
                }
                TriggerContext::initial_load()
            } else {
                let ctx = TriggerContext::for_change(spec.inputs(), &changed);
                if ctx.which_fired().is_none() {
                    continue;
                }
                ctx
            };

            if let Some(stale) = spec.inputs().iter().find(|i| tainted.contains_key(*i)) {
                let root = tainted[stale].clone();
                tracing::debug!(spec = %spec.id(), input = %stale, failed = %root, "callback blocked");
                for out in spec.outputs() {
                    tainted.insert(out.clone(), root.clone());
                    changed.insert(out.clone());
                }
                outcomes.push(SpecOutcome::Blocked {
                    spec: spec.id().clone(),
                    stale_input: stale.clone(),
                });
                continue;
            }

            let args = CallArgs {
                inputs: resolve(model, spec.inputs())?,
                states: resolve(model, spec.states())?,
                trigger: trigger.clone(),
            };

            tracing::debug!(spec = %spec.id(), fired = ?trigger.which_fired(), "executing callback");
            let span = tracing::debug_span!("spec", spec = %spec.id());
            match invoke(spec, args).instrument(span).await {
                Ok(values) => {
                    for (target, value) in spec.outputs().iter().zip(values) {
                        model.set(target, value.clone())?;
                        changed.insert(target.clone());
                        updates.push((target.clone(), value));
                    }
                    outcomes.push(SpecOutcome::Executed {
                        spec: spec.id().clone(),
                        trigger,
                    });
                }
                Err(err) => {
                    tracing::warn!(spec = %spec.id(), error = %err.cause, "callback failed");
                    for out in spec.outputs() {
                        tainted.insert(out.clone(), spec.id().clone());
                        changed.insert(out.clone());
                    }
                    outcomes.push(SpecOutcome::Failed {
                        spec: spec.id().clone(),
                    });
                    errors.push(err);
                }
            }
        }

        let terminal = if errors.is_empty() {
            RoundState::Committed
        } else {
            RoundState::Failed
        };
        round.advance(terminal)?;

        tracing::debug!(
            state = ?round.state,
            executed = outcomes
                .iter()
                .filter(|o| matches!(o, SpecOutcome::Executed { .. }))
                .count(),
            failed = errors.len(),
            updates = updates.len(),
            "round finished"
        );

        Ok(RoundReport {
            state: round.state,
            outcomes,
            updates,
            errors,
        })
    }
}

fn resolve(model: &ComponentModel, refs: &[PropertyRef]) -> Result<Vec<Value>, SchedulerError> {
    refs.iter()
        .map(|r| model.get(r).cloned().map_err(SchedulerError::from))
        .collect()
}

async fn invoke(spec: &CallbackSpec, args: CallArgs) -> Result<Vec<Value>, HandlerError> {
    let outputs = spec
        .handler()
        .call(args)
        .await
        .map_err(|e| HandlerError::new(spec.id().clone(), e))?;

    if outputs.len() != spec.outputs().len() {
        return Err(HandlerError::new(
            spec.id().clone(),
            anyhow::anyhow!(
                "handler returned {} values for {} outputs",
                outputs.len(),
                spec.outputs().len()
            ),
        ));
    }
    Ok(outputs.into_values())
}
