//! Trigger context
//!
//! When a callback listens to several inputs the handler needs to know which
//! one changed. The scheduler computes this per invocation and passes it in
//! [`CallArgs`](crate::registry::CallArgs); nothing here is global.

use crate::types::PropertyRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which trigger inputs caused the current execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContext {
    fired: Vec<PropertyRef>,
    initial_load: bool,
}

impl TriggerContext {
    /// Context for an execution caused by `changed`
    ///
    /// `inputs` are the callback's trigger inputs in declaration order; the result
    /// keeps that order.
    #[must_use]
    pub fn for_change(inputs: &[PropertyRef], changed: &HashSet<PropertyRef>) -> Self {
        Self {
            fired: inputs
                .iter()
                .filter(|input| changed.contains(*input))
                .cloned()
                .collect(),
            initial_load: false,
        }
    }

    /// Context for the synthetic page-ready execution
    #[inline]
    #[must_use]
    pub fn initial_load() -> Self {
        Self {
            fired: Vec::new(),
            initial_load: true,
        }
    }

    /// The input that caused this execution
    ///
    /// When several changed together, the first in declaration order wins.
    /// `None` only on initial load.
    #[inline]
    #[must_use]
    pub fn which_fired(&self) -> Option<&PropertyRef> {
        self.fired.first()
    }

    /// Every trigger input that changed, in declaration order
    #[inline]
    #[must_use]
    pub fn fired(&self) -> &[PropertyRef] {
        &self.fired
    }

    /// Whether `component` is the component that fired
    #[must_use]
    pub fn fired_by(&self, component: &str) -> bool {
        self.which_fired()
            .is_some_and(|fired| fired.component == component)
    }

    /// Whether this is the page-ready execution
    #[inline]
    #[must_use]
    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs() -> (PropertyRef, PropertyRef) {
        (
            PropertyRef::new("delete_narrative_button", "n_clicks"),
            PropertyRef::new("create_narrative", "n_clicks"),
        )
    }

    #[test]
    fn single_change_is_reported() {
        let (a, b) = refs();
        let changed = HashSet::from([b.clone()]);
        let ctx = TriggerContext::for_change(&[a, b.clone()], &changed);
        assert_eq!(ctx.which_fired(), Some(&b));
        assert!(ctx.fired_by("create_narrative"));
        assert!(!ctx.is_initial_load());
    }

    #[test]
    fn simultaneous_changes_break_ties_by_declaration_order() {
        let (a, b) = refs();
        let changed = HashSet::from([b.clone(), a.clone()]);
        let ctx = TriggerContext::for_change(&[a.clone(), b.clone()], &changed);
        assert_eq!(ctx.which_fired(), Some(&a));
        assert_eq!(ctx.fired(), &[a.clone(), b.clone()]);

        let ctx = TriggerContext::for_change(&[b.clone(), a], &changed);
        assert_eq!(ctx.which_fired(), Some(&b));
    }

    #[test]
    fn initial_load_has_no_fired_input() {
        let ctx = TriggerContext::initial_load();
        assert!(ctx.is_initial_load());
        assert_eq!(ctx.which_fired(), None);
        assert!(!ctx.fired_by("create_narrative"));
    }
}
