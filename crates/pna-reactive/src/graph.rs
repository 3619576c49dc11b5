//! Callback dependency graph (construction phase)
//!
//! [`CallbackGraph`] can ONLY be obtained through [`CallbackGraph::build`],
//! which validates the registry against the layout. Holding one means:
//! 1. every referenced property is declared in the layout
//! 2. the trigger edges are acyclic
//! 3. a deterministic evaluation order exists
//!
//! An edge runs from spec A to spec B when an output of A is a trigger input
//! of B. States never create edges: they supply a value when something else
//! fires but must not cause re-execution.

use crate::error::RegistrationError;
use crate::model::Layout;
use crate::registry::{CallbackRegistry, CallbackSpec, SpecDescriptor};
use crate::types::{PropertyRef, SpecId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Validated, immutable callback graph
///
/// Shared across sessions behind an `Arc`; nothing in it changes after
/// construction.
#[derive(Debug)]
pub struct CallbackGraph {
    specs: Vec<CallbackSpec>,
    graph: DiGraph<usize, ()>,
    order: Vec<usize>,
}

impl CallbackGraph {
    /// Validate the registry against the layout and freeze it
    ///
    /// # Errors
    /// - [`RegistrationError::MissingTarget`] if an output, input or state is
    ///   not declared in `layout`
    /// - [`RegistrationError::CyclicDependency`] if the trigger edges contain
    ///   a cycle (a spec listening to its own output included)
    pub fn build(registry: CallbackRegistry, layout: &Layout) -> Result<Self, RegistrationError> {
        let specs = registry.into_specs();

        for spec in &specs {
            if let Some(target) = spec.references().find(|r| !layout.contains(r)) {
                return Err(RegistrationError::MissingTarget {
                    spec: spec.id().clone(),
                    target: target.clone(),
                });
            }
        }

        let mut graph = DiGraph::<usize, ()>::with_capacity(specs.len(), specs.len());
        for index in 0..specs.len() {
            graph.add_node(index);
        }

        let producers: HashMap<&PropertyRef, usize> = specs
            .iter()
            .enumerate()
            .flat_map(|(i, spec)| spec.outputs().iter().map(move |o| (o, i)))
            .collect();

        for (consumer, spec) in specs.iter().enumerate() {
            for input in spec.inputs() {
                if let Some(&producer) = producers.get(input) {
                    graph.update_edge(NodeIndex::new(producer), NodeIndex::new(consumer), ());
                }
            }
        }

        if let Some(cycle) = find_cycle(&graph) {
            return Err(RegistrationError::CyclicDependency {
                cycle: cycle.into_iter().map(|i| specs[i].id().clone()).collect(),
            });
        }

        let order = stable_topological_order(&graph);
        debug_assert_eq!(order.len(), specs.len());

        tracing::info!(
            callbacks = specs.len(),
            edges = graph.edge_count(),
            "callback graph validated"
        );

        Ok(Self {
            specs,
            graph,
            order,
        })
    }

    /// Number of specs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the graph has no specs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Number of trigger edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Specs in registration order
    #[inline]
    #[must_use]
    pub fn specs(&self) -> &[CallbackSpec] {
        &self.specs
    }

    /// Specs in evaluation order
    pub fn in_order(&self) -> impl Iterator<Item = &CallbackSpec> {
        self.order.iter().map(|&i| &self.specs[i])
    }

    /// Spec ids in evaluation order
    #[must_use]
    pub fn order(&self) -> Vec<&SpecId> {
        self.in_order().map(CallbackSpec::id).collect()
    }

    /// Look up a spec
    #[must_use]
    pub fn spec(&self, id: &SpecId) -> Option<&CallbackSpec> {
        self.specs.iter().find(|s| s.id() == id)
    }

    /// Position of a spec in the evaluation order
    #[must_use]
    pub fn position(&self, id: &SpecId) -> Option<usize> {
        self.order.iter().position(|&i| self.specs[i].id() == id)
    }

    /// Trigger edges as `(producer, consumer)` pairs
    #[must_use]
    pub fn edges(&self) -> Vec<(&SpecId, &SpecId)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.specs[a.index()].id(), self.specs[b.index()].id()))
            .collect()
    }

    /// Specs directly triggered by outputs of `id`
    #[must_use]
    pub fn dependents(&self, id: &SpecId) -> Vec<&SpecId> {
        let Some(index) = self.specs.iter().position(|s| s.id() == id) else {
            return Vec::new();
        };
        let mut out: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(index), Direction::Outgoing)
            .map(NodeIndex::index)
            .collect();
        out.sort_unstable();
        out.into_iter().map(|i| self.specs[i].id()).collect()
    }

    /// Specs no other spec triggers
    #[must_use]
    pub fn entry_specs(&self) -> Vec<&SpecId> {
        self.graph
            .node_indices()
            .filter(|n| {
                self.graph
                    .neighbors_directed(*n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| self.specs[n.index()].id())
            .collect()
    }

    /// Wire descriptions in evaluation order
    #[must_use]
    pub fn descriptors(&self) -> Vec<SpecDescriptor> {
        self.in_order().map(CallbackSpec::descriptor).collect()
    }
}

/// First cycle found, as registration indices in ascending order
fn find_cycle(graph: &DiGraph<usize, ()>) -> Option<Vec<usize>> {
    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(NodeIndex::index).collect();
            members.sort_unstable();
            members
        })
        .min()
}

/// Kahn's algorithm, always releasing the lowest registration index first
///
/// Unrelated specs therefore run in registration order.
fn stable_topological_order(graph: &DiGraph<usize, ()>) -> Vec<usize> {
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(indegree.len());
    while let Some(Reverse(next)) = ready.pop() {
        order.push(next);
        for succ in graph.neighbors_directed(NodeIndex::new(next), Direction::Outgoing) {
            let d = &mut indegree[succ.index()];
            *d -= 1;
            if *d == 0 {
                ready.push(Reverse(succ.index()));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Outputs;
    use serde_json::Value;

    fn layout(components: &[&str]) -> Layout {
        let mut layout = Layout::new();
        for c in components {
            layout.declare(*c, [("value", Value::Null)]);
        }
        layout
    }

    fn link(out: &str, input: &str) -> CallbackSpec {
        CallbackSpec::builder()
            .output((out, "value"))
            .input((input, "value"))
            .handle_fn(|a| Ok(Outputs::one(a.input(0).clone())))
    }

    fn build(specs: Vec<CallbackSpec>, components: &[&str]) -> Result<CallbackGraph, RegistrationError> {
        let mut registry = CallbackRegistry::new();
        for s in specs {
            registry.register(s)?;
        }
        CallbackGraph::build(registry, &layout(components))
    }

    #[test]
    fn chain_orders_upstream_first_regardless_of_registration() {
        // c <- b <- a <- x, registered backwards
        let graph = build(
            vec![link("c", "b"), link("b", "a"), link("a", "x")],
            &["x", "a", "b", "c"],
        )
        .unwrap();
        let order: Vec<_> = graph.order().into_iter().map(SpecId::as_str).collect();
        assert_eq!(order, ["a.value", "b.value", "c.value"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn unrelated_specs_keep_registration_order() {
        let graph = build(
            vec![link("b", "x"), link("a", "x"), link("c", "y")],
            &["x", "y", "a", "b", "c"],
        )
        .unwrap();
        let order: Vec<_> = graph.order().into_iter().map(SpecId::as_str).collect();
        assert_eq!(order, ["b.value", "a.value", "c.value"]);
    }

    #[test]
    fn state_dependencies_create_no_edges() {
        // b reads a as state only; a reads b as state only: no cycle
        let a = CallbackSpec::builder()
            .output(("a", "value"))
            .input(("x", "value"))
            .state(("b", "value"))
            .handle_fn(|_| Ok(Outputs::one(Value::Null)));
        let b = CallbackSpec::builder()
            .output(("b", "value"))
            .input(("x", "value"))
            .state(("a", "value"))
            .handle_fn(|_| Ok(Outputs::one(Value::Null)));
        let graph = build(vec![a, b], &["x", "a", "b"]).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn cycle_is_rejected_with_members() {
        let err = build(
            vec![link("a", "b"), link("b", "c"), link("c", "a"), link("d", "x")],
            &["a", "b", "c", "d", "x"],
        )
        .unwrap_err();
        match err {
            RegistrationError::CyclicDependency { cycle } => {
                let ids: Vec<_> = cycle.iter().map(SpecId::as_str).collect();
                assert_eq!(ids, ["a.value", "b.value", "c.value"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_trigger_is_a_cycle() {
        let err = build(vec![link("a", "a")], &["a"]).unwrap_err();
        assert!(matches!(err, RegistrationError::CyclicDependency { .. }));
    }

    #[test]
    fn own_output_as_state_is_allowed() {
        let spec = CallbackSpec::builder()
            .output(("a", "value"))
            .input(("x", "value"))
            .state(("a", "value"))
            .handle_fn(|_| Ok(Outputs::one(Value::Null)));
        assert!(build(vec![spec], &["a", "x"]).is_ok());
    }

    #[test]
    fn missing_target_names_spec_and_property() {
        let spec = CallbackSpec::builder()
            .output(("a", "value"))
            .input(("x", "value"))
            .state(("ghost", "value"))
            .handle_fn(|_| Ok(Outputs::one(Value::Null)));
        let err = build(vec![spec], &["a", "x"]).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::MissingTarget {
                spec: SpecId("a.value".into()),
                target: PropertyRef::new("ghost", "value"),
            }
        );
    }

    #[test]
    fn dependents_and_entries() {
        let graph = build(
            vec![link("a", "x"), link("b", "a"), link("c", "a")],
            &["x", "a", "b", "c"],
        )
        .unwrap();
        let a = SpecId("a.value".into());
        let deps: Vec<_> = graph.dependents(&a).into_iter().map(SpecId::as_str).collect();
        assert_eq!(deps, ["b.value", "c.value"]);
        assert_eq!(graph.entry_specs(), vec![&a]);
        assert_eq!(graph.position(&a), Some(0));
    }
}
