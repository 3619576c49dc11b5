use pna_reactive::prelude::*;
use pna_reactive::Layout;
use proptest::prelude::*;
use serde_json::Value;

fn echo(out: &str, inputs: &[String]) -> CallbackSpec {
    let mut builder = CallbackSpec::builder().output((out, "value"));
    for input in inputs {
        builder = builder.input((input.as_str(), "value"));
    }
    builder.handle_fn(|args| Ok(Outputs::one(args.input(0).clone())))
}

fn node(i: usize) -> String {
    format!("n{i}")
}

fn layout_for(count: usize) -> Layout {
    let mut layout = Layout::new();
    layout.declare("source", [("value", Value::Null)]);
    for i in 0..count {
        layout.declare(node(i), [("value", Value::Null)]);
    }
    layout
}

proptest! {
    // Edges only point from lower to higher index, so the graph is a DAG;
    // registration order is shuffled by reversing it.
    #[test]
    fn prop_producers_precede_consumers(
        count in 1..15usize,
        edges in proptest::collection::vec((0..15usize, 0..15usize), 0..40),
        reverse in any::<bool>(),
    ) {
        let mut inputs: Vec<Vec<String>> = vec![vec!["source".to_string()]; count];
        for (a, b) in edges {
            let (from, to) = (a.min(b), a.max(b));
            if from != to && to < count && !inputs[to].contains(&node(from)) {
                inputs[to].push(node(from));
            }
        }

        let mut indices: Vec<usize> = (0..count).collect();
        if reverse {
            indices.reverse();
        }
        let mut registry = CallbackRegistry::new();
        for &i in &indices {
            registry.register(echo(&node(i), &inputs[i])).unwrap();
        }
        let graph = CallbackGraph::build(registry, &layout_for(count)).unwrap();

        prop_assert_eq!(graph.order().len(), count);
        for (producer, consumer) in graph.edges() {
            let p = graph.position(producer).unwrap();
            let c = graph.position(consumer).unwrap();
            prop_assert!(p < c, "{} must run before {}", producer, consumer);
        }
    }

    #[test]
    fn prop_overlapping_outputs_are_rejected(
        a in proptest::collection::hash_set(0..6usize, 1..4),
        b in proptest::collection::hash_set(0..6usize, 1..4),
    ) {
        let spec = |outs: &std::collections::HashSet<usize>| {
            let mut outs: Vec<_> = outs.iter().copied().collect();
            outs.sort_unstable();
            let mut builder = CallbackSpec::builder().input(("source", "value"));
            for o in &outs {
                builder = builder.output((node(*o).as_str(), "value"));
            }
            let n = outs.len();
            builder.handle_fn(move |_| Ok(Outputs::many(vec![Value::Null; n])))
        };

        let mut registry = CallbackRegistry::new();
        registry.register(spec(&a)).unwrap();
        let second = registry.register(spec(&b));
        if a.is_disjoint(&b) {
            prop_assert!(second.is_ok());
        } else {
            let rejected = matches!(second, Err(RegistrationError::DuplicateOutput { .. }));
            prop_assert!(rejected);
            prop_assert_eq!(registry.len(), 1);
        }
    }
}

#[test]
fn test_cycle_through_multi_output_spec_is_rejected() {
    // p writes a and b; q reads b and writes c; p reads c
    let layout = Layout::new()
        .with_component("a", [("value", Value::Null)])
        .with_component("b", [("value", Value::Null)])
        .with_component("c", [("value", Value::Null)]);
    let p = CallbackSpec::builder()
        .output(("a", "value"))
        .output(("b", "value"))
        .input(("c", "value"))
        .handle_fn(|_| Ok(Outputs::many([Value::Null, Value::Null])));
    let q = CallbackSpec::builder()
        .output(("c", "value"))
        .input(("b", "value"))
        .handle_fn(|_| Ok(Outputs::one(Value::Null)));

    let mut registry = CallbackRegistry::new();
    registry.register(p).unwrap();
    registry.register(q).unwrap();
    let err = CallbackGraph::build(registry, &layout).unwrap_err();
    match err {
        RegistrationError::CyclicDependency { cycle } => {
            let ids: Vec<_> = cycle.iter().map(SpecId::as_str).collect();
            assert_eq!(ids, ["..a.value...b.value..", "c.value"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_descriptors_follow_evaluation_order() {
    let layout = layout_for(3);
    let mut registry = CallbackRegistry::new();
    registry.register(echo("n2", &[node(1)])).unwrap();
    registry.register(echo("n1", &[node(0)])).unwrap();
    registry.register(echo("n0", &["source".into()])).unwrap();
    let graph = CallbackGraph::build(registry, &layout).unwrap();

    let ids: Vec<_> = graph.descriptors().into_iter().map(|d| d.id.0).collect();
    assert_eq!(ids, ["n0.value", "n1.value", "n2.value"]);
}
