//! Callback registry
//!
//! A [`CallbackSpec`] says "when any of these inputs change, recompute these
//! outputs, reading these states without triggering on them". The
//! [`CallbackRegistry`] collects specs at startup and enforces single
//! ownership of every output property.

use crate::context::TriggerContext;
use crate::error::RegistrationError;
use crate::types::{PropertyRef, SpecId};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Arguments handed to a handler
#[derive(Debug, Clone)]
pub struct CallArgs {
    /// Current values of the trigger inputs, in declaration order
    pub inputs: Vec<Value>,
    /// Current values of the states, in declaration order
    pub states: Vec<Value>,
    /// Which input fired
    pub trigger: TriggerContext,
}

impl CallArgs {
    /// Input value by position (`null` when out of range)
    #[inline]
    #[must_use]
    pub fn input(&self, index: usize) -> &Value {
        self.inputs.get(index).unwrap_or(&NULL)
    }

    /// State value by position (`null` when out of range)
    #[inline]
    #[must_use]
    pub fn state(&self, index: usize) -> &Value {
        self.states.get(index).unwrap_or(&NULL)
    }

    /// Input as a string, if it is one
    #[inline]
    #[must_use]
    pub fn input_str(&self, index: usize) -> Option<&str> {
        self.input(index).as_str()
    }

    /// State as a string, if it is one
    #[inline]
    #[must_use]
    pub fn state_str(&self, index: usize) -> Option<&str> {
        self.state(index).as_str()
    }
}

/// Values produced by a handler, one per declared output
#[derive(Debug, Clone, PartialEq)]
pub struct Outputs(Vec<Value>);

impl Outputs {
    /// Result for a single-output spec
    #[inline]
    pub fn one(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    /// Results for a multi-output spec, in output order
    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Number of values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no values were produced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the value list
    #[inline]
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

/// Handler body of a callback
///
/// Implementations hold their collaborators (data façade, repositories) and
/// compute outputs from [`CallArgs`] alone.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    /// Compute the outputs
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs>;
}

struct FnHandler<F>(F);

#[async_trait::async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(CallArgs) -> anyhow::Result<Outputs> + Send + Sync,
{
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        (self.0)(args)
    }
}

/// Wrap a synchronous closure as a handler
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(CallArgs) -> anyhow::Result<Outputs> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// A declarative callback rule
#[derive(Clone)]
pub struct CallbackSpec {
    id: SpecId,
    outputs: Vec<PropertyRef>,
    inputs: Vec<PropertyRef>,
    states: Vec<PropertyRef>,
    skip_on_initial_load: bool,
    handler: Arc<dyn Handler>,
}

impl CallbackSpec {
    /// Start declaring a spec
    #[inline]
    #[must_use]
    pub fn builder() -> CallbackSpecBuilder {
        CallbackSpecBuilder::default()
    }

    /// Identity derived from the outputs
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SpecId {
        &self.id
    }

    /// Output properties, in order
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[PropertyRef] {
        &self.outputs
    }

    /// Trigger inputs, in order
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[PropertyRef] {
        &self.inputs
    }

    /// Read-only states, in order
    #[inline]
    #[must_use]
    pub fn states(&self) -> &[PropertyRef] {
        &self.states
    }

    /// Whether the callback is left out of the initial-load round
    #[inline]
    #[must_use]
    pub fn skip_on_initial_load(&self) -> bool {
        self.skip_on_initial_load
    }

    /// The handler
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Every property the callback references
    pub fn references(&self) -> impl Iterator<Item = &PropertyRef> {
        self.outputs
            .iter()
            .chain(self.inputs.iter())
            .chain(self.states.iter())
    }

    /// Serializable description, as served to the browser
    #[must_use]
    pub fn descriptor(&self) -> SpecDescriptor {
        SpecDescriptor {
            id: self.id.clone(),
            outputs: self.outputs.iter().map(ToString::to_string).collect(),
            inputs: self.inputs.iter().map(ToString::to_string).collect(),
            states: self.states.iter().map(ToString::to_string).collect(),
            skip_on_initial_load: self.skip_on_initial_load,
        }
    }
}

impl fmt::Debug for CallbackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSpec")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("states", &self.states)
            .field("skip_on_initial_load", &self.skip_on_initial_load)
            .finish_non_exhaustive()
    }
}

/// Wire description of a spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecDescriptor {
    /// Spec id
    pub id: SpecId,
    /// Outputs as `component.property`
    pub outputs: Vec<String>,
    /// Trigger inputs as `component.property`
    pub inputs: Vec<String>,
    /// States as `component.property`
    pub states: Vec<String>,
    /// Initial-load flag
    pub skip_on_initial_load: bool,
}

/// Builder for [`CallbackSpec`]
///
/// ```rust,ignore
/// let spec = CallbackSpec::builder()
///     .output(("word_vec_data", "children"))
///     .input(("word_selection_error_message", "children"))
///     .state(("word_for_vectors", "value"))
///     .skip_on_initial_load()
///     .handle(FetchWordVecData::new(facade));
/// ```
#[derive(Debug, Default)]
pub struct CallbackSpecBuilder {
    outputs: Vec<PropertyRef>,
    inputs: Vec<PropertyRef>,
    states: Vec<PropertyRef>,
    skip_on_initial_load: bool,
}

impl CallbackSpecBuilder {
    /// Add an output
    #[must_use]
    pub fn output(mut self, target: impl Into<PropertyRef>) -> Self {
        self.outputs.push(target.into());
        self
    }

    /// Add a trigger input
    #[must_use]
    pub fn input(mut self, source: impl Into<PropertyRef>) -> Self {
        self.inputs.push(source.into());
        self
    }

    /// Add a read-only state
    #[must_use]
    pub fn state(mut self, source: impl Into<PropertyRef>) -> Self {
        self.states.push(source.into());
        self
    }

    /// Leave the callback out of the initial-load round
    #[must_use]
    pub fn skip_on_initial_load(mut self) -> Self {
        self.skip_on_initial_load = true;
        self
    }

    /// Finish with a handler
    pub fn handle(self, handler: impl Handler + 'static) -> CallbackSpec {
        self.handle_arc(Arc::new(handler))
    }

    /// Finish with a synchronous closure
    pub fn handle_fn<F>(self, f: F) -> CallbackSpec
    where
        F: Fn(CallArgs) -> anyhow::Result<Outputs> + Send + Sync + 'static,
    {
        self.handle_arc(handler_fn(f))
    }

    /// Finish with a shared handler
    #[must_use]
    pub fn handle_arc(self, handler: Arc<dyn Handler>) -> CallbackSpec {
        CallbackSpec {
            id: SpecId::from_outputs(&self.outputs),
            outputs: self.outputs,
            inputs: self.inputs,
            states: self.states,
            skip_on_initial_load: self.skip_on_initial_load,
            handler,
        }
    }
}

/// Registered specs, in registration order
///
/// Populated once at startup, then frozen by
/// [`CallbackGraph::build`](crate::graph::CallbackGraph::build).
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    specs: Vec<CallbackSpec>,
    owners: HashMap<PropertyRef, SpecId>,
}

impl CallbackRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec
    ///
    /// # Errors
    /// - [`RegistrationError::NoOutputs`] / [`RegistrationError::NoInputs`]
    ///   for incomplete declarations
    /// - [`RegistrationError::DuplicateOutput`] if an output is already owned,
    ///   by an earlier spec or by this spec listing it twice
    pub fn register(&mut self, spec: CallbackSpec) -> Result<SpecId, RegistrationError> {
        if spec.outputs.is_empty() {
            return Err(RegistrationError::NoOutputs {
                index: self.specs.len(),
            });
        }
        if spec.inputs.is_empty() {
            return Err(RegistrationError::NoInputs {
                spec: spec.id.clone(),
            });
        }

        for (i, target) in spec.outputs.iter().enumerate() {
            let existing = self
                .owners
                .get(target)
                .cloned()
                .or_else(|| spec.outputs[..i].contains(target).then(|| spec.id.clone()));
            if let Some(existing) = existing {
                return Err(RegistrationError::DuplicateOutput {
                    target: target.clone(),
                    existing,
                    new: spec.id.clone(),
                });
            }
        }

        for target in &spec.outputs {
            self.owners.insert(target.clone(), spec.id.clone());
        }
        let id = spec.id.clone();
        tracing::debug!(spec = %id, "registered callback");
        self.specs.push(spec);
        Ok(id)
    }

    /// Spec that owns an output property
    #[must_use]
    pub fn owner_of(&self, target: &PropertyRef) -> Option<&SpecId> {
        self.owners.get(target)
    }

    /// Registered specs, in registration order
    #[inline]
    #[must_use]
    pub fn specs(&self) -> &[CallbackSpec] {
        &self.specs
    }

    /// Number of registered specs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub(crate) fn into_specs(self) -> Vec<CallbackSpec> {
        self.specs
    }
}
