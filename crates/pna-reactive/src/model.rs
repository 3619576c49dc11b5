//! Component model
//!
//! A [`Layout`] declares every addressable component and the initial value of
//! each of its properties. A [`ComponentModel`] is one session's live copy of
//! those values; rounds read inputs from it and write outputs back.

use crate::error::ModelError;
use crate::types::PropertyRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared components and their initial property values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    components: IndexMap<String, IndexMap<String, Value>>,
}

impl Layout {
    /// Create an empty layout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a component with its initial properties
    ///
    /// Declaring the same id twice merges the property sets; later values win.
    pub fn declare<I, K>(&mut self, id: impl Into<String>, props: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entry = self.components.entry(id.into()).or_default();
        for (name, value) in props {
            entry.insert(name.into(), value);
        }
    }

    /// Builder form of [`Layout::declare`]
    #[must_use]
    pub fn with_component<I, K>(mut self, id: impl Into<String>, props: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.declare(id, props);
        self
    }

    /// Whether the property is declared
    #[must_use]
    pub fn contains(&self, target: &PropertyRef) -> bool {
        self.components
            .get(&target.component)
            .is_some_and(|props| props.contains_key(&target.property))
    }

    /// Initial value of a declared property
    #[must_use]
    pub fn initial(&self, target: &PropertyRef) -> Option<&Value> {
        self.components
            .get(&target.component)
            .and_then(|props| props.get(&target.property))
    }

    /// Declared component ids, in declaration order
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Number of declared components
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// One addressable UI node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable id
    pub id: String,
    /// Current property values
    pub props: IndexMap<String, Value>,
}

/// A session's current property values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentModel {
    components: IndexMap<String, Component>,
}

impl ComponentModel {
    /// Fresh model holding the layout's initial values
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let components = layout
            .components
            .iter()
            .map(|(id, props)| {
                (
                    id.clone(),
                    Component {
                        id: id.clone(),
                        props: props.clone(),
                    },
                )
            })
            .collect();
        Self { components }
    }

    /// Read a property
    pub fn get(&self, target: &PropertyRef) -> Result<&Value, ModelError> {
        let component = self.component(&target.component)?;
        component
            .props
            .get(&target.property)
            .ok_or_else(|| ModelError::UnknownProperty(target.clone()))
    }

    /// Overwrite a declared property
    ///
    /// Writes are idempotent: the previous value is replaced, never merged.
    pub fn set(&mut self, target: &PropertyRef, value: Value) -> Result<(), ModelError> {
        let component = self
            .components
            .get_mut(&target.component)
            .ok_or_else(|| ModelError::UnknownComponent(target.component.clone()))?;
        let slot = component
            .props
            .get_mut(&target.property)
            .ok_or_else(|| ModelError::UnknownProperty(target.clone()))?;
        *slot = value;
        Ok(())
    }

    /// Look up a component by id
    pub fn component(&self, id: &str) -> Result<&Component, ModelError> {
        self.components
            .get(id)
            .ok_or_else(|| ModelError::UnknownComponent(id.to_string()))
    }

    /// Apply browser-reported values
    ///
    /// All or nothing: every target is checked before any value is written,
    /// so an undeclared property leaves the model untouched.
    pub fn apply_snapshot<'a, I>(&mut self, snapshot: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = (&'a PropertyRef, &'a Value)>,
    {
        let entries: Vec<_> = snapshot.into_iter().collect();
        for (target, _) in &entries {
            self.get(target)?;
        }
        for (target, value) in entries {
            self.set(target, value.clone())?;
        }
        Ok(())
    }

    /// Iterate over components in declaration order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }
}
