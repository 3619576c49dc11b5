//! Identifiers shared by the model, registry and scheduler

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Addressable `(component, property)` pair, the unit of data flow
///
/// Displays and parses as `component.property`, the form the browser uses
/// for prop ids. Component ids may not contain `.`; property names may.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    /// Component id
    pub component: String,
    /// Property name
    pub property: String,
}

impl PropertyRef {
    /// Create a property reference
    #[inline]
    #[must_use]
    pub fn new(component: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.property)
    }
}

impl From<(&str, &str)> for PropertyRef {
    fn from((component, property): (&str, &str)) -> Self {
        Self::new(component, property)
    }
}

/// Error parsing a `component.property` string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed property reference `{0}`, expected `component.property`")]
pub struct ParsePropertyRefError(pub String);

impl FromStr for PropertyRef {
    type Err = ParsePropertyRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((component, property)) if !component.is_empty() && !property.is_empty() => {
                Ok(Self::new(component, property))
            }
            _ => Err(ParsePropertyRefError(s.to_string())),
        }
    }
}

/// Callback identity, derived from the callback's outputs
///
/// A single output gives `component.property`; several outputs give
/// `..a.p...b.q..`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpecId(pub String);

impl SpecId {
    /// Derive the id for an output list
    #[must_use]
    pub fn from_outputs(outputs: &[PropertyRef]) -> Self {
        if let [single] = outputs {
            return Self(single.to_string());
        }
        let joined = outputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("...");
        Self(format!("..{joined}.."))
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
