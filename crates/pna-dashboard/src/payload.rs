//! Typed payloads carried in hidden component properties
//!
//! Callbacks hand structured data to each other through properties of hidden
//! divs. These types are what goes in; [`serde_json::Value`] is only the
//! transport.

use pna_data::{SplitTable, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Word-vector selection results for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordVecData {
    /// Projected neighbourhood (`token`, `PC1`, `PC2`)
    pub neighbours: SplitTable,
    /// Category associations (`Entity`, `Category`, `NPMI`)
    pub liwc_freqs: SplitTable,
    /// Mentions over time (`Entity`, `Date`, `Count`)
    pub entity_attention: SplitTable,
}

impl WordVecData {
    /// Bundle the three query results
    #[must_use]
    pub fn new(neighbours: &Table, liwc_freqs: &Table, entity_attention: &Table) -> Self {
        Self {
            neighbours: neighbours.to_split(),
            liwc_freqs: liwc_freqs.to_split(),
            entity_attention: entity_attention.to_split(),
        }
    }

    /// Parse a property value; `null` or anything malformed is `None`
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// As a property value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Button that drove a narrative form transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    /// Page load
    Init,
    /// "Delete": ask for confirmation
    Delete,
    /// "Confirm Delete"
    ConfirmDelete,
    /// "Cancel Delete"
    CancelDelete,
    /// "Create Narrative"
    Create,
}

impl FormAction {
    /// Map the component that fired to its action
    #[must_use]
    pub fn from_component(id: &str) -> Option<Self> {
        use crate::ids;
        match id {
            ids::DELETE_NARRATIVE_BUTTON => Some(Self::Delete),
            ids::CONFIRM_DELETE_NARRATIVE => Some(Self::ConfirmDelete),
            ids::CANCEL_DELETE_NARRATIVE => Some(Self::CancelDelete),
            ids::CREATE_NARRATIVE => Some(Self::Create),
            _ => None,
        }
    }
}

/// Repository write a transition asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEffect {
    /// Nothing to write
    None,
    /// Create the narrative in the form
    Create,
    /// Delete the narrative in the form
    Delete,
}

/// Narrative form phase
///
/// Deleting takes two clicks: "Delete" moves to `PendingDelete` (confirm
/// controls shown, code locked), then "Confirm Delete" or "Cancel Delete"
/// return to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeFormPhase {
    /// Accepting create and delete requests
    #[default]
    Idle,
    /// Waiting for the delete to be confirmed or cancelled
    PendingDelete,
}

impl NarrativeFormPhase {
    /// Apply a button press
    #[must_use]
    pub fn next(self, action: FormAction) -> (Self, FormEffect) {
        match (self, action) {
            (_, FormAction::Create) => (Self::Idle, FormEffect::Create),
            (Self::Idle | Self::PendingDelete, FormAction::Delete) => {
                (Self::PendingDelete, FormEffect::None)
            }
            (Self::PendingDelete, FormAction::ConfirmDelete) => (Self::Idle, FormEffect::Delete),
            (Self::PendingDelete, FormAction::CancelDelete) => (Self::Idle, FormEffect::None),
            (Self::Idle, FormAction::ConfirmDelete | FormAction::CancelDelete)
            | (_, FormAction::Init) => (self, FormEffect::None),
        }
    }
}

/// Contents of the hidden narrative form state holder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeFormState {
    /// Current phase
    pub phase: NarrativeFormPhase,
    /// Last button handled
    pub last_action: Option<FormAction>,
    /// Whether the last action wrote to the repository
    pub complete: bool,
    /// Narratives after the last action; `None` until the first action
    #[serde(default)]
    pub narratives: Option<SplitTable>,
    /// User-facing problems with the last action
    #[serde(default)]
    pub messages: Vec<String>,
}

impl NarrativeFormState {
    /// State before any button was pressed
    #[must_use]
    pub fn initial() -> Self {
        Self {
            last_action: Some(FormAction::Init),
            ..Self::default()
        }
    }

    /// Parse a property value
    ///
    /// Anything that is not a state (the initial layout value included)
    /// reads as [`NarrativeFormState::initial`].
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self::initial())
    }

    /// As a property value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Whether the delete confirmation is pending
    #[must_use]
    pub fn is_pending_delete(&self) -> bool {
        self.phase == NarrativeFormPhase::PendingDelete
    }
}
