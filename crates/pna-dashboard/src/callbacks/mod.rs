//! Callback declarations and handler bodies
//!
//! Grouped by page section. Each group registers its specs against the
//! shared [`Services`]; [`register_all`] wires the whole page.
//!
//! Evaluation chains across groups:
//! - `update_word_selection` → error message → `word_vec_data` → entity
//!   figures and visibility styles
//! - `find_sentences` → `sentence_data` → sentence table
//! - narrative buttons → `narrative_form_state` → list, dropdown, form reset
//! - `tag_narrative` → `tagged_data` → tagged narrative table

mod corpus;
mod entity;
mod narratives;
mod sentences;

pub use entity::not_prepared_message;
pub use narratives::MISSING_CODE_MESSAGE;
pub use sentences::filter_by_keywords;

use pna_data::DataFacade;
use pna_reactive::{CallbackRegistry, RegistrationError, Value};
use pna_store::{InMemoryStore, NarrativeLabelRepository, NarrativeRepository};
use std::sync::Arc;

/// Collaborators the handlers call
#[derive(Clone)]
pub struct Services {
    /// Corpus queries
    pub facade: Arc<dyn DataFacade>,
    /// Narrative definitions
    pub narratives: Arc<dyn NarrativeRepository>,
    /// Narrative labels
    pub labels: Arc<dyn NarrativeLabelRepository>,
}

impl Services {
    /// Services backed by a fresh in-memory store
    #[must_use]
    pub fn in_memory(facade: Arc<dyn DataFacade>) -> Self {
        let store = InMemoryStore::new();
        Self {
            facade,
            narratives: Arc::new(store.clone()),
            labels: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Register every callback of the page
///
/// # Errors
/// Propagates the first [`RegistrationError`]; with the page's own specs this
/// only happens if two of them claim the same output.
pub fn register_all(
    registry: &mut CallbackRegistry,
    services: &Services,
) -> Result<(), RegistrationError> {
    corpus::register(registry, services)?;
    entity::register(registry, services)?;
    sentences::register(registry, services)?;
    narratives::register(registry, services)?;
    tracing::debug!(callbacks = registry.len(), "page callbacks registered");
    Ok(())
}

/// Text content of a property; `null` and non-strings read as empty
fn text(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}
