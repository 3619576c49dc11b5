//! Repository trait definitions

use crate::error::StoreResult;
use async_trait::async_trait;
use pna_data::Table;

/// Columns returned by [`NarrativeRepository::all`]
pub const NARRATIVE_COLUMNS: [&str; 2] = ["code", "description"];

/// Columns returned by [`NarrativeLabelRepository::all`]
pub const LABEL_COLUMNS: [&str; 4] = ["narrative_code", "annotator", "text", "description"];

/// Narrative definitions
#[async_trait]
pub trait NarrativeRepository: Send + Sync {
    /// Create a narrative; an existing code is left untouched and is not an
    /// error
    async fn create(&self, code: &str, description: &str) -> StoreResult<()>;

    /// Delete a narrative and its labels
    async fn delete(&self, code: &str) -> StoreResult<()>;

    /// Every narrative
    async fn all(&self) -> StoreResult<Table>;
}

/// Narrative labels attached to documents
#[async_trait]
pub trait NarrativeLabelRepository: Send + Sync {
    /// Label `text` with a narrative
    async fn create(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()>;

    /// Remove a label
    async fn delete(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()>;

    /// Every label, joined with its narrative's description
    async fn all(&self) -> StoreResult<Table>;
}
