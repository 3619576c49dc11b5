//! Data façade
//!
//! Read-only analytic queries the dashboard handlers call. Implementations
//! hold their data in memory; queries return fresh [`Table`]s and are never
//! cached by callers.

use crate::error::FacadeError;
use crate::table::Table;

/// Analytic queries over a corpus
pub trait DataFacade: Send + Sync {
    /// Entity mention counts (`Entity`, `Count`)
    fn entity_counts(&self) -> Result<Table, FacadeError>;

    /// Projected word vectors for `anchor` and its neighbours (`token`,
    /// `PC1`, `PC2`)
    ///
    /// # Errors
    /// [`FacadeError::UnknownEntity`] if `anchor` has no neighbour list.
    fn vector_neighbourhood(&self, anchor: &str) -> Result<Table, FacadeError>;

    /// Category associations of an entity (`Entity`, `Category`, `NPMI`)
    fn liwc_profile(&self, entity: &str) -> Result<Table, FacadeError>;

    /// Example documents mentioning an entity (`Date`, `Likes`, `Retweets`,
    /// `Sentence`, `Url`)
    ///
    /// # Errors
    /// [`FacadeError::UnknownEntity`] if the entity has no documents.
    fn sentences(&self, entity: &str) -> Result<Table, FacadeError>;

    /// Daily mention counts of an entity, oldest first (`Entity`, `Date`,
    /// `Count`)
    fn entity_counts_over_time(&self, entity: &str) -> Result<Table, FacadeError>;

    /// Daily document volume (`Date`, `Count`)
    fn corpus_volume_over_time(&self) -> Result<Table, FacadeError>;

    /// Whether word vectors exist for `word`
    fn in_vocab(&self, word: &str) -> bool;

    /// Category frequencies over time (`Date`, `Category`, `Count`,
    /// `Frequency`, `Number of Tokens`)
    fn liwc_over_time(&self) -> Result<Table, FacadeError>;
}
