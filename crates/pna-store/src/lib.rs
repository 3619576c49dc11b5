//! PNA Store (pna-store)
//!
//! Persistence for narratives and the labels annotators attach to documents.
//! Two backends implement both repository traits:
//! - [`PgStore`]: PostgreSQL, one connection per call
//! - [`InMemoryStore`]: shared in-process state for development and tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::{wait_for_db, PgSettings, PgStore};
pub use traits::{NarrativeLabelRepository, NarrativeRepository, LABEL_COLUMNS, NARRATIVE_COLUMNS};
