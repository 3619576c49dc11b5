//! In-memory repositories for development and testing

use crate::error::{StoreError, StoreResult};
use crate::traits::{NarrativeLabelRepository, NarrativeRepository, LABEL_COLUMNS, NARRATIVE_COLUMNS};
use async_trait::async_trait;
use pna_data::Table;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Label {
    narrative_code: String,
    annotator: String,
    text: String,
}

#[derive(Debug, Default)]
struct Tables {
    narratives: BTreeMap<String, String>,
    labels: Vec<Label>,
}

/// Both repositories over one shared in-memory state
///
/// Clones share state, so a clone handed out as the label repository sees
/// narratives created through the original. Labels follow the same rules as
/// the database schema: they must reference an existing narrative and are
/// removed with it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NarrativeRepository for InMemoryStore {
    async fn create(&self, code: &str, description: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .narratives
            .entry(code.to_string())
            .or_insert_with(|| description.to_string());
        Ok(())
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.narratives.remove(code);
        tables.labels.retain(|l| l.narrative_code != code);
        Ok(())
    }

    async fn all(&self) -> StoreResult<Table> {
        let tables = self.tables.read().await;
        let mut table = Table::new(NARRATIVE_COLUMNS);
        for (code, description) in &tables.narratives {
            table
                .push_row(vec![
                    Value::String(code.clone()),
                    Value::String(description.clone()),
                ])
                .map_err(StoreError::query)?;
        }
        Ok(table)
    }
}

#[async_trait]
impl NarrativeLabelRepository for InMemoryStore {
    async fn create(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.narratives.contains_key(narrative_code) {
            return Err(StoreError::Query(format!(
                "narrative `{narrative_code}` does not exist"
            )));
        }
        tables.labels.push(Label {
            narrative_code: narrative_code.to_string(),
            annotator: annotator.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.labels.retain(|l| {
            !(l.narrative_code == narrative_code && l.annotator == annotator && l.text == text)
        });
        Ok(())
    }

    async fn all(&self) -> StoreResult<Table> {
        let tables = self.tables.read().await;
        let mut table = Table::new(LABEL_COLUMNS);
        for label in &tables.labels {
            let Some(description) = tables.narratives.get(&label.narrative_code) else {
                continue;
            };
            table
                .push_row(vec![
                    Value::String(label.narrative_code.clone()),
                    Value::String(label.annotator.clone()),
                    Value::String(label.text.clone()),
                    Value::String(description.clone()),
                ])
                .map_err(StoreError::query)?;
        }
        Ok(table)
    }
}
