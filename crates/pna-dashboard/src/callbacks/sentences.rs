//! Tweet explorer: keyword search over the selected entity's documents

use super::{text, Services};
use crate::ids;
use crate::layout::sentences_table;
use crate::markup::Style;
use pna_data::Table;
use pna_reactive::{CallbackRegistry, CallbackSpec, Outputs, RegistrationError};
use std::sync::Arc;

const SENTENCE_COLUMNS: [&str; 5] = ["Date", "Likes", "Retweets", "Sentence", "Url"];

/// Rows whose `Sentence` contains any of the comma-separated keywords
///
/// Matching ignores case and surrounding whitespace. Blank keywords are
/// ignored; with none left every row is kept.
#[must_use]
pub fn filter_by_keywords(table: &Table, keywords: &str) -> Table {
    let keywords: Vec<String> = keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return table.clone();
    }
    table.filter(|row| {
        let sentence = row.get_str("Sentence").unwrap_or_default().to_lowercase();
        keywords.iter().any(|k| sentence.contains(k.as_str()))
    })
}

pub(crate) fn register(
    registry: &mut CallbackRegistry,
    services: &Services,
) -> Result<(), RegistrationError> {
    registry.register(
        CallbackSpec::builder()
            .output((ids::SENTENCES_WRAPPER, "style"))
            .input((ids::FIND_SENTENCES, "n_clicks"))
            .skip_on_initial_load()
            .handle_fn(|_| Ok(Outputs::one(Style::floated("both").visible(true).to_value()))),
    )?;

    let facade = Arc::clone(&services.facade);
    registry.register(
        CallbackSpec::builder()
            .output((ids::SENTENCE_DATA, "children"))
            .input((ids::FIND_SENTENCES, "n_clicks"))
            .state((ids::KEYWORDS_FOR_SENTENCES, "value"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle_fn(move |args| {
                let entity = text(args.state(1));
                let sentences = match facade.sentences(entity) {
                    Err(e) if e.is_unknown_entity() => Table::new(SENTENCE_COLUMNS),
                    other => other?,
                };
                let found = filter_by_keywords(&sentences, text(args.state(0)));
                tracing::debug!(entity, found = found.len(), "sentences selected");
                Ok(Outputs::one(found.to_split_value()))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::SENTENCES_DIV, "children"))
            .input((ids::SENTENCE_DATA, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                let table = Table::from_split(args.input(0))?;
                Ok(Outputs::one(sentences_table(&table).to_value()))
            }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sentences() -> Table {
        let mut t = Table::new(["Sentence"]);
        for s in ["China sends MASKS", "Vaccines arrive", "Friendship grows"] {
            t.push_row(vec![json!(s)]).unwrap();
        }
        t
    }

    fn kept(keywords: &str) -> Vec<String> {
        filter_by_keywords(&sentences(), keywords)
            .column("Sentence")
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn keywords_are_trimmed_and_case_insensitive() {
        assert_eq!(kept("masks"), ["China sends MASKS"]);
        assert_eq!(kept(" vaccines , FRIEND"), ["Vaccines arrive", "Friendship grows"]);
    }

    #[test]
    fn blank_keywords_keep_everything() {
        assert_eq!(kept("").len(), 3);
        assert_eq!(kept(" , ").len(), 3);
        assert!(kept("zzyzx").is_empty());
    }
}
