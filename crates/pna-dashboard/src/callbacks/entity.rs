//! Entity analysis: word selection, word-vector payload and its plots
//!
//! Pressing "Update" validates the word first. The payload fetch triggers on
//! the validation message rather than the button, so it always sees the
//! message of the same round.

use super::{text, Services};
use crate::figure::Figure;
use crate::ids;
use crate::markup::Style;
use crate::payload::WordVecData;
use async_trait::async_trait;
use pna_data::{DataFacade, FacadeError, SplitTable, Table};
use pna_reactive::{
    CallArgs, CallbackRegistry, CallbackSpec, Handler, Outputs, RegistrationError, Value,
};
use std::sync::Arc;

/// Message shown for a word without word vectors
#[must_use]
pub fn not_prepared_message(word: &str) -> String {
    format!(
        "\"{word}\" not prepared for analysis - please choose another word from the entity list."
    )
}

/// Builds [`WordVecData`] for the selected word
///
/// Category and attention lookups for a word that has vectors but no rows in
/// those artifacts yield empty tables; any other failure fails the handler.
struct FetchWordVecData {
    facade: Arc<dyn DataFacade>,
}

impl FetchWordVecData {
    fn or_empty(
        result: Result<Table, FacadeError>,
        columns: [&str; 3],
    ) -> Result<Table, FacadeError> {
        match result {
            Err(e) if e.is_unknown_entity() => Ok(Table::new(columns)),
            other => other,
        }
    }
}

#[async_trait]
impl Handler for FetchWordVecData {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        if !text(args.input(0)).is_empty() {
            return Ok(Outputs::one(Value::Null));
        }
        let word = text(args.state(0));
        let neighbours = self.facade.vector_neighbourhood(word)?;
        let liwc = Self::or_empty(
            self.facade.liwc_profile(word),
            ["Entity", "Category", "NPMI"],
        )?;
        let attention = Self::or_empty(
            self.facade.entity_counts_over_time(word),
            ["Entity", "Date", "Count"],
        )?;
        tracing::debug!(
            word,
            neighbours = neighbours.len(),
            categories = liwc.len(),
            days = attention.len(),
            "word vector data fetched"
        );
        Ok(Outputs::one(WordVecData::new(&neighbours, &liwc, &attention).to_value()))
    }
}

/// One table of the payload as a figure, or an empty figure without a payload
fn plot<P, F>(args: &CallArgs, pick: P, draw: F) -> anyhow::Result<Outputs>
where
    P: Fn(WordVecData) -> SplitTable,
    F: Fn(&Table, &str) -> Figure,
{
    let figure = match WordVecData::from_value(args.input(0)) {
        Some(data) => draw(&Table::try_from(pick(data))?, text(args.state(0))),
        None => Figure::empty(),
    };
    Ok(Outputs::one(figure.to_value()))
}

fn has_payload(args: &CallArgs) -> bool {
    WordVecData::from_value(args.input(0)).is_some()
}

pub(crate) fn register(
    registry: &mut CallbackRegistry,
    services: &Services,
) -> Result<(), RegistrationError> {
    let facade = Arc::clone(&services.facade);
    registry.register(
        CallbackSpec::builder()
            .output((ids::WORD_SELECTION_ERROR_MESSAGE, "children"))
            .input((ids::UPDATE_WORD_SELECTION, "n_clicks"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle_fn(move |args| {
                let word = text(args.state(0));
                let message = if facade.in_vocab(word) {
                    String::new()
                } else {
                    not_prepared_message(word)
                };
                Ok(Outputs::one(message))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::WORD_VEC_DATA, "children"))
            .input((ids::WORD_SELECTION_ERROR_MESSAGE, "children"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle(FetchWordVecData {
                facade: Arc::clone(&services.facade),
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::ENTITY_ATTENTION, "figure"))
            .input((ids::WORD_VEC_DATA, "children"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                plot(
                    &args,
                    |data| data.entity_attention,
                    |table, entity| {
                        Figure::bar(table, "Date", "Count", None)
                            .title(format!("Attention to {entity}"))
                    },
                )
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::ENTITY_ATTENTION_WRAPPER, "style"))
            .input((ids::WORD_VEC_DATA, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                Ok(Outputs::one(Style::new().visible(has_payload(&args)).to_value()))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::WORD_VEC_PLOT, "figure"))
            .input((ids::WORD_VEC_DATA, "children"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                plot(
                    &args,
                    |data| data.neighbours,
                    |table, entity| {
                        Figure::scatter_text(table, "PC1", "PC2", "token")
                            .height(1000)
                            .width(1600)
                            .title(format!("Words similar to {entity}"))
                    },
                )
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::ENTITY_LIWC_PLOT, "figure"))
            .input((ids::WORD_VEC_DATA, "children"))
            .state((ids::WORD_FOR_VECTORS, "value"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                plot(
                    &args,
                    |data| data.liwc_freqs,
                    |table, word| {
                        Figure::hbar(table, "NPMI", "Category")
                            .height(550)
                            .title(format!("Types of words around {word}"))
                    },
                )
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::ENTITY_LIWC_PLOT_DIV, "style"))
            .input((ids::WORD_VEC_DATA, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                Ok(Outputs::one(Style::new().visible(has_payload(&args)).to_value()))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::WORD_VEC_PLOT_DIV, "style"))
            .input((ids::WORD_VEC_DATA, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                let style = Style::floated("both").visible(has_payload(&args));
                Ok(Outputs::one(style.to_value()))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::SENTENCE_SELECTOR_FORM, "style"))
            .input((ids::WORD_VEC_DATA, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                let style = Style::floated("both").visible(has_payload(&args));
                Ok(Outputs::one(style.to_value()))
            }),
    )?;

    Ok(())
}
