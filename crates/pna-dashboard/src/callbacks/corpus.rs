//! Corpus overview: entity table, document volume and category frequencies
//!
//! All three fire on the hidden `initialize` button, so they run on page load
//! and never again.

use super::Services;
use crate::figure::Figure;
use crate::ids;
use crate::markup::data_table;
use pna_reactive::{CallbackRegistry, CallbackSpec, Outputs, RegistrationError};
use std::sync::Arc;

pub(crate) fn register(
    registry: &mut CallbackRegistry,
    services: &Services,
) -> Result<(), RegistrationError> {
    let facade = Arc::clone(&services.facade);
    registry.register(
        CallbackSpec::builder()
            .output((ids::TOP_ENTITIES, "children"))
            .input((ids::INITIALIZE, "n_clicks"))
            .handle_fn(move |_| {
                let entities = facade.entity_counts()?;
                Ok(Outputs::one(data_table(&entities, None, "", 15).to_value()))
            }),
    )?;

    let facade = Arc::clone(&services.facade);
    registry.register(
        CallbackSpec::builder()
            .output((ids::CORPUS_ATTENTION, "figure"))
            .input((ids::INITIALIZE, "n_clicks"))
            .handle_fn(move |_| {
                let volume = facade.corpus_volume_over_time()?;
                let figure =
                    Figure::bar(&volume, "Date", "Count", None).title("Tweet Volume over Time");
                Ok(Outputs::one(figure.to_value()))
            }),
    )?;

    let facade = Arc::clone(&services.facade);
    registry.register(
        CallbackSpec::builder()
            .output((ids::LIWC_OVER_TIME, "figure"))
            .input((ids::INITIALIZE, "n_clicks"))
            .handle_fn(move |_| {
                let liwc = facade.liwc_over_time()?;
                let figure = Figure::bar(&liwc, "Date", "Frequency", Some("Category"))
                    .title("Types of words over time");
                Ok(Outputs::one(figure.to_value()))
            }),
    )?;

    Ok(())
}
