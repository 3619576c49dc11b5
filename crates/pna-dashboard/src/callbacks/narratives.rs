//! Narrative management and tagging
//!
//! The form buttons drive [`NarrativeFormState`], held in a hidden div. The
//! state handler reads its own previous value as a state, which adds no
//! trigger edge. Everything else in the section reacts to the new state.

use super::{text, Services};
use crate::ids;
use crate::markup::{data_table, Style};
use crate::payload::{FormAction, FormEffect, NarrativeFormState};
use anyhow::Context;
use async_trait::async_trait;
use pna_data::Table;
use pna_reactive::{
    CallArgs, CallbackRegistry, CallbackSpec, Handler, Outputs, RegistrationError, Value,
};
use pna_store::{NarrativeLabelRepository, NarrativeRepository};
use serde_json::json;
use std::sync::Arc;

const NARRATIVE_HEADERS: [(&str, &str); 2] = [("code", "Code"), ("description", "Description")];

const LABEL_HEADERS: [(&str, &str); 4] = [
    ("narrative_code", "Code"),
    ("annotator", "Annotator"),
    ("text", "Text"),
    ("description", "Description"),
];

/// Message for a create or delete without a code
pub const MISSING_CODE_MESSAGE: &str = "Enter a narrative code first.";

/// Narratives carried by the state, or the repository's list before the
/// first button press
async fn narratives_for(
    state: &NarrativeFormState,
    repo: &dyn NarrativeRepository,
) -> anyhow::Result<Table> {
    match &state.narratives {
        Some(split) => Ok(Table::try_from(split.clone())?),
        None => Ok(repo.all().await?),
    }
}

/// Applies a form button to the repository and the form state
struct UpdateNarrativeForm {
    narratives: Arc<dyn NarrativeRepository>,
}

#[async_trait]
impl Handler for UpdateNarrativeForm {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        let action = args
            .trigger
            .which_fired()
            .and_then(|fired| FormAction::from_component(&fired.component))
            .context("narrative form updated without a button press")?;
        let code = text(args.state(0)).trim();
        let description = text(args.state(1)).trim();
        let previous = NarrativeFormState::from_value(args.state(2));

        let (phase, effect) = previous.phase.next(action);
        let mut messages = Vec::new();
        let complete = match effect {
            FormEffect::None => false,
            FormEffect::Create | FormEffect::Delete if code.is_empty() => {
                messages.push(MISSING_CODE_MESSAGE.to_string());
                false
            }
            FormEffect::Create => {
                self.narratives.create(code, description).await?;
                tracing::info!(code, "narrative created");
                true
            }
            FormEffect::Delete => {
                self.narratives.delete(code).await?;
                tracing::info!(code, "narrative deleted");
                true
            }
        };

        let state = NarrativeFormState {
            phase,
            last_action: Some(action),
            complete,
            narratives: Some(self.narratives.all().await?.to_split()),
            messages,
        };
        Ok(Outputs::one(state.to_value()))
    }
}

/// Narrative table for the list panel
struct ListNarratives {
    narratives: Arc<dyn NarrativeRepository>,
}

#[async_trait]
impl Handler for ListNarratives {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        let state = NarrativeFormState::from_value(args.input(0));
        let table = narratives_for(&state, self.narratives.as_ref())
            .await?
            .rename(&NARRATIVE_HEADERS);
        Ok(Outputs::one(data_table(&table, None, "", 10).to_value()))
    }
}

/// Narrative codes offered when tagging
struct NarrativeCodeOptions {
    narratives: Arc<dyn NarrativeRepository>,
}

#[async_trait]
impl Handler for NarrativeCodeOptions {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        let state = NarrativeFormState::from_value(args.input(0));
        let table = narratives_for(&state, self.narratives.as_ref()).await?;
        let options: Vec<Value> = table
            .column("code")
            .map(|code| json!({"label": code, "value": code}))
            .collect();
        Ok(Outputs::one(options))
    }
}

/// Stores a label, then ships every label
struct TagNarrative {
    labels: Arc<dyn NarrativeLabelRepository>,
}

#[async_trait]
impl Handler for TagNarrative {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        let annotator = text(args.state(0)).trim();
        let code = text(args.state(1));
        let annotated = text(args.state(2)).trim();
        if annotator.is_empty() || code.is_empty() || annotated.is_empty() {
            tracing::debug!("incomplete tag form ignored");
        } else {
            self.labels.create(code, annotator, annotated).await?;
            tracing::info!(code, annotator, "narrative label created");
        }
        Ok(Outputs::one(self.labels.all().await?.to_split_value()))
    }
}

/// Label table, from `tagged_data` or the repository on page load
struct ShowLabels {
    labels: Arc<dyn NarrativeLabelRepository>,
}

#[async_trait]
impl Handler for ShowLabels {
    async fn call(&self, args: CallArgs) -> anyhow::Result<Outputs> {
        let table = match args.input(0) {
            Value::Null => self.labels.all().await?,
            data => Table::from_split(data)?,
        };
        let table = table.rename(&LABEL_HEADERS);
        Ok(Outputs::one(data_table(&table, None, "", 10).to_value()))
    }
}

fn form_state(args: &CallArgs) -> NarrativeFormState {
    NarrativeFormState::from_value(args.input(0))
}

pub(crate) fn register(
    registry: &mut CallbackRegistry,
    services: &Services,
) -> Result<(), RegistrationError> {
    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_FORM_STATE, "children"))
            .input((ids::DELETE_NARRATIVE_BUTTON, "n_clicks"))
            .input((ids::CONFIRM_DELETE_NARRATIVE, "n_clicks"))
            .input((ids::CANCEL_DELETE_NARRATIVE, "n_clicks"))
            .input((ids::CREATE_NARRATIVE, "n_clicks"))
            .state((ids::NARRATIVE_CODE, "value"))
            .state((ids::NARRATIVE_DESCRIPTION, "value"))
            .state((ids::NARRATIVE_FORM_STATE, "children"))
            .skip_on_initial_load()
            .handle(UpdateNarrativeForm {
                narratives: Arc::clone(&services.narratives),
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::CONFIRM_DELETE_NARRATIVE_CONTROLS, "style"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                let style = Style::floated("none").visible(form_state(&args).is_pending_delete());
                Ok(Outputs::one(style.to_value()))
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_CODE, "disabled"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| Ok(Outputs::one(form_state(&args).is_pending_delete()))),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_LIST, "children"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .handle(ListNarratives {
                narratives: Arc::clone(&services.narratives),
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_CODE, "value"))
            .output((ids::NARRATIVE_DESCRIPTION, "value"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .state((ids::NARRATIVE_CODE, "value"))
            .state((ids::NARRATIVE_DESCRIPTION, "value"))
            .skip_on_initial_load()
            .handle_fn(|args| {
                if form_state(&args).complete {
                    Ok(Outputs::many(["", ""]))
                } else {
                    Ok(Outputs::many([args.state(0).clone(), args.state(1).clone()]))
                }
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_FORM_MESSAGES, "children"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .skip_on_initial_load()
            .handle_fn(|args| Ok(Outputs::one(form_state(&args).messages))),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::NARRATIVE_TAG_CODE, "options"))
            .input((ids::NARRATIVE_FORM_STATE, "children"))
            .handle(NarrativeCodeOptions {
                narratives: Arc::clone(&services.narratives),
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::TAGGED_DATA, "children"))
            .input((ids::TAG_NARRATIVE, "n_clicks"))
            .state((ids::ANNOTATOR, "value"))
            .state((ids::NARRATIVE_TAG_CODE, "value"))
            .state((ids::ANNOTATED_TEXT, "value"))
            .skip_on_initial_load()
            .handle(TagNarrative {
                labels: Arc::clone(&services.labels),
            }),
    )?;

    registry.register(
        CallbackSpec::builder()
            .output((ids::TAGGED_NARRATIVE_EXPLORER_DIV, "children"))
            .input((ids::TAGGED_DATA, "children"))
            .handle(ShowLabels {
                labels: Arc::clone(&services.labels),
            }),
    )?;

    Ok(())
}
