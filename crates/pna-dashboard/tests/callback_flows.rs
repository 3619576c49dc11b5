use pna_dashboard::callbacks::{not_prepared_message, MISSING_CODE_MESSAGE};
use pna_dashboard::ids;
use pna_dashboard::{
    Dashboard, Figure, NarrativeFormPhase, NarrativeFormState, Services, WordVecData,
};
use pna_data::Table;
use pna_reactive::{ComponentModel, Dispatch, PropertyRef, RoundReport, RoundState, Value};
use pna_test_utils::{fixture_corpus, memory_store, KNOWN_ENTITY, SPARSE_ENTITY, UNKNOWN_WORD};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// One browser session against the fixture corpus
struct Page {
    dashboard: Dashboard,
    model: ComponentModel,
}

impl Page {
    fn new() -> Self {
        let store = memory_store();
        let services = Services {
            facade: Arc::new(fixture_corpus()),
            narratives: Arc::new(store.clone()),
            labels: Arc::new(store),
        };
        let dashboard = Dashboard::build(&services).unwrap();
        let model = dashboard.new_model();
        Self { dashboard, model }
    }

    fn get(&self, component: &str, property: &str) -> Value {
        self.model
            .get(&PropertyRef::new(component, property))
            .unwrap()
            .clone()
    }

    fn set(&mut self, component: &str, property: &str, value: impl Into<Value>) {
        self.model
            .set(&PropertyRef::new(component, property), value.into())
            .unwrap();
    }

    async fn load(&mut self) -> RoundReport {
        self.dashboard
            .scheduler()
            .run_round(&mut self.model, Dispatch::InitialLoad)
            .await
            .unwrap()
    }

    async fn click(&mut self, button: &str) -> RoundReport {
        let clicks = self.get(button, "n_clicks").as_u64().unwrap_or(0);
        self.set(button, "n_clicks", clicks + 1);
        self.dashboard
            .scheduler()
            .run_round(&mut self.model, Dispatch::changed((button, "n_clicks")))
            .await
            .unwrap()
    }

    fn display(&self, component: &str) -> Value {
        self.get(component, "style")["display"].clone()
    }

    fn form_state(&self) -> NarrativeFormState {
        NarrativeFormState::from_value(&self.get(ids::NARRATIVE_FORM_STATE, "children"))
    }

    fn narrative_codes(&self) -> Vec<String> {
        let Some(split) = self.form_state().narratives else {
            return Vec::new();
        };
        Table::try_from(split)
            .unwrap()
            .column("code")
            .map(|c| c.as_str().unwrap().to_string())
            .collect()
    }

    async fn create_narrative(&mut self, code: &str, description: &str) -> RoundReport {
        self.set(ids::NARRATIVE_CODE, "value", code);
        self.set(ids::NARRATIVE_DESCRIPTION, "value", description);
        self.click(ids::CREATE_NARRATIVE).await
    }
}

fn table_rows(node: &Value) -> usize {
    node["props"]["data"].as_array().map_or(0, Vec::len)
}

#[tokio::test]
async fn test_initial_load_fills_overview() {
    let mut page = Page::new();
    let report = page.load().await;

    assert_eq!(report.state, RoundState::Committed);
    assert_eq!(table_rows(&page.get(ids::TOP_ENTITIES, "children")), 2);
    assert_eq!(
        page.get(ids::CORPUS_ATTENTION, "figure")["layout"]["title"]["text"],
        json!("Tweet Volume over Time")
    );
    assert_eq!(table_rows(&page.get(ids::NARRATIVE_LIST, "children")), 0);
    assert_eq!(page.get(ids::NARRATIVE_TAG_CODE, "options"), json!([]));
    assert!(page.get(ids::TAGGED_NARRATIVE_EXPLORER_DIV, "children").is_object());

    // selection callbacks wait for the first click
    assert!(report.update(&PropertyRef::new(ids::WORD_VEC_DATA, "children")).is_none());
    assert!(report
        .update(&PropertyRef::new(ids::NARRATIVE_FORM_STATE, "children"))
        .is_none());
}

#[tokio::test]
async fn test_known_entity_shows_analysis() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", KNOWN_ENTITY);
    let report = page.click(ids::UPDATE_WORD_SELECTION).await;

    assert!(report.is_committed());
    assert_eq!(page.get(ids::WORD_SELECTION_ERROR_MESSAGE, "children"), json!(""));

    let data = WordVecData::from_value(&page.get(ids::WORD_VEC_DATA, "children")).unwrap();
    assert_eq!(Table::try_from(data.neighbours).unwrap().len(), 3);
    assert_eq!(Table::try_from(data.liwc_freqs).unwrap().len(), 2);
    let attention = Table::try_from(data.entity_attention).unwrap();
    let dates: Vec<&Value> = attention.column("Date").collect();
    assert_eq!(dates, [&json!("2020-06-01"), &json!("2020-06-03")]);

    for styled in [
        ids::ENTITY_ATTENTION_WRAPPER,
        ids::ENTITY_LIWC_PLOT_DIV,
        ids::WORD_VEC_PLOT_DIV,
        ids::SENTENCE_SELECTOR_FORM,
    ] {
        assert_eq!(page.display(styled), json!("block"), "{styled}");
    }
    assert_ne!(page.get(ids::WORD_VEC_PLOT, "figure"), Figure::empty().to_value());
}

#[tokio::test]
async fn test_unknown_word_reports_and_hides() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", UNKNOWN_WORD);
    let report = page.click(ids::UPDATE_WORD_SELECTION).await;

    assert!(report.is_committed());
    assert_eq!(
        page.get(ids::WORD_SELECTION_ERROR_MESSAGE, "children"),
        json!(not_prepared_message(UNKNOWN_WORD))
    );
    assert_eq!(page.get(ids::WORD_VEC_DATA, "children"), Value::Null);
    assert_eq!(page.get(ids::ENTITY_LIWC_PLOT, "figure"), Figure::empty().to_value());
    assert_eq!(page.display(ids::WORD_VEC_PLOT_DIV), json!("none"));
    assert_eq!(page.display(ids::SENTENCE_SELECTOR_FORM), json!("none"));
}

#[tokio::test]
async fn test_word_without_scores_gets_empty_tables() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", SPARSE_ENTITY);
    let report = page.click(ids::UPDATE_WORD_SELECTION).await;

    assert!(report.is_committed());
    let data = WordVecData::from_value(&page.get(ids::WORD_VEC_DATA, "children")).unwrap();
    assert_eq!(Table::try_from(data.neighbours).unwrap().len(), 2);
    assert!(Table::try_from(data.liwc_freqs).unwrap().is_empty());
    assert!(Table::try_from(data.entity_attention).unwrap().is_empty());
    assert_eq!(page.display(ids::ENTITY_ATTENTION_WRAPPER), json!("block"));
}

#[tokio::test]
async fn test_reselecting_unknown_word_hides_previous_results() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", KNOWN_ENTITY);
    page.click(ids::UPDATE_WORD_SELECTION).await;
    assert_eq!(page.display(ids::WORD_VEC_PLOT_DIV), json!("block"));

    page.set(ids::WORD_FOR_VECTORS, "value", UNKNOWN_WORD);
    page.click(ids::UPDATE_WORD_SELECTION).await;
    assert_eq!(page.display(ids::WORD_VEC_PLOT_DIV), json!("none"));
    assert_eq!(page.get(ids::WORD_VEC_DATA, "children"), Value::Null);
}

#[tokio::test]
async fn test_find_sentences_filters_by_keyword() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", KNOWN_ENTITY);
    page.set(ids::KEYWORDS_FOR_SENTENCES, "value", " MASKS ");
    let report = page.click(ids::FIND_SENTENCES).await;

    assert!(report.is_committed());
    assert_eq!(page.display(ids::SENTENCES_WRAPPER), json!("block"));
    let found = Table::from_split(&page.get(ids::SENTENCE_DATA, "children")).unwrap();
    assert_eq!(found.len(), 1);
    let div = page.get(ids::SENTENCES_DIV, "children");
    assert_eq!(div["props"]["id"], json!(ids::SENTENCES_TABLE));
    assert_eq!(table_rows(&div), 1);

    page.set(ids::KEYWORDS_FOR_SENTENCES, "value", "");
    page.click(ids::FIND_SENTENCES).await;
    let all = Table::from_split(&page.get(ids::SENTENCE_DATA, "children")).unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_find_sentences_for_unknown_word_is_empty() {
    let mut page = Page::new();
    page.load().await;
    page.set(ids::WORD_FOR_VECTORS, "value", UNKNOWN_WORD);
    let report = page.click(ids::FIND_SENTENCES).await;

    assert!(report.is_committed());
    let found = Table::from_split(&page.get(ids::SENTENCE_DATA, "children")).unwrap();
    assert!(found.is_empty());
    assert_eq!(table_rows(&page.get(ids::SENTENCES_DIV, "children")), 0);
}

#[tokio::test]
async fn test_create_narrative_resets_form() {
    let mut page = Page::new();
    page.load().await;
    let report = page.create_narrative("n1", "Vaccine diplomacy").await;

    assert!(report.is_committed());
    let state = page.form_state();
    assert!(state.complete);
    assert!(state.messages.is_empty());
    assert_eq!(page.narrative_codes(), ["n1"]);
    assert_eq!(page.get(ids::NARRATIVE_CODE, "value"), json!(""));
    assert_eq!(page.get(ids::NARRATIVE_DESCRIPTION, "value"), json!(""));
    assert_eq!(table_rows(&page.get(ids::NARRATIVE_LIST, "children")), 1);
    assert_eq!(
        page.get(ids::NARRATIVE_TAG_CODE, "options"),
        json!([{"label": "n1", "value": "n1"}])
    );
}

#[tokio::test]
async fn test_create_existing_code_keeps_one_narrative() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("n1", "first").await;
    page.create_narrative("n1", "second").await;

    assert_eq!(page.narrative_codes(), ["n1"]);
    let list = page.get(ids::NARRATIVE_LIST, "children");
    assert_eq!(list["props"]["data"][0]["Description"], json!("first"));
}

#[tokio::test]
async fn test_create_without_code_shows_message() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("  ", "orphan description").await;

    let state = page.form_state();
    assert!(!state.complete);
    assert_eq!(state.messages, [MISSING_CODE_MESSAGE]);
    assert!(page.narrative_codes().is_empty());
    assert_eq!(
        page.get(ids::NARRATIVE_FORM_MESSAGES, "children"),
        json!([MISSING_CODE_MESSAGE])
    );
    // incomplete forms keep what was typed
    assert_eq!(
        page.get(ids::NARRATIVE_DESCRIPTION, "value"),
        json!("orphan description")
    );
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("n4", "to be removed").await;
    page.set(ids::NARRATIVE_CODE, "value", "n4");

    page.click(ids::DELETE_NARRATIVE_BUTTON).await;
    assert_eq!(page.form_state().phase, NarrativeFormPhase::PendingDelete);
    assert_eq!(page.display(ids::CONFIRM_DELETE_NARRATIVE_CONTROLS), json!("block"));
    assert_eq!(page.get(ids::NARRATIVE_CODE, "disabled"), json!(true));
    assert_eq!(page.get(ids::NARRATIVE_CODE, "value"), json!("n4"));
    assert_eq!(page.narrative_codes(), ["n4"]);

    let report = page.click(ids::CONFIRM_DELETE_NARRATIVE).await;
    assert!(report.is_committed());
    let state = page.form_state();
    assert_eq!(state.phase, NarrativeFormPhase::Idle);
    assert!(state.complete);
    assert!(page.narrative_codes().is_empty());
    assert_eq!(page.display(ids::CONFIRM_DELETE_NARRATIVE_CONTROLS), json!("none"));
    assert_eq!(page.get(ids::NARRATIVE_CODE, "disabled"), json!(false));
    assert_eq!(page.get(ids::NARRATIVE_CODE, "value"), json!(""));
}

#[tokio::test]
async fn test_cancel_delete_keeps_narrative() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("n2", "kept").await;
    page.set(ids::NARRATIVE_CODE, "value", "n2");

    page.click(ids::DELETE_NARRATIVE_BUTTON).await;
    page.click(ids::CANCEL_DELETE_NARRATIVE).await;

    let state = page.form_state();
    assert_eq!(state.phase, NarrativeFormPhase::Idle);
    assert!(!state.complete);
    assert_eq!(page.narrative_codes(), ["n2"]);
    assert_eq!(page.get(ids::NARRATIVE_CODE, "disabled"), json!(false));
}

#[tokio::test]
async fn test_confirm_without_pending_delete_is_ignored() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("n3", "safe").await;
    page.set(ids::NARRATIVE_CODE, "value", "n3");

    page.click(ids::CONFIRM_DELETE_NARRATIVE).await;
    assert_eq!(page.narrative_codes(), ["n3"]);
}

#[tokio::test]
async fn test_tagging_lists_labels() {
    let mut page = Page::new();
    page.load().await;
    page.create_narrative("n1", "Vaccine diplomacy").await;

    page.set(ids::ANNOTATOR, "value", "ana");
    page.set(ids::NARRATIVE_TAG_CODE, "value", "n1");
    page.set(ids::ANNOTATED_TEXT, "value", "China donates masks to Manila");
    let report = page.click(ids::TAG_NARRATIVE).await;

    assert!(report.is_committed());
    let labels = Table::from_split(&page.get(ids::TAGGED_DATA, "children")).unwrap();
    assert_eq!(labels.len(), 1);
    let explorer = page.get(ids::TAGGED_NARRATIVE_EXPLORER_DIV, "children");
    assert_eq!(explorer["props"]["data"][0]["Annotator"], json!("ana"));
    assert_eq!(explorer["props"]["data"][0]["Description"], json!("Vaccine diplomacy"));

    // an incomplete form stores nothing
    page.set(ids::ANNOTATOR, "value", "");
    page.click(ids::TAG_NARRATIVE).await;
    let labels = Table::from_split(&page.get(ids::TAGGED_DATA, "children")).unwrap();
    assert_eq!(labels.len(), 1);
}

#[tokio::test]
async fn test_tag_failure_blocks_label_table() {
    let mut page = Page::new();
    page.load().await;
    let before = page.get(ids::TAGGED_NARRATIVE_EXPLORER_DIV, "children");

    page.set(ids::ANNOTATOR, "value", "ana");
    page.set(ids::NARRATIVE_TAG_CODE, "value", "missing");
    page.set(ids::ANNOTATED_TEXT, "value", "some text");
    let report = page.click(ids::TAG_NARRATIVE).await;

    assert_eq!(report.state, RoundState::Failed);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.blocked().len(), 1);
    assert_eq!(page.get(ids::TAGGED_NARRATIVE_EXPLORER_DIV, "children"), before);
}

#[tokio::test]
async fn test_sessions_do_not_share_components() {
    let mut first = Page::new();
    let mut second = first.dashboard.new_model();

    first.set(ids::WORD_FOR_VECTORS, "value", KNOWN_ENTITY);
    first.click(ids::UPDATE_WORD_SELECTION).await;

    assert_eq!(
        second
            .get(&PropertyRef::new(ids::WORD_VEC_DATA, "children"))
            .unwrap(),
        &Value::Null
    );
    second
        .set(&PropertyRef::new(ids::WORD_FOR_VECTORS, "value"), json!(UNKNOWN_WORD))
        .unwrap();
    assert_ne!(first.get(ids::WORD_FOR_VECTORS, "value"), json!(UNKNOWN_WORD));
}
