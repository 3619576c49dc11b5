//! Page markup
//!
//! The initial component tree served at `_dash-layout`. Everything a
//! callback reads or writes has an id here, so the derived [`Layout`] is what
//! the callback graph validates against.

use crate::ids;
use crate::markup::{
    button, data_table, hidden_div, in_a_line, in_a_row, radio, Arrangement, Node, Style,
};
use crate::payload::NarrativeFormState;
use pna_data::Table;
use pna_reactive::Layout;
use serde_json::{json, Value};

/// Document sets offered by the selector
pub const DOCUMENT_SETS: [&str; 1] = ["Phillipines Embassy (en)"];

/// Columns shown in the sentence table
pub const SENTENCE_COLUMNS: [&str; 4] = ["Date", "Url", "Likes", "Retweets"];

fn h2(text: &str, clear: &str) -> Node {
    Node::heading(2, text, Style::floated(clear))
}

fn h3(text: &str) -> Node {
    Node::heading(3, text, Style::floated("both"))
}

fn wrapper(id: &str, child: Node) -> Node {
    Node::div()
        .id(id)
        .style(Style::floated("none").width("40%").height("100%").margin("2%"))
        .child(child)
}

fn corpus_section() -> Vec<Node> {
    vec![
        h2("Corpus", "all"),
        radio(
            "Document Set:",
            ids::DOCUMENT_SET,
            &DOCUMENT_SETS,
            Some(DOCUMENT_SETS[0]),
        ),
        button(ids::INITIALIZE, "Initialize", Some(Style::hidden())),
        Node::div()
            .id("entities_and_liwc")
            .style(Style::floated("both").width("100%"))
            .children([
                Node::div()
                    .id("top_entities_wrapper")
                    .style(Style::new().float("left").width("40%").margin("2%"))
                    .child(Node::div().id(ids::TOP_ENTITIES)),
                wrapper("corpus_volume_wrapper", Node::graph(ids::CORPUS_ATTENTION)),
            ]),
        Node::div()
            .id("liwc_over_time_wrapper")
            .style(Style::floated("both").width("100%"))
            .child(Node::graph(ids::LIWC_OVER_TIME)),
    ]
}

fn entity_section() -> Vec<Node> {
    let controls = Node::div()
        .id("word_selection_controls")
        .style(Style::floated("both").width("100%"))
        .child(in_a_line(
            vec![
                in_a_row(
                    vec![
                        Node::span("Choose an entity from the above list:"),
                        Node::text_input(ids::WORD_FOR_VECTORS),
                        button(ids::UPDATE_WORD_SELECTION, "Update", None),
                    ],
                    &Arrangement::default(),
                ),
                Node::div().id(ids::WORD_SELECTION_ERROR_MESSAGE).prop("children", ""),
            ],
            &Arrangement::default(),
        ));

    vec![
        h2("Entity Analysis", "both"),
        controls,
        wrapper(
            "entity_attention_plot_wrapper",
            Node::div()
                .id(ids::ENTITY_ATTENTION_WRAPPER)
                .style(Style::hidden())
                .child(Node::graph(ids::ENTITY_ATTENTION)),
        ),
        wrapper(
            "entity_liwc_plot_wrapper",
            Node::div()
                .id(ids::ENTITY_LIWC_PLOT_DIV)
                .style(Style::hidden())
                .child(Node::graph(ids::ENTITY_LIWC_PLOT)),
        ),
        hidden_div(ids::WORD_VEC_DATA, Value::Null),
        Node::div()
            .id(ids::WORD_VEC_PLOT_DIV)
            .style(Style::floated("both").display("none"))
            .child(Node::graph(ids::WORD_VEC_PLOT)),
    ]
}

/// Sentence table for `table`, restricted to the displayed columns
#[must_use]
pub fn sentences_table(table: &Table) -> Node {
    data_table(table, Some(&SENTENCE_COLUMNS), ids::SENTENCES_TABLE, 10)
}

fn sentence_section() -> Vec<Node> {
    let selector = in_a_row(
        vec![
            Node::span("View sentences containing words (separate with ,):"),
            Node::text_input(ids::KEYWORDS_FOR_SENTENCES),
            button(ids::FIND_SENTENCES, "Find Sentences", None),
        ],
        &Arrangement::default()
            .id(ids::SENTENCE_SELECTOR_FORM)
            .style(Style::new().width("100%").display("none")),
    );

    let sentences = Node::div()
        .id(ids::SENTENCES_WRAPPER)
        .style(Style::hidden())
        .children([
            hidden_div(ids::SENTENCE_DATA, Value::Null),
            Node::div()
                .id(ids::SENTENCES_DIV)
                .child(sentences_table(&Table::new(SENTENCE_COLUMNS))),
        ]);

    let context = in_a_line(
        vec![
            Node::heading(4, "", Style::new()),
            Node::core("Link")
                .prop("href", "")
                .prop("target", "_blank")
                .prop("children", json!([""])),
            Node::div().id("paragraph_text").prop("children", json!([""])),
        ],
        &Arrangement::default(),
    );

    vec![
        h2("Narrative Analysis", "both"),
        h3("Tweet Explorer"),
        selector,
        in_a_row(
            vec![
                sentences,
                Node::div().id("sentence_context_wrapper").child(context),
            ],
            &Arrangement::default()
                .width("80%")
                .style(Style::new().clear("both")),
        ),
    ]
}

fn create_narrative_form() -> Node {
    let confirm_controls = hidden_div(ids::CONFIRM_DELETE_NARRATIVE_CONTROLS, Value::Null).child(
        in_a_row(
            vec![
                button(ids::CONFIRM_DELETE_NARRATIVE, "Confirm Delete", None),
                button(ids::CANCEL_DELETE_NARRATIVE, "Cancel Delete", None),
            ],
            &Arrangement::default(),
        ),
    );

    Node::div().id("narrative_form").children([
        hidden_div(
            ids::NARRATIVE_FORM_STATE,
            NarrativeFormState::initial().to_value(),
        ),
        in_a_line(
            vec![
                in_a_row(
                    vec![
                        Node::span("Pick a Short Code (6 letters):"),
                        Node::text_input(ids::NARRATIVE_CODE),
                        button(ids::DELETE_NARRATIVE_BUTTON, "Delete", None),
                        confirm_controls,
                    ],
                    &Arrangement::default(),
                ),
                Node::span("Description:"),
                Node::text_input(ids::NARRATIVE_DESCRIPTION)
                    .prop("style", json!({"width": "300px"})),
                button(ids::CREATE_NARRATIVE, "Create Narrative", None),
                Node::div()
                    .id(ids::NARRATIVE_FORM_MESSAGES)
                    .prop("style", json!({"color": "red"})),
            ],
            &Arrangement::default(),
        ),
    ])
}

fn tag_narrative_form() -> Node {
    Node::div().id("tag_narrative_form").child(in_a_line(
        vec![
            in_a_row(
                vec![
                    Node::span("Annotator (your name):"),
                    Node::text_input(ids::ANNOTATOR),
                ],
                &Arrangement::default(),
            ),
            in_a_row(
                vec![
                    Node::span("Text:"),
                    Node::text_input(ids::ANNOTATED_TEXT).prop("style", json!({"width": "800px"})),
                ],
                &Arrangement::default(),
            ),
            in_a_row(
                vec![
                    Node::span("with narrative code:"),
                    Node::core("Dropdown")
                        .id(ids::NARRATIVE_TAG_CODE)
                        .prop("options", json!([]))
                        .prop("value", "")
                        .prop("style", json!({"width": "150px"})),
                ],
                &Arrangement::default(),
            ),
            button(ids::TAG_NARRATIVE, "Tag Narrative", None),
        ],
        &Arrangement::default(),
    ))
}

fn narrative_section() -> Vec<Node> {
    let manage = in_a_line(
        vec![
            h3("Manage Narratives List"),
            Node::div()
                .id("narratives_left_panel")
                .style(Style::new().float("left").width("40%").margin("2%"))
                .child(Node::div().id(ids::NARRATIVE_LIST)),
            Node::div()
                .id("narratives_right_panel")
                .style(Style::floated("none").width("40%").margin("2%"))
                .child(create_narrative_form()),
        ],
        &Arrangement::default(),
    );
    let tag = in_a_line(
        vec![
            h3("Tag Narratives"),
            Node::div().id(ids::TAGGED_NARRATIVE_EXPLORER_DIV),
            tag_narrative_form(),
        ],
        &Arrangement::default(),
    );

    vec![
        Node::div()
            .id("narratives_div")
            .style(Style::floated("both").width("100%"))
            .child(in_a_row(vec![manage, tag], &Arrangement::default())),
        hidden_div(ids::TAGGED_DATA, Value::Null),
    ]
}

/// The whole page
#[must_use]
pub fn page() -> Node {
    Node::div().children(
        corpus_section()
            .into_iter()
            .chain(entity_section())
            .chain(sentence_section())
            .chain(narrative_section()),
    )
}

/// Layout derived from [`page`]
#[must_use]
pub fn page_layout() -> Layout {
    page().to_layout()
}
