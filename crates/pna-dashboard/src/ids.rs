//! Component ids referenced by callbacks

#![allow(missing_docs)]

// corpus
pub const DOCUMENT_SET: &str = "document_set";
pub const INITIALIZE: &str = "initialize";
pub const TOP_ENTITIES: &str = "top_entities";
pub const CORPUS_ATTENTION: &str = "corpus_attention";
pub const LIWC_OVER_TIME: &str = "liwc_over_time";

// entity analysis
pub const WORD_FOR_VECTORS: &str = "word_for_vectors";
pub const UPDATE_WORD_SELECTION: &str = "update_word_selection";
pub const WORD_SELECTION_ERROR_MESSAGE: &str = "word_selection_error_message";
pub const WORD_VEC_DATA: &str = "word_vec_data";
pub const ENTITY_ATTENTION: &str = "entity_attention";
pub const ENTITY_ATTENTION_WRAPPER: &str = "entity_attention_wrapper";
pub const ENTITY_LIWC_PLOT: &str = "entity_liwc_plot";
pub const ENTITY_LIWC_PLOT_DIV: &str = "entity_liwc_plot_div";
pub const WORD_VEC_PLOT: &str = "word_vec_plot";
pub const WORD_VEC_PLOT_DIV: &str = "word_vec_plot_div";

// sentences
pub const SENTENCE_SELECTOR_FORM: &str = "sentence_selector_form";
pub const KEYWORDS_FOR_SENTENCES: &str = "keywords_for_sentences";
pub const FIND_SENTENCES: &str = "find_sentences";
pub const SENTENCES_WRAPPER: &str = "sentences_wrapper";
pub const SENTENCE_DATA: &str = "sentence_data";
pub const SENTENCES_DIV: &str = "sentences_div";
pub const SENTENCES_TABLE: &str = "sentences_table";

// narratives
pub const NARRATIVE_FORM_STATE: &str = "narrative_form_state";
pub const NARRATIVE_CODE: &str = "narrative_code";
pub const NARRATIVE_DESCRIPTION: &str = "narrative_description";
pub const DELETE_NARRATIVE_BUTTON: &str = "delete_narrative_button";
pub const CONFIRM_DELETE_NARRATIVE_CONTROLS: &str = "confirm_delete_narrative_controls";
pub const CONFIRM_DELETE_NARRATIVE: &str = "confirm_delete_narrative";
pub const CANCEL_DELETE_NARRATIVE: &str = "cancel_delete_narrative";
pub const CREATE_NARRATIVE: &str = "create_narrative";
pub const NARRATIVE_FORM_MESSAGES: &str = "narrative_form_messages";
pub const NARRATIVE_LIST: &str = "narrative_list";

// tagging
pub const ANNOTATOR: &str = "annotator";
pub const ANNOTATED_TEXT: &str = "annotated_text";
pub const NARRATIVE_TAG_CODE: &str = "narrative_tag_code";
pub const TAG_NARRATIVE: &str = "tag_narrative";
pub const TAGGED_DATA: &str = "tagged_data";
pub const TAGGED_NARRATIVE_EXPLORER_DIV: &str = "tagged_narrative_explorer_div";
