//! Testing utilities for the PNA workspace
//!
//! Shared fixtures: a small in-memory corpus and in-memory repositories.

#![allow(missing_docs)]

use indexmap::IndexMap;
use pna_data::{CorpusParts, PhilippinesEmbassyCorpus, Table};
use pna_store::InMemoryStore;
use serde_json::{json, Map, Value};

/// Word with vectors, category scores, attention and documents
pub const KNOWN_ENTITY: &str = "China";

/// Word with vectors but no category scores, attention or documents
pub const SPARSE_ENTITY: &str = "vaccine";

/// Word the corpus knows nothing about
pub const UNKNOWN_WORD: &str = "zzyzx";

pub fn table<const N: usize>(columns: [&str; N], rows: Vec<[Value; N]>) -> Table {
    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.to_vec()).unwrap();
    }
    table
}

fn document(id: u64, date: &str, likes: u64, retweets: u64, sentence: &str) -> Map<String, Value> {
    let Value::Object(record) = json!({
        "id": id,
        "date": date,
        "likes": likes,
        "retweets": retweets,
        "Sentence": sentence,
    }) else {
        unreachable!()
    };
    record
}

pub fn fixture_parts() -> CorpusParts {
    let mut entity_to_sents = IndexMap::new();
    entity_to_sents.insert(
        KNOWN_ENTITY.to_string(),
        vec![
            document(11, "2020-06-02T08:00:00", 5, 1, "China donates masks to Manila"),
            document(12, "2020-06-01T09:30:00", 2, 0, "Friendship with China grows"),
            document(13, "2020-06-03T10:00:00", 9, 4, "Vaccines from China arrive"),
        ],
    );

    let mut neighbours = IndexMap::new();
    neighbours.insert(
        KNOWN_ENTITY.to_string(),
        vec!["Beijing".to_string(), "masks".to_string()],
    );
    neighbours.insert(SPARSE_ENTITY.to_string(), vec!["masks".to_string()]);

    CorpusParts {
        entity_counts: table(
            ["entity", "count"],
            vec![[json!("China"), json!(120)], [json!("Duterte"), json!(45)]],
        ),
        npmis: table(
            ["entity", "cat", "npmi"],
            vec![
                [json!("China"), json!("posemo"), json!(0.31)],
                [json!("China"), json!("negemo"), json!(-0.12)],
            ],
        ),
        entity_to_sents,
        entity_attention: table(
            ["entity", "date", "count"],
            vec![
                [json!("China"), json!("2020-06-03"), json!(4)],
                [json!("China"), json!("2020-06-01"), json!(9)],
            ],
        ),
        volume: table(
            ["date", "tweet"],
            vec![[json!("2020-06-01"), json!(30)], [json!("2020-06-02"), json!(12)]],
        ),
        pca: table(
            ["token", "pc1", "pc2"],
            vec![
                [json!("China"), json!(0.1), json!(0.2)],
                [json!("Beijing"), json!(0.15), json!(0.22)],
                [json!("vaccine"), json!(-0.4), json!(0.9)],
                [json!("masks"), json!(0.3), json!(-0.1)],
            ],
        ),
        neighbours,
        liwc_time: table(
            ["date", "cat", "count", "freq", "n"],
            vec![
                [json!("2020-06-01"), json!("posemo"), json!(3), json!(0.1), json!(30)],
                [json!("2020-06-01"), json!("negemo"), json!(1), json!(0.03), json!(30)],
            ],
        ),
    }
}

pub fn fixture_corpus() -> PhilippinesEmbassyCorpus {
    PhilippinesEmbassyCorpus::from_parts(fixture_parts())
}

pub fn memory_store() -> InMemoryStore {
    InMemoryStore::new()
}
