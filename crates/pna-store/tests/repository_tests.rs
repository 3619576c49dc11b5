use pna_data::Table;
use pna_store::{
    InMemoryStore, NarrativeLabelRepository, NarrativeRepository, PgSettings, PgStore, StoreError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn codes(table: &Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn memory() -> (Arc<dyn NarrativeRepository>, Arc<dyn NarrativeLabelRepository>) {
    let store = InMemoryStore::new();
    (Arc::new(store.clone()), Arc::new(store))
}

async fn narrative_create_is_idempotent(narratives: &dyn NarrativeRepository) {
    narratives.create("n1", "Democracy is failing").await.unwrap();
    narratives.create("n1", "Democracy is failing").await.unwrap();
    narratives
        .create("n2", "China's rise is inevitable")
        .await
        .unwrap();

    let all = narratives.all().await.unwrap();
    assert_eq!(all.columns(), ["code", "description"]);
    let listed = codes(&all, "code");
    assert_eq!(listed.iter().filter(|c| *c == "n1").count(), 1);
    assert!(listed.contains(&"n2".to_string()));
}

async fn narrative_delete_removes_it(narratives: &dyn NarrativeRepository) {
    narratives.create("n4", "China is your friend").await.unwrap();
    assert!(codes(&narratives.all().await.unwrap(), "code").contains(&"n4".to_string()));

    narratives.delete("n4").await.unwrap();
    assert!(!codes(&narratives.all().await.unwrap(), "code").contains(&"n4".to_string()));
}

#[tokio::test]
async fn test_memory_narrative_create_twice() {
    let (narratives, _) = memory();
    narrative_create_is_idempotent(narratives.as_ref()).await;
}

#[tokio::test]
async fn test_memory_narrative_delete() {
    let (narratives, _) = memory();
    narrative_delete_removes_it(narratives.as_ref()).await;
}

#[tokio::test]
async fn test_memory_first_description_wins() {
    let (narratives, _) = memory();
    narratives.create("n1", "first").await.unwrap();
    narratives.create("n1", "second").await.unwrap();
    let all = narratives.all().await.unwrap();
    assert_eq!(all.records()[0]["description"], json!("first"));
}

#[tokio::test]
async fn test_memory_labels_join_descriptions() {
    let (narratives, labels) = memory();
    narratives.create("c1", "Democracy is failing").await.unwrap();
    narratives
        .create("c2", "China's rise is inevitable")
        .await
        .unwrap();
    labels.create("c1", "Tim", "Whatever").await.unwrap();
    labels.create("c2", "Tim", "Something").await.unwrap();

    let all = labels.all().await.unwrap();
    assert_eq!(all.columns(), ["narrative_code", "annotator", "text", "description"]);
    assert_eq!(codes(&all, "narrative_code"), ["c1", "c2"]);
    assert_eq!(all.records()[0]["description"], json!("Democracy is failing"));

    labels.delete("c2", "Tim", "Something").await.unwrap();
    assert_eq!(codes(&labels.all().await.unwrap(), "text"), ["Whatever"]);
}

#[tokio::test]
async fn test_memory_label_requires_narrative_and_cascades() {
    let (narratives, labels) = memory();
    let err = labels.create("ghost", "Tim", "Pfft").await.unwrap_err();
    assert!(matches!(err, StoreError::Query(_)));

    narratives.create("c1", "Democracy is failing").await.unwrap();
    labels.create("c1", "Tim", "Pfft").await.unwrap();
    narratives.delete("c1").await.unwrap();
    assert!(labels.all().await.unwrap().is_empty());
}

fn pg_settings() -> PgSettings {
    let var = |name: &str| std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    PgSettings {
        host: var("PGSQL_HOST"),
        port: var("PGSQL_PORT").parse().unwrap(),
        username: var("PGSQL_USERNAME"),
        password: var("PGSQL_PASSWORD"),
        database: var("PGSQL_DB"),
    }
}

#[tokio::test]
#[ignore = "needs a PostgreSQL server configured through PGSQL_*"]
async fn test_postgres_narrative_create_twice() {
    let store = PgStore::new(pg_settings());
    store.init_schema().await.unwrap();
    narrative_create_is_idempotent(&store).await;
}

#[tokio::test]
#[ignore = "needs a PostgreSQL server configured through PGSQL_*"]
async fn test_postgres_narrative_delete() {
    let store = PgStore::new(pg_settings());
    store.init_schema().await.unwrap();
    narrative_delete_removes_it(&store).await;
}

#[tokio::test]
async fn test_postgres_unreachable_is_connection_error() {
    let store = PgStore::new(PgSettings {
        host: "127.0.0.1".into(),
        port: 1,
        username: "pna".into(),
        password: "secret".into(),
        database: "pna".into(),
    });
    let err = NarrativeRepository::all(&store).await.unwrap_err();
    assert!(matches!(err, StoreError::Connection(_)));
    assert!(!format!("{:?}", store.settings()).contains("secret"));
}
