use pna_data::corpus::files;
use pna_data::{DataFacade, FacadeError, PhilippinesEmbassyCorpus};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn corpus_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    write(p, files::ENTITY_COUNTS, "entity,count\nChina,120\nDuterte,45\n");
    write(
        p,
        files::NPMIS,
        "entity,cat,npmi\nChina,posemo,0.31\nChina,negemo,-0.12\nDuterte,power,0.4\n",
    );
    write(
        p,
        files::ENTITY_TO_SENTS,
        &json!({
            "China": [
                {"id": 11, "date": "2020-06-02T08:00:00", "likes": 5, "retweets": 1, "Sentence": "China donates masks"},
                {"id": 11, "date": "2020-06-02T08:00:00", "likes": 5, "retweets": 1, "Sentence": "China donates masks"},
                {"id": 12, "date": "2020-06-01T09:30:00", "likes": 2, "retweets": 0, "Sentence": "Friendship with China"}
            ]
        })
        .to_string(),
    );
    write(
        p,
        files::ENTITY_ATTENTION,
        "entity,date,count\nChina,2020-06-03,4\nChina,2020-06-01,9\nDuterte,2020-06-02,1\n",
    );
    write(p, files::TWEET_VOLUME, "date,tweet\n2020-06-01,30\n2020-06-02,12\n");
    write(
        p,
        files::PCA,
        "token,pc1,pc2\nChina,0.1,0.2\nBeijing,0.15,0.22\nvaccine,-0.4,0.9\nmasks,0.3,-0.1\n",
    );
    write(
        p,
        files::NEIGHBOURS,
        &json!({"China": ["Beijing", "masks"], "Duterte": ["president"]}).to_string(),
    );
    write(
        p,
        files::LIWC_TIME,
        "date,cat,count,freq,n\n2020-06-01,posemo,3,0.1,30\n",
    );
    dir
}

#[test]
fn test_load_normalises_headers() {
    let dir = corpus_dir();
    let corpus = PhilippinesEmbassyCorpus::load(dir.path()).unwrap();

    assert_eq!(corpus.entity_counts().unwrap().columns(), ["Entity", "Count"]);
    assert_eq!(
        corpus.liwc_profile("China").unwrap().columns(),
        ["Entity", "Category", "NPMI"]
    );
    assert_eq!(
        corpus.corpus_volume_over_time().unwrap().columns(),
        ["Date", "Count"]
    );
    assert_eq!(corpus.entity_counts().unwrap().records()[0]["Count"], json!(120));
}

#[test]
fn test_vector_neighbourhood_keeps_anchor_and_neighbours() {
    let dir = corpus_dir();
    let corpus = PhilippinesEmbassyCorpus::load(dir.path()).unwrap();

    let table = corpus.vector_neighbourhood("China").unwrap();
    assert_eq!(table.columns(), ["token", "PC1", "PC2"]);
    let tokens: Vec<_> = table.column("token").cloned().collect();
    assert_eq!(tokens, [json!("China"), json!("Beijing"), json!("masks")]);
}

#[test]
fn test_sentences_shape() {
    let dir = corpus_dir();
    let corpus = PhilippinesEmbassyCorpus::load(dir.path()).unwrap();

    let table = corpus.sentences("China").unwrap();
    assert_eq!(table.columns(), ["Date", "Likes", "Retweets", "Sentence", "Url"]);
    assert_eq!(table.len(), 2);
    let first = &table.records()[0];
    assert_eq!(first["Date"], json!("2020-06-02"));
    assert_eq!(first["Url"], json!("https://twitter.com/chinaembmanila/status/11"));
}

#[test]
fn test_entity_counts_over_time_sorted_by_date() {
    let dir = corpus_dir();
    let corpus = PhilippinesEmbassyCorpus::load(dir.path()).unwrap();

    let table = corpus.entity_counts_over_time("China").unwrap();
    let dates: Vec<_> = table.column("Date").cloned().collect();
    assert_eq!(dates, [json!("2020-06-01"), json!("2020-06-03")]);
}

#[test]
fn test_unknown_entity() {
    let dir = corpus_dir();
    let corpus = PhilippinesEmbassyCorpus::load(dir.path()).unwrap();

    assert!(corpus.in_vocab("China"));
    assert!(!corpus.in_vocab("Positive Definite Matrix"));
    for result in [
        corpus.vector_neighbourhood("zzyzx"),
        corpus.liwc_profile("zzyzx"),
        corpus.sentences("zzyzx"),
        corpus.entity_counts_over_time("zzyzx"),
    ] {
        assert!(matches!(result, Err(FacadeError::UnknownEntity(e)) if e == "zzyzx"));
    }
}

#[test]
fn test_missing_artifact_is_io_error() {
    let dir = corpus_dir();
    fs::remove_file(dir.path().join(files::NEIGHBOURS)).unwrap();
    let err = PhilippinesEmbassyCorpus::load(dir.path()).unwrap_err();
    assert!(matches!(err, FacadeError::Io { .. }));
    assert!(err.to_string().contains(files::NEIGHBOURS));
}

#[test]
fn test_ragged_csv_is_rejected() {
    let dir = corpus_dir();
    write(dir.path(), files::TWEET_VOLUME, "date,tweet\n2020-06-01\n");
    let err = PhilippinesEmbassyCorpus::load(dir.path()).unwrap_err();
    assert!(matches!(err, FacadeError::Csv { .. }));
}
