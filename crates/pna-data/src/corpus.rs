//! Philippines embassy corpus
//!
//! Precomputed artifacts for the embassy's social media corpus, loaded once
//! from a data directory and held in memory. Column names are normalised on
//! load so every query returns display-ready headers.

use crate::error::FacadeError;
use crate::facade::DataFacade;
use crate::table::Table;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Artifact file names inside the data directory
pub mod files {
    /// Entity mention counts
    pub const ENTITY_COUNTS: &str = "ph_entity_counts.csv";
    /// Entity/category NPMI scores
    pub const NPMIS: &str = "ph_npmis.csv";
    /// Entity to example documents
    pub const ENTITY_TO_SENTS: &str = "ph_entity_to_sents.json";
    /// Daily entity mention counts
    pub const ENTITY_ATTENTION: &str = "ph_entity_attention_over_time.csv";
    /// Daily document volume
    pub const TWEET_VOLUME: &str = "ph_tweet_volume.csv";
    /// 2-D projection of the word vectors
    pub const PCA: &str = "ph_pca_df.csv";
    /// Entity to nearest-neighbour tokens
    pub const NEIGHBOURS: &str = "ph_neighbours.json";
    /// Daily category frequencies
    pub const LIWC_TIME: &str = "ph_liwc_time.csv";
}

const STATUS_URL: &str = "https://twitter.com/chinaembmanila/status/";

/// In-memory corpus artifacts
#[derive(Debug, Clone, Default)]
pub struct CorpusParts {
    /// `entity, count`
    pub entity_counts: Table,
    /// `entity, cat, npmi`
    pub npmis: Table,
    /// Entity to document records (`id, date, likes, retweets, Sentence`)
    pub entity_to_sents: IndexMap<String, Vec<Map<String, Value>>>,
    /// `entity, date, count`
    pub entity_attention: Table,
    /// `date, tweet`
    pub volume: Table,
    /// `token, pc1, pc2`
    pub pca: Table,
    /// Entity to neighbour tokens
    pub neighbours: IndexMap<String, Vec<String>>,
    /// `date, cat, count, freq, n`
    pub liwc_time: Table,
}

/// Façade over the Philippines embassy corpus
#[derive(Debug, Clone)]
pub struct PhilippinesEmbassyCorpus {
    entity_counts: Table,
    liwc: Table,
    entity_to_sents: IndexMap<String, Vec<Map<String, Value>>>,
    entity_attention: Table,
    volume: Table,
    pca: Table,
    neighbours: IndexMap<String, Vec<String>>,
    liwc_time: Table,
}

impl PhilippinesEmbassyCorpus {
    /// Load every artifact from `dir`
    ///
    /// # Errors
    /// Any [`FacadeError`] other than `UnknownEntity` if a file is missing or
    /// malformed.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, FacadeError> {
        let dir = dir.as_ref();
        let parts = CorpusParts {
            entity_counts: read_csv(&dir.join(files::ENTITY_COUNTS))?,
            npmis: read_csv(&dir.join(files::NPMIS))?,
            entity_to_sents: read_json(&dir.join(files::ENTITY_TO_SENTS))?,
            entity_attention: read_csv(&dir.join(files::ENTITY_ATTENTION))?,
            volume: read_csv(&dir.join(files::TWEET_VOLUME))?,
            pca: read_csv(&dir.join(files::PCA))?,
            neighbours: read_json(&dir.join(files::NEIGHBOURS))?,
            liwc_time: read_csv(&dir.join(files::LIWC_TIME))?,
        };
        let pca_path = dir.join(files::PCA);
        if !parts.pca.has_column("token") {
            return Err(FacadeError::Schema {
                path: pca_path,
                reason: "missing `token` column".into(),
            });
        }

        let corpus = Self::from_parts(parts);
        tracing::info!(
            dir = %dir.display(),
            entities = corpus.entity_counts.len(),
            vocabulary = corpus.neighbours.len(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Build from already-parsed artifacts, normalising column names
    #[must_use]
    pub fn from_parts(parts: CorpusParts) -> Self {
        Self {
            entity_counts: parts
                .entity_counts
                .rename(&[("entity", "Entity"), ("count", "Count")]),
            liwc: parts
                .npmis
                .rename(&[("entity", "Entity"), ("cat", "Category"), ("npmi", "NPMI")]),
            entity_to_sents: parts.entity_to_sents,
            entity_attention: parts.entity_attention.rename(&[
                ("entity", "Entity"),
                ("date", "Date"),
                ("count", "Count"),
            ]),
            volume: parts.volume.rename(&[("date", "Date"), ("tweet", "Count")]),
            pca: parts.pca.rename(&[("pc1", "PC1"), ("pc2", "PC2")]),
            neighbours: parts.neighbours,
            liwc_time: parts.liwc_time.rename(&[
                ("date", "Date"),
                ("cat", "Category"),
                ("count", "Count"),
                ("freq", "Frequency"),
                ("n", "Number of Tokens"),
            ]),
        }
    }

    fn rows_for(table: &Table, entity: &str) -> Result<Table, FacadeError> {
        let rows = table.filter_eq("Entity", &Value::String(entity.to_string()));
        if rows.is_empty() {
            return Err(FacadeError::UnknownEntity(entity.to_string()));
        }
        Ok(rows)
    }
}

impl DataFacade for PhilippinesEmbassyCorpus {
    fn entity_counts(&self) -> Result<Table, FacadeError> {
        Ok(self.entity_counts.clone())
    }

    fn vector_neighbourhood(&self, anchor: &str) -> Result<Table, FacadeError> {
        let neighbours = self
            .neighbours
            .get(anchor)
            .ok_or_else(|| FacadeError::UnknownEntity(anchor.to_string()))?;
        Ok(self.pca.filter(|row| {
            row.get_str("token")
                .is_some_and(|t| t == anchor || neighbours.iter().any(|n| n == t))
        }))
    }

    fn liwc_profile(&self, entity: &str) -> Result<Table, FacadeError> {
        Self::rows_for(&self.liwc, entity)
    }

    fn sentences(&self, entity: &str) -> Result<Table, FacadeError> {
        let records = self
            .entity_to_sents
            .get(entity)
            .ok_or_else(|| FacadeError::UnknownEntity(entity.to_string()))?;

        let table = Table::from_records(records)
            .map_column("date", |d| match d.as_str() {
                Some(s) => Value::String(s.split('T').next().unwrap_or(s).to_string()),
                None => d.clone(),
            })
            .with_column("Url", |row| {
                let id = match row.get("id") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                Value::String(format!("{STATUS_URL}{id}"))
            })
            .rename(&[("date", "Date"), ("likes", "Likes"), ("retweets", "Retweets")])
            .drop_column("id")
            .dedup_by("Url");
        Ok(table)
    }

    fn entity_counts_over_time(&self, entity: &str) -> Result<Table, FacadeError> {
        Ok(Self::rows_for(&self.entity_attention, entity)?.sort_by("Date"))
    }

    fn corpus_volume_over_time(&self) -> Result<Table, FacadeError> {
        Ok(self.volume.clone())
    }

    fn in_vocab(&self, word: &str) -> bool {
        self.neighbours.contains_key(word)
    }

    fn liwc_over_time(&self) -> Result<Table, FacadeError> {
        Ok(self.liwc_time.clone())
    }
}

/// Read a CSV artifact; numeric cells become numbers, empty cells `null`
pub fn read_csv(path: &Path) -> Result<Table, FacadeError> {
    let csv_err = |source| FacadeError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut table = Table::new(headers.iter());
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        table.push_row(record.iter().map(parse_cell).collect())?;
    }
    tracing::debug!(path = %path.display(), rows = table.len(), "read csv artifact");
    Ok(table)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, FacadeError> {
    let raw = fs::read_to_string(path).map_err(|source| FacadeError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| FacadeError::Json {
        path: PathBuf::from(path),
        source,
    })
}

fn parse_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_cell_types() {
        assert_eq!(parse_cell("12"), json!(12));
        assert_eq!(parse_cell("-0.25"), json!(-0.25));
        assert_eq!(parse_cell("2020-06-01"), json!("2020-06-01"));
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("NaN"), json!("NaN"));
    }

    #[test]
    fn from_parts_renames_columns() {
        let corpus = PhilippinesEmbassyCorpus::from_parts(CorpusParts {
            volume: Table::new(["date", "tweet"]),
            liwc_time: Table::new(["date", "cat", "count", "freq", "n"]),
            ..CorpusParts::default()
        });
        assert_eq!(corpus.corpus_volume_over_time().unwrap().columns(), ["Date", "Count"]);
        assert_eq!(
            corpus.liwc_over_time().unwrap().columns(),
            ["Date", "Category", "Count", "Frequency", "Number of Tokens"]
        );
    }
}
