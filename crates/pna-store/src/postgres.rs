//! PostgreSQL repositories
//!
//! Every call opens its own connection and closes it afterwards; there is no
//! pool. An unreachable database surfaces as [`StoreError::Connection`] on the
//! call that needed it.

use crate::error::{StoreError, StoreResult};
use crate::traits::{NarrativeLabelRepository, NarrativeRepository, LABEL_COLUMNS, NARRATIVE_COLUMNS};
use async_trait::async_trait;
use pna_data::Table;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{Connection, PgConnection, Row};
use std::fmt;
use std::time::Duration;

const SCHEMA: [&str; 2] = [
    r"
    CREATE TABLE IF NOT EXISTS narrative (
        code TEXT PRIMARY KEY,
        description TEXT NOT NULL
    );
    ",
    r"
    CREATE TABLE IF NOT EXISTS narrative_label (
        narrative_code TEXT NOT NULL REFERENCES narrative(code) ON DELETE CASCADE,
        annotator TEXT NOT NULL,
        text TEXT NOT NULL
    );
    ",
];

/// Connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct PgSettings {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login role
    pub username: String,
    /// Password
    pub password: String,
    /// Database name
    pub database: String,
}

impl fmt::Debug for PgSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl PgSettings {
    fn options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Both repositories over one PostgreSQL database
#[derive(Debug, Clone)]
pub struct PgStore {
    settings: PgSettings,
}

impl PgStore {
    /// Create a store; nothing is connected until the first call
    #[must_use]
    pub fn new(settings: PgSettings) -> Self {
        Self { settings }
    }

    /// Connection settings
    #[must_use]
    pub fn settings(&self) -> &PgSettings {
        &self.settings
    }

    async fn connect(&self) -> StoreResult<PgConnection> {
        PgConnection::connect_with(&self.settings.options())
            .await
            .map_err(StoreError::connection)
    }

    /// Create the tables if they do not exist
    pub async fn init_schema(&self) -> StoreResult<()> {
        let mut conn = self.connect().await?;
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&mut conn)
                .await
                .map_err(StoreError::query)?;
        }
        close(conn).await;
        tracing::info!(database = %self.settings.database, "schema ready");
        Ok(())
    }

    async fn execute(&self, sql: &str, args: &[&str]) -> StoreResult<u64> {
        let mut conn = self.connect().await?;
        let mut query = sqlx::query(sql);
        for arg in args {
            query = query.bind(*arg);
        }
        let result = query.execute(&mut conn).await.map_err(StoreError::query);
        close(conn).await;
        Ok(result?.rows_affected())
    }

    async fn fetch_table(&self, sql: &str, columns: &[&str]) -> StoreResult<Table> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(sql).fetch_all(&mut conn).await.map_err(StoreError::query);
        close(conn).await;

        let mut table = Table::new(columns.iter().copied());
        for row in rows? {
            table
                .push_row(text_cells(&row, columns)?)
                .map_err(StoreError::query)?;
        }
        Ok(table)
    }
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "closing connection failed");
    }
}

fn text_cells(row: &PgRow, columns: &[&str]) -> StoreResult<Vec<Value>> {
    columns
        .iter()
        .map(|c| {
            row.try_get::<String, _>(*c)
                .map(Value::String)
                .map_err(StoreError::query)
        })
        .collect()
}

#[async_trait]
impl NarrativeRepository for PgStore {
    async fn create(&self, code: &str, description: &str) -> StoreResult<()> {
        let inserted = self
            .execute(
                "INSERT INTO narrative (code, description) VALUES ($1, $2) \
                 ON CONFLICT (code) DO NOTHING;",
                &[code, description],
            )
            .await?;
        tracing::debug!(code, inserted, "create narrative");
        Ok(())
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        self.execute("DELETE FROM narrative WHERE code = $1;", &[code])
            .await?;
        Ok(())
    }

    async fn all(&self) -> StoreResult<Table> {
        self.fetch_table(
            "SELECT code, description FROM narrative ORDER BY code;",
            &NARRATIVE_COLUMNS,
        )
        .await
    }
}

#[async_trait]
impl NarrativeLabelRepository for PgStore {
    async fn create(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()> {
        self.execute(
            "INSERT INTO narrative_label (narrative_code, annotator, text) VALUES ($1, $2, $3);",
            &[narrative_code, annotator, text],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, narrative_code: &str, annotator: &str, text: &str) -> StoreResult<()> {
        self.execute(
            "DELETE FROM narrative_label \
             WHERE narrative_code = $1 AND annotator = $2 AND text = $3;",
            &[narrative_code, annotator, text],
        )
        .await?;
        Ok(())
    }

    async fn all(&self) -> StoreResult<Table> {
        self.fetch_table(
            "SELECT nl.narrative_code, nl.annotator, nl.text, n.description \
             FROM narrative_label AS nl \
             INNER JOIN narrative AS n ON n.code = nl.narrative_code;",
            &LABEL_COLUMNS,
        )
        .await
    }
}

/// Block until the database accepts a connection, polling every `interval`
///
/// Returns the number of failed attempts.
pub async fn wait_for_db(settings: &PgSettings, interval: Duration) -> u64 {
    let options = settings.options();
    let mut attempts = 0u64;
    loop {
        match PgConnection::connect_with(&options).await {
            Ok(conn) => {
                close(conn).await;
                tracing::info!(attempts, host = %settings.host, "database is accepting connections");
                return attempts;
            }
            Err(e) => {
                attempts += 1;
                tracing::info!(error = %e, "waiting for database");
                tokio::time::sleep(interval).await;
            }
        }
    }
}
