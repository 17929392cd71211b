use std::str::FromStr;

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, error};

use crate::history::{
    models::HistoryRecord,
    store::{RecordStore, StoreError},
};

pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // An in-memory database lives and dies with its single connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "record_store" (
            namespace TEXT NOT NULL,
            id TEXT NOT NULL,
            payload TEXT NOT NULL,
            PRIMARY KEY (namespace, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_payloads(pool: &Pool<Sqlite>, namespace: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT payload
        FROM "record_store"
        WHERE namespace = ?1
        "#,
    )
    .bind(namespace)
    .fetch_all(pool)
    .await
}

pub async fn upsert_payload(
    pool: &Pool<Sqlite>,
    namespace: &str,
    id: &str,
    payload: &str,
) -> Result<(), StoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "record_store" (namespace, id, payload)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (namespace, id) DO UPDATE SET payload = excluded.payload
        "#,
    )
    .bind(namespace)
    .bind(id)
    .bind(payload)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        error!("Failed to write record {} to {}", id, namespace);
        return Err(StoreError::Internal("Failed to write record".into()));
    }

    Ok(())
}

pub async fn delete_payload(pool: &Pool<Sqlite>, namespace: &str, id: &str) -> Result<(), StoreError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "record_store"
        WHERE namespace = ?1 AND id = ?2
        "#,
    )
    .bind(namespace)
    .bind(id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }

    Ok(())
}

/// Record store backed by a single SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: Pool<Sqlite>,
    namespace: String,
}

impl SqliteRecordStore {
    pub async fn connect(database_url: &str, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let pool = connect(database_url).await?;
        Ok(Self::from_pool(pool, namespace))
    }

    pub fn from_pool(pool: Pool<Sqlite>, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

impl RecordStore for SqliteRecordStore {
    async fn get_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        let payloads = get_payloads(&self.pool, &self.namespace).await?;
        debug!("Loaded {} records from {}", payloads.len(), self.namespace);

        payloads
            .iter()
            .map(|payload| serde_json::from_str::<HistoryRecord>(payload).map_err(StoreError::from))
            .collect()
    }

    async fn add(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        upsert_payload(&self.pool, &self.namespace, &record.id, &payload).await
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        delete_payload(&self.pool, &self.namespace, id).await
    }
}
