// ABOUTME: SQLite record store using sqlx with one keyed JSON table
// ABOUTME: Upserts records by (table_name, record_key) and stamps RFC 3339 update times
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use async_trait::async_trait;
use changeflow_core::errors::{AppError, AppResult};
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::RecordStore;

/// `SQLite`-backed record store
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Connect and run migrations
    ///
    /// In-memory databases are pinned to a single connection so every query
    /// sees the same database.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection or migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let connection_string = if in_memory || database_url.contains('?') {
            database_url.to_owned()
        } else {
            format!("{database_url}?mode=rwc")
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect(&connection_string)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {database_url}: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        debug!(database_url, "SQLite record store ready");
        Ok(store)
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the records table
    ///
    /// # Errors
    ///
    /// Returns a database error if the schema cannot be created
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS records (
                table_name TEXT NOT NULL,
                record_key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (table_name, record_key)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn parse_value(raw: &str) -> AppResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::serialization(format!("Corrupt record value: {e}")))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_one(&self, table: &str, key: &str) -> AppResult<Option<Value>> {
        let row = sqlx::query(
            r"
            SELECT value FROM records
            WHERE table_name = ?1 AND record_key = ?2
            ",
        )
        .bind(table)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| parse_value(row.get::<&str, _>("value")))
            .transpose()
    }

    async fn set_one(&self, table: &str, key: &str, value: Value) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO records (table_name, record_key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(table_name, record_key) DO UPDATE SET
                value = ?3,
                updated_at = ?4
            ",
        )
        .bind(table)
        .bind(key)
        .bind(value.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_one(&self, table: &str, key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE table_name = ?1 AND record_key = ?2")
            .bind(table)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_all_as_list(&self, table: &str) -> AppResult<Vec<Value>> {
        let rows = sqlx::query(
            r"
            SELECT value FROM records
            WHERE table_name = ?1
            ORDER BY record_key
            ",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| parse_value(row.get::<&str, _>("value")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changeflow_core::errors::ErrorCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_and_list() {
        let store = SqliteRecordStore::new("sqlite::memory:").await.unwrap();

        store.set_one("t", "b", json!({"n": 1})).await.unwrap();
        store.set_one("t", "a", json!({"n": 2})).await.unwrap();
        store.set_one("t", "b", json!({"n": 3})).await.unwrap();
        store.set_one("other", "a", json!({"n": 4})).await.unwrap();

        let all = store.get_all_as_list("t").await.unwrap();
        assert_eq!(all, vec![json!({"n": 2}), json!({"n": 3})]);
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let store = SqliteRecordStore::new("sqlite::memory:").await.unwrap();
        assert!(!store.delete_one("t", "nope").await.unwrap());
        assert_eq!(store.get_one("t", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_query_failure_maps_to_database_error() {
        let store = SqliteRecordStore::new("sqlite::memory:").await.unwrap();
        store.pool().close().await;

        let err = store.get_one("t", "a").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.starts_with("Database query failed"));
        assert!(store.set_one("t", "a", json!(1)).await.is_err());
    }
}
