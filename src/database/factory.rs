// ABOUTME: Record store factory with runtime backend selection
// ABOUTME: Delegates RecordStore calls to the in-memory or SQLite implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! Record store factory
//!
//! Picks the backend from the configured [`DatabaseUrl`].

use async_trait::async_trait;
use changeflow_core::errors::AppResult;
use serde_json::Value;
use tracing::info;

use super::{InMemoryRecordStore, RecordStore, SqliteRecordStore};
use crate::config::DatabaseUrl;

/// Record store wrapper that delegates to the selected implementation
#[derive(Clone)]
pub enum Database {
    /// Process-local maps
    Memory(InMemoryRecordStore),
    /// `SQLite` via sqlx
    SQLite(SqliteRecordStore),
}

impl Database {
    /// Create the backend named by `url`
    ///
    /// # Errors
    ///
    /// Returns a database error if the `SQLite` connection or migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let database = match url {
            DatabaseUrl::InMemory => Self::Memory(InMemoryRecordStore::new()),
            DatabaseUrl::SqliteMemory | DatabaseUrl::SQLite { .. } => {
                Self::SQLite(SqliteRecordStore::new(&url.to_connection_string()).await?)
            }
        };
        info!("Record store initialized: {}", database.backend_info());
        Ok(database)
    }

    /// Get a descriptive string for the current backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Memory(_) => "In-memory (non-persistent)",
            Self::SQLite(_) => "SQLite",
        }
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn get_one(&self, table: &str, key: &str) -> AppResult<Option<Value>> {
        match self {
            Self::Memory(store) => store.get_one(table, key).await,
            Self::SQLite(store) => store.get_one(table, key).await,
        }
    }

    async fn set_one(&self, table: &str, key: &str, value: Value) -> AppResult<()> {
        match self {
            Self::Memory(store) => store.set_one(table, key, value).await,
            Self::SQLite(store) => store.set_one(table, key, value).await,
        }
    }

    async fn delete_one(&self, table: &str, key: &str) -> AppResult<bool> {
        match self {
            Self::Memory(store) => store.delete_one(table, key).await,
            Self::SQLite(store) => store.delete_one(table, key).await,
        }
    }

    async fn get_all_as_list(&self, table: &str) -> AppResult<Vec<Value>> {
        match self {
            Self::Memory(store) => store.get_all_as_list(table).await,
            Self::SQLite(store) => store.get_all_as_list(table).await,
        }
    }
}
