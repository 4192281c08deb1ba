// ABOUTME: In-memory record store backed by ordered maps behind an async RwLock
// ABOUTME: Used for tests and for ephemeral deployments selected with DATABASE_URL=memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use changeflow_core::errors::AppResult;
use serde_json::Value;
use tokio::sync::RwLock;

use super::RecordStore;

type Tables = HashMap<String, BTreeMap<String, Value>>;

/// Process-local record store
///
/// Clones share the same underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held in `table`
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_one(&self, table: &str, key: &str) -> AppResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|rows| rows.get(key)).cloned())
    }

    async fn set_one(&self, table: &str, key: &str, value: Value) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete_one(&self, table: &str, key: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .is_some_and(|rows| rows.remove(key).is_some()))
    }

    async fn get_all_as_list(&self, table: &str) -> AppResult<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}
