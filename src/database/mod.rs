// ABOUTME: Record store abstraction shared by change records and live entities
// ABOUTME: Async key-value trait over logical tables plus a typed serde layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! # Record Store
//!
//! A generic key-value store organised into logical tables. Change records and
//! live entities are stored as JSON documents keyed by id. Backends implement
//! [`RecordStore`]; [`TypedRecords`] layers serde conversion on top for any
//! backend, including trait objects.

/// Backend selection from a connection string
pub mod factory;
/// Process-local backend
pub mod memory;
/// `SQLite` backend
pub mod sqlite;

use async_trait::async_trait;
use changeflow_core::errors::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use factory::Database;
pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Get/set/delete-by-key access to logical tables of JSON records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record
    ///
    /// # Errors
    ///
    /// Returns a database error if the backend fails
    async fn get_one(&self, table: &str, key: &str) -> AppResult<Option<Value>>;

    /// Insert or replace one record
    ///
    /// # Errors
    ///
    /// Returns a database error if the backend fails
    async fn set_one(&self, table: &str, key: &str, value: Value) -> AppResult<()>;

    /// Delete one record, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns a database error if the backend fails
    async fn delete_one(&self, table: &str, key: &str) -> AppResult<bool>;

    /// All records of a table ordered by key
    ///
    /// # Errors
    ///
    /// Returns a database error if the backend fails
    async fn get_all_as_list(&self, table: &str) -> AppResult<Vec<Value>>;
}

/// Serde helpers over any [`RecordStore`]
#[async_trait]
pub trait TypedRecords {
    /// Fetch and decode one record
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the record cannot be decoded
    async fn load<T: DeserializeOwned + Send>(&self, table: &str, key: &str)
        -> AppResult<Option<T>>;

    /// Encode and store one record
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend fails
    async fn store<T: Serialize + Sync>(&self, table: &str, key: &str, value: &T) -> AppResult<()>;

    /// Fetch and decode every record of a table
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or any record cannot be decoded
    async fn load_all<T: DeserializeOwned + Send>(&self, table: &str) -> AppResult<Vec<T>>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> TypedRecords for S {
    async fn load<T: DeserializeOwned + Send>(
        &self,
        table: &str,
        key: &str,
    ) -> AppResult<Option<T>> {
        self.get_one(table, key)
            .await?
            .map(|value| decode(table, key, value))
            .transpose()
    }

    async fn store<T: Serialize + Sync>(&self, table: &str, key: &str, value: &T) -> AppResult<()> {
        let encoded = serde_json::to_value(value).map_err(|e| {
            AppError::serialization(format!("Failed to encode {table}/{key}: {e}"))
        })?;
        self.set_one(table, key, encoded).await
    }

    async fn load_all<T: DeserializeOwned + Send>(&self, table: &str) -> AppResult<Vec<T>> {
        self.get_all_as_list(table)
            .await?
            .into_iter()
            .map(|value| decode(table, "*", value))
            .collect()
    }
}

fn decode<T: DeserializeOwned>(table: &str, key: &str, value: Value) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::serialization(format!("Failed to decode {table}/{key}: {e}")))
}
