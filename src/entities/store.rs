// ABOUTME: EntityStore implementation on top of the generic record store
// ABOUTME: Stores each entity kind in the table named by its ManagedEntity impl
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use changeflow_core::errors::AppResult;
use changeflow_core::models::ManagedEntity;

use super::EntityStore;
use crate::database::{RecordStore, TypedRecords};

/// Entity adapter persisting `E` as JSON in `E::ENTITY_TABLE`
pub struct KvEntityStore<E> {
    records: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> KvEntityStore<E> {
    /// Wrap a record store
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for KvEntityStore<E> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.records))
    }
}

#[async_trait]
impl<E: ManagedEntity> EntityStore<E> for KvEntityStore<E> {
    async fn load(&self, id: &str) -> AppResult<Option<E>> {
        self.records.load(E::ENTITY_TABLE, id).await
    }

    async fn save(&self, entity: &E) -> AppResult<()> {
        self.records.store(E::ENTITY_TABLE, entity.id(), entity).await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        self.records.delete_one(E::ENTITY_TABLE, id).await
    }

    async fn list(&self) -> AppResult<Vec<E>> {
        self.records.load_all(E::ENTITY_TABLE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryRecordStore;
    use changeflow_core::models::TelemetryTwoProfile;

    #[tokio::test]
    async fn test_round_trip_through_entity_table() {
        let records = Arc::new(InMemoryRecordStore::new());
        let store: KvEntityStore<TelemetryTwoProfile> = KvEntityStore::new(records.clone());
        let profile = TelemetryTwoProfile {
            id: "t1".to_owned(),
            name: "two".to_owned(),
            jsonconfig: "{}".to_owned(),
            application_type: "stb".to_owned(),
        };

        store.save(&profile).await.unwrap();
        assert_eq!(store.load("t1").await.unwrap(), Some(profile));
        assert_eq!(records.len("TelemetryTwoProfiles").await, 1);
        assert!(store.delete("t1").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }
}
