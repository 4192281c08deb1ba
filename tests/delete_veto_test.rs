// ABOUTME: Integration tests for the entity store "in use" veto on deletion
// ABOUTME: A vetoed delete must leave both the live entity and the pending change untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use changeflow::{
    changes::{ChangeWorkflow, WorkflowConfig},
    database::{InMemoryRecordStore, RecordStore},
    entities::{EntityStore, KvEntityStore},
    errors::{AppError, AppResult, ErrorCode},
    models::{ChangeOperation, ChangeState, TelemetryTwoProfile},
};
use common::{as_user, init_test_logging, telemetry_two_profile};
use tokio::sync::RwLock;

/// Entity store that refuses to delete profiles still referenced elsewhere
struct ReferencedEntityStore {
    inner: KvEntityStore<TelemetryTwoProfile>,
    referenced: RwLock<HashSet<String>>,
}

impl ReferencedEntityStore {
    fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            inner: KvEntityStore::<TelemetryTwoProfile>::new(records),
            referenced: RwLock::new(HashSet::new()),
        }
    }

    async fn reference(&self, id: &str) {
        self.referenced.write().await.insert(id.to_owned());
    }
}

#[async_trait]
impl EntityStore<TelemetryTwoProfile> for ReferencedEntityStore {
    async fn load(&self, id: &str) -> AppResult<Option<TelemetryTwoProfile>> {
        self.inner.load(id).await
    }

    async fn save(&self, entity: &TelemetryTwoProfile) -> AppResult<()> {
        self.inner.save(entity).await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        self.inner.delete(id).await
    }

    async fn list(&self) -> AppResult<Vec<TelemetryTwoProfile>> {
        self.inner.list().await
    }

    async fn check_deletable(&self, entity: &TelemetryTwoProfile) -> AppResult<()> {
        if self.referenced.read().await.contains(&entity.id) {
            return Err(AppError::in_use(format!(
                "Telemetry 2.0 Profile {} is used by a rule",
                entity.name
            ))
            .with_resource_id(&entity.id));
        }
        Ok(())
    }
}

fn veto_workflow() -> (Arc<ReferencedEntityStore>, ChangeWorkflow<TelemetryTwoProfile>) {
    init_test_logging();
    let records: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    let entities = Arc::new(ReferencedEntityStore::new(records.clone()));
    let workflow = ChangeWorkflow::new(
        records,
        entities.clone() as Arc<dyn EntityStore<TelemetryTwoProfile>>,
        WorkflowConfig::default(),
    );
    (entities, workflow)
}

#[tokio::test]
async fn test_propose_delete_of_referenced_entity_is_rejected() -> Result<()> {
    let (entities, workflow) = veto_workflow();
    let profile = telemetry_two_profile("p1", "in-use");
    workflow.entities().save(&profile).await?;
    entities.reference("p1").await;

    let err = workflow
        .propose_delete(&as_user("alice"), "p1")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceInUse);
    assert_eq!(err.message, "Telemetry 2.0 Profile in-use is used by a rule");
    assert!(workflow.all_changes().await?.is_empty());
    assert_eq!(workflow.entities().load("p1").await?, Some(profile));
    Ok(())
}

#[tokio::test]
async fn test_approving_delete_of_referenced_entity_keeps_everything() -> Result<()> {
    let (entities, workflow) = veto_workflow();
    let profile = telemetry_two_profile("p1", "in-use");
    workflow.entities().save(&profile).await?;

    let change = workflow.propose_delete(&as_user("alice"), "p1").await?;
    assert_eq!(change.operation, Some(ChangeOperation::Delete));
    entities.reference("p1").await;

    let err = workflow
        .approve(&as_user("bob"), &change.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceInUse);
    assert_eq!(workflow.entities().load("p1").await?, Some(profile));

    let pending = workflow.get_change(&change.id).await?.unwrap();
    assert_eq!(pending.state, ChangeState::Pending);
    assert!(pending.approving_user.is_none());
    assert!(workflow.get_approved_change(&change.id).await?.is_none());

    let report = workflow.approve_each(&as_user("bob"), &[change.id.clone()]).await?;
    assert!(report.all_failed());
    assert!(workflow.get_change(&change.id).await?.is_some());
    Ok(())
}
