// ABOUTME: Submission of pending changes and their cancellation
// ABOUTME: Builds create/update/delete proposals from entity payloads and checks conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::constants::messages::ID_IS_EMPTY;
use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{Change, ChangeState, ManagedEntity};
use tracing::info;
use uuid::Uuid;

use super::conflict::validate_no_conflict;
use super::reconcile::PendingOutcome;
use super::validation::validate_change;
use super::{change_not_found, ChangeWorkflow};
use crate::middleware::RequestContext;

fn entity_missing<E: ManagedEntity>(id: &str) -> AppError {
    AppError::not_found(format!("{} with id: {id} does not exist", E::ENTITY_TYPE.label()))
        .with_resource_id(id)
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Store a change as pending
    ///
    /// Missing bookkeeping is filled in before validation: a fresh id, the
    /// caller as author when none is given, and the request or configured
    /// application type.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a malformed change or a conflict
    /// error when an identical change is already pending
    pub async fn submit(&self, ctx: &RequestContext, mut change: Change<E>) -> AppResult<Change<E>> {
        if change.id.trim().is_empty() {
            change.id = Uuid::new_v4().to_string();
        }
        if change.author.trim().is_empty() {
            change.author.clone_from(&ctx.user);
        }
        if change.application_type.trim().is_empty() {
            change.application_type = ctx
                .application_type_or(&self.config.default_application_type)
                .to_owned();
        }
        change.entity_type = E::ENTITY_TYPE;
        change.state = ChangeState::Pending;
        change.approving_user = None;
        change.touch();

        validate_change(Some(&change))?;

        let _guard = self.write_lock.lock().await;
        let pending = self.pending_records().await?;
        validate_no_conflict(&change, &pending)?;
        self.put_pending(&change).await?;

        info!(
            change_id = %change.id,
            entity_id = %change.entity_id,
            entity_type = %E::ENTITY_TYPE,
            operation = ?change.operation,
            author = %change.author,
            request_id = %ctx.request_id,
            "Change submitted"
        );
        Ok(change)
    }

    /// Propose creating `entity`; an entity without an id gets a fresh one
    ///
    /// # Errors
    ///
    /// Returns the entity's validation error, a conflict error when an entity
    /// with that id exists, or any [`Self::submit`] error
    pub async fn propose_create(&self, ctx: &RequestContext, mut entity: E) -> AppResult<Change<E>> {
        if entity.id().trim().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }
        entity.validate()?;
        if self.entities.load(entity.id()).await?.is_some() {
            return Err(AppError::conflict(format!(
                "{} with id: {} already exists",
                E::ENTITY_TYPE.label(),
                entity.id()
            ))
            .with_resource_id(entity.id()));
        }
        self.submit(ctx, Change::create(entity, &ctx.user)).await
    }

    /// Propose replacing the stored entity with `entity`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id, a not-found error when
    /// no entity has that id, the entity's validation error, or any
    /// [`Self::submit`] error
    pub async fn propose_update(&self, ctx: &RequestContext, entity: E) -> AppResult<Change<E>> {
        if entity.id().trim().is_empty() {
            return Err(AppError::invalid_input(ID_IS_EMPTY));
        }
        let current = self
            .entities
            .load(entity.id())
            .await?
            .ok_or_else(|| entity_missing::<E>(entity.id()))?;
        entity.validate()?;
        self.submit(ctx, Change::update(current, entity, &ctx.user)).await
    }

    /// Propose deleting the entity with `id`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id, a not-found error when
    /// no entity has that id, the adapter's in-use error, or any
    /// [`Self::submit`] error
    pub async fn propose_delete(&self, ctx: &RequestContext, id: &str) -> AppResult<Change<E>> {
        if id.trim().is_empty() {
            return Err(AppError::invalid_input(ID_IS_EMPTY));
        }
        let current = self
            .entities
            .load(id)
            .await?
            .ok_or_else(|| entity_missing::<E>(id))?;
        self.entities.check_deletable(&current).await?;
        self.submit(ctx, Change::delete(current, &ctx.user)).await
    }

    /// Discard a pending change without touching the entity store
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id and a not-found error for
    /// an unknown id or one whose interrupted approval turned out complete
    pub async fn cancel(&self, id: &str) -> AppResult<Change<E>> {
        if id.trim().is_empty() {
            return Err(AppError::invalid_input("Change id is empty"));
        }
        let _guard = self.write_lock.lock().await;
        let mut change = self
            .pending_record(id)
            .await?
            .ok_or_else(|| change_not_found(id))?;

        if change.state.is_in_flight() {
            match self.reconcile_pending(change).await? {
                PendingOutcome::Approved(_) => return Err(change_not_found(id)),
                PendingOutcome::Pending(reset) => change = reset,
            }
        }

        self.remove_pending(id).await?;
        info!(
            change_id = %id,
            entity_id = %change.entity_id,
            entity_type = %E::ENTITY_TYPE,
            "Change cancelled"
        );
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::changes::WorkflowConfig;
    use crate::database::InMemoryRecordStore;
    use crate::entities::{EntityStore, KvEntityStore};
    use changeflow_core::errors::ErrorCode;
    use changeflow_core::models::{ChangeOperation, TelemetryTwoProfile};

    fn profile(id: &str, name: &str) -> TelemetryTwoProfile {
        TelemetryTwoProfile {
            id: id.to_owned(),
            name: name.to_owned(),
            jsonconfig: "{}".to_owned(),
            application_type: String::new(),
        }
    }

    fn workflow() -> ChangeWorkflow<TelemetryTwoProfile> {
        let records = Arc::new(InMemoryRecordStore::new());
        let entities = Arc::new(KvEntityStore::<TelemetryTwoProfile>::new(records.clone()));
        ChangeWorkflow::new(records, entities, WorkflowConfig::default())
    }

    #[tokio::test]
    async fn test_submit_fills_bookkeeping() {
        let workflow = workflow();
        let ctx = RequestContext::new("alice").with_application_type("xhome");
        let mut change = Change::create(profile("p1", "a"), "");
        change.id = String::new();

        let stored = workflow.submit(&ctx, change).await.unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(stored.author, "alice");
        assert_eq!(stored.application_type, "xhome");

        let defaulted = workflow
            .submit(&RequestContext::new("bob"), Change::create(profile("p2", "b"), ""))
            .await
            .unwrap();
        assert_eq!(defaulted.application_type, "stb");
    }

    #[tokio::test]
    async fn test_submit_keeps_given_author() {
        let workflow = workflow();
        let stored = workflow
            .submit(&RequestContext::new("mallory"), Change::create(profile("p1", "a"), "alice"))
            .await
            .unwrap();

        assert_eq!(stored.author, "alice");
        let persisted = workflow.get_change(&stored.id).await.unwrap().unwrap();
        assert_eq!(persisted.author, "alice");
    }

    #[tokio::test]
    async fn test_identical_submission_conflicts() {
        let workflow = workflow();
        let ctx = RequestContext::new("alice");
        workflow.propose_create(&ctx, profile("p1", "a")).await.unwrap();

        let err = workflow.propose_create(&ctx, profile("p1", "a")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
        assert_eq!(err.message, "The same change already exists");
        assert_eq!(workflow.all_changes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_propose_create_rejects_existing_entity() {
        let workflow = workflow();
        workflow.entities().save(&profile("p1", "live")).await.unwrap();

        let err = workflow
            .propose_create(&RequestContext::new("alice"), profile("p1", "again"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Telemetry 2.0 Profile with id: p1 already exists");
    }

    #[tokio::test]
    async fn test_propose_update_and_delete_need_live_entity() {
        let workflow = workflow();
        let ctx = RequestContext::new("alice");

        let err = workflow.propose_update(&ctx, profile("p1", "x")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
        let err = workflow.propose_delete(&ctx, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        workflow.entities().save(&profile("p1", "live")).await.unwrap();
        let update = workflow.propose_update(&ctx, profile("p1", "next")).await.unwrap();
        assert_eq!(update.operation, Some(ChangeOperation::Update));
        assert_eq!(update.old_entity, Some(profile("p1", "live")));

        let delete = workflow.propose_delete(&ctx, "p1").await.unwrap();
        assert_eq!(delete.operation, Some(ChangeOperation::Delete));
        assert_eq!(workflow.changes_by_entity_id("p1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_removes_only_the_record() {
        let workflow = workflow();
        let ctx = RequestContext::new("alice");

        assert_eq!(workflow.cancel("").await.unwrap_err().code, ErrorCode::InvalidInput);
        assert_eq!(
            workflow.cancel("nonexistent").await.unwrap_err().code,
            ErrorCode::ResourceNotFound
        );

        let change = workflow.propose_create(&ctx, profile("p1", "a")).await.unwrap();
        workflow.cancel(&change.id).await.unwrap();
        assert!(workflow.get_change(&change.id).await.unwrap().is_none());
        assert!(workflow.entities().load("p1").await.unwrap().is_none());
    }
}
