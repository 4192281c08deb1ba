// ABOUTME: Generic change-approval workflow shared by every managed entity kind
// ABOUTME: Owns record access, configuration, and the write lock used by all operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! # Change Workflow
//!
//! A staged-commit mechanism for managed configuration entities. A proposed
//! mutation is stored as a pending [`Change`], reviewed, and then either
//! approved (applied to the entity store and recorded as an
//! [`ApprovedChange`]) or cancelled. Approved changes can later be reverted.
//!
//! The workflow is written once and instantiated per entity kind:
//!
//! ```text
//! ChangeWorkflow<PermanentTelemetryProfile>  -> XconfChange / XconfApprovedChange
//! ChangeWorkflow<TelemetryTwoProfile>        -> XconfTelemetryTwoChange / XconfApprovedTelemetryTwoChange
//! ```
//!
//! Approve and revert touch two stores without a transaction. Each persists an
//! in-flight state (`APPLYING` / `REVERTING`) before mutating the entity, and
//! [`ChangeWorkflow::reconcile`] finishes or rolls back records left in that
//! state.

/// Approval engine
pub mod approval;
/// Per-item isolated batch approve and revert
pub mod batch;
/// Duplicate pending change detection
pub mod conflict;
/// Telemetry profile entry add/remove proposals
pub mod entries;
/// Typed forward and inverse entity mutations
pub mod mutation;
/// Recovery of interrupted approve and revert operations
pub mod reconcile;
/// Revert engine
pub mod revert;
/// Grouping, filtering, and paging for review listings
pub mod search;
/// Change submission and cancellation
pub mod submit;
/// Structural validation of change records
pub mod validation;

use std::sync::Arc;

use changeflow_core::constants::{defaults, http};
use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{ApprovedChange, Change, ManagedEntity};
use tokio::sync::Mutex;

pub use batch::BatchReport;
pub use mutation::EntityMutation;
pub use search::GroupedPage;

use crate::database::{RecordStore, TypedRecords};
use crate::entities::EntityStore;

/// Settings a workflow needs, passed in at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Application type assigned when neither change nor request names one
    pub default_application_type: String,
    /// Page size used by filtered listings when the request omits it
    pub default_page_size: usize,
    /// Upper bound for any requested page size
    pub max_page_size: usize,
    /// Lower-cased header carrying the caller identity
    pub user_header: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_application_type: defaults::APPLICATION_TYPE.to_owned(),
            default_page_size: defaults::PAGE_SIZE,
            max_page_size: defaults::MAX_PAGE_SIZE,
            user_header: http::USER_HEADER.to_owned(),
        }
    }
}

/// Change-approval workflow for one entity kind
pub struct ChangeWorkflow<E: ManagedEntity> {
    records: Arc<dyn RecordStore>,
    entities: Arc<dyn EntityStore<E>>,
    config: WorkflowConfig,
    write_lock: Mutex<()>,
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Create a workflow over the given change record store and entity adapter
    #[must_use]
    pub fn new(
        records: Arc<dyn RecordStore>,
        entities: Arc<dyn EntityStore<E>>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            records,
            entities,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Workflow configuration
    #[must_use]
    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Entity adapter the workflow applies changes through
    #[must_use]
    pub fn entities(&self) -> &dyn EntityStore<E> {
        self.entities.as_ref()
    }

    /// Pending change by id
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails
    pub async fn get_change(&self, id: &str) -> AppResult<Option<Change<E>>> {
        match self.pending_record(id).await? {
            Some(change) if change.state.is_in_flight() => {
                self.reconcile().await?;
                self.pending_record(id).await
            }
            other => Ok(other),
        }
    }

    /// Approved change by id
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails
    pub async fn get_approved_change(&self, id: &str) -> AppResult<Option<ApprovedChange<E>>> {
        match self.approved_record(id).await? {
            Some(approved) if approved.change.state.is_in_flight() => {
                self.reconcile().await?;
                self.approved_record(id).await
            }
            other => Ok(other),
        }
    }

    /// Every pending change, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails
    pub async fn all_changes(&self) -> AppResult<Vec<Change<E>>> {
        let mut changes = self.pending_records().await?;
        if changes.iter().any(|change| change.state.is_in_flight()) {
            self.reconcile().await?;
            changes = self.pending_records().await?;
        }
        Ok(changes)
    }

    /// Every approved change, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails
    pub async fn all_approved_changes(&self) -> AppResult<Vec<ApprovedChange<E>>> {
        let mut approved = self.approved_records().await?;
        if approved.iter().any(|record| record.change.state.is_in_flight()) {
            self.reconcile().await?;
            approved = self.approved_records().await?;
        }
        Ok(approved)
    }

    /// Pending changes targeting `entity_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails
    pub async fn changes_by_entity_id(&self, entity_id: &str) -> AppResult<Vec<Change<E>>> {
        Ok(self
            .all_changes()
            .await?
            .into_iter()
            .filter(|change| change.entity_id == entity_id)
            .collect())
    }

    async fn pending_record(&self, id: &str) -> AppResult<Option<Change<E>>> {
        self.records.load(E::PENDING_TABLE, id).await
    }

    async fn approved_record(&self, id: &str) -> AppResult<Option<ApprovedChange<E>>> {
        self.records.load(E::APPROVED_TABLE, id).await
    }

    async fn pending_records(&self) -> AppResult<Vec<Change<E>>> {
        let mut changes: Vec<Change<E>> = self.records.load_all(E::PENDING_TABLE).await?;
        changes.sort_by(|a, b| a.updated.cmp(&b.updated).then_with(|| a.id.cmp(&b.id)));
        Ok(changes)
    }

    async fn approved_records(&self) -> AppResult<Vec<ApprovedChange<E>>> {
        let mut approved: Vec<ApprovedChange<E>> =
            self.records.load_all(E::APPROVED_TABLE).await?;
        approved.sort_by(|a, b| {
            a.change
                .updated
                .cmp(&b.change.updated)
                .then_with(|| a.change.id.cmp(&b.change.id))
        });
        Ok(approved)
    }

    async fn put_pending(&self, change: &Change<E>) -> AppResult<()> {
        self.records.store(E::PENDING_TABLE, &change.id, change).await
    }

    async fn put_approved(&self, approved: &ApprovedChange<E>) -> AppResult<()> {
        self.records
            .store(E::APPROVED_TABLE, &approved.change.id, approved)
            .await
    }

    async fn remove_pending(&self, id: &str) -> AppResult<bool> {
        self.records.delete_one(E::PENDING_TABLE, id).await
    }

    async fn remove_approved(&self, id: &str) -> AppResult<bool> {
        self.records.delete_one(E::APPROVED_TABLE, id).await
    }
}

fn change_not_found(id: &str) -> AppError {
    AppError::not_found(format!("Change with id: {id} does not exist")).with_resource_id(id)
}

fn approved_change_not_found(id: &str) -> AppError {
    AppError::not_found(format!("Approved change with id: {id} does not exist"))
        .with_resource_id(id)
}
