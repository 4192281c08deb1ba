// ABOUTME: Change and ApprovedChange records moved through the approval workflow
// ABOUTME: Typed snapshots of an entity before and after a proposed mutation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{EntityType, ManagedEntity};

/// Kind of mutation a change proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOperation {
    /// Entity does not exist yet
    Create,
    /// Entity is replaced by a new snapshot
    Update,
    /// Entity is removed
    Delete,
}

impl Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// Persisted sub-state of a change record
///
/// `Applying` and `Reverting` are written before the entity store is touched so
/// an interrupted approve or revert can be detected and reconciled later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeState {
    /// Awaiting review
    #[default]
    Pending,
    /// Approval in flight: entity mutation may or may not have happened
    Applying,
    /// Applied and recorded
    Approved,
    /// Revert in flight: inverse mutation may or may not have happened
    Reverting,
}

impl ChangeState {
    /// Whether the record is mid-transition
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Applying | Self::Reverting)
    }
}

/// A proposed mutation of a managed entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change<E> {
    /// Change identifier, preserved through approval
    #[serde(default)]
    pub id: String,
    /// Identifier of the entity being mutated
    #[serde(default)]
    pub entity_id: String,
    /// Kind of entity being mutated
    pub entity_type: EntityType,
    /// Partition tag
    #[serde(default)]
    pub application_type: String,
    /// Identity that proposed the change
    #[serde(default)]
    pub author: String,
    /// Mutation kind, absent when the submitter left it blank
    #[serde(default)]
    pub operation: Option<ChangeOperation>,
    /// Snapshot before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_entity: Option<E>,
    /// Snapshot after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_entity: Option<E>,
    /// Last persist time
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
    /// Workflow sub-state
    #[serde(default)]
    pub state: ChangeState,
    /// Approver recorded while the change is `APPLYING`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approving_user: Option<String>,
}

impl<E: ManagedEntity> Change<E> {
    fn proposal(
        operation: ChangeOperation,
        entity_id: String,
        application_type: &str,
        author: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_id,
            entity_type: E::ENTITY_TYPE,
            application_type: application_type.to_owned(),
            author: author.to_owned(),
            operation: Some(operation),
            old_entity: None,
            new_entity: None,
            updated: Utc::now(),
            state: ChangeState::Pending,
            approving_user: None,
        }
    }

    /// Propose creating `entity`
    ///
    /// The application type is copied from the entity; the workflow fills in
    /// its configured default when the entity leaves it blank.
    #[must_use]
    pub fn create(entity: E, author: &str) -> Self {
        let mut change = Self::proposal(
            ChangeOperation::Create,
            entity.id().to_owned(),
            entity.application_type(),
            author,
        );
        change.new_entity = Some(entity);
        change
    }

    /// Propose replacing `old` with `new`
    #[must_use]
    pub fn update(old: E, new: E, author: &str) -> Self {
        let mut change = Self::proposal(
            ChangeOperation::Update,
            new.id().to_owned(),
            new.application_type(),
            author,
        );
        change.old_entity = Some(old);
        change.new_entity = Some(new);
        change
    }

    /// Propose deleting `old`
    #[must_use]
    pub fn delete(old: E, author: &str) -> Self {
        let mut change = Self::proposal(
            ChangeOperation::Delete,
            old.id().to_owned(),
            old.application_type(),
            author,
        );
        change.old_entity = Some(old);
        change
    }

    /// Display name of the target entity, preferring the new snapshot
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        self.new_entity
            .as_ref()
            .or(self.old_entity.as_ref())
            .map(ManagedEntity::display_name)
    }

    /// Whether `other` proposes the same mutation with identical payloads
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type
            && self.application_type == other.application_type
            && self.operation == other.operation
            && self.old_entity == other.old_entity
            && self.new_entity == other.new_entity
    }

    /// Stamp the record with the current time
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }

    /// Promote to an approved record carrying the approver identity
    #[must_use]
    pub fn into_approved(mut self, approved_user: impl Into<String>) -> ApprovedChange<E> {
        self.state = ChangeState::Approved;
        self.approving_user = None;
        ApprovedChange {
            change: self,
            approved_user: approved_user.into(),
        }
    }
}

/// A change that has been applied to the live entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "E: serde::de::DeserializeOwned + Default")
)]
pub struct ApprovedChange<E> {
    /// The applied change, same id as the pending record it came from
    #[serde(flatten)]
    pub change: Change<E>,
    /// Identity that approved the change
    #[serde(default)]
    pub approved_user: String,
}

/// Read access shared by pending and approved records
pub trait ChangeRecord<E> {
    /// The underlying change
    fn change(&self) -> &Change<E>;
}

impl<E> ChangeRecord<E> for Change<E> {
    fn change(&self) -> &Change<E> {
        self
    }
}

impl<E> ChangeRecord<E> for ApprovedChange<E> {
    fn change(&self) -> &Change<E> {
        &self.change
    }
}
