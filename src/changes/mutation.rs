// ABOUTME: Typed entity mutations derived from a change and its inverse
// ABOUTME: Applies create/replace/remove through the entity adapter with state checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{Change, ChangeOperation, ManagedEntity};

use crate::entities::EntityStore;

/// Effect of a change on the live entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityMutation<E> {
    /// Persist an entity that must not exist yet
    Create(E),
    /// Persist an entity, replacing whatever is stored
    Replace(E),
    /// Remove the entity, which must exist
    Remove(E),
}

impl<E: ManagedEntity> EntityMutation<E> {
    /// Effect of approving `change`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the change lacks the snapshot its
    /// operation needs
    pub fn forward(change: &Change<E>) -> AppResult<Self> {
        Ok(match operation(change)? {
            ChangeOperation::Create => Self::Create(snapshot(change, change.new_entity.as_ref())?),
            ChangeOperation::Update => Self::Replace(snapshot(change, change.new_entity.as_ref())?),
            ChangeOperation::Delete => Self::Remove(snapshot(change, change.old_entity.as_ref())?),
        })
    }

    /// Effect of reverting an approved `change`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the change lacks the snapshot its
    /// operation needs
    pub fn inverse(change: &Change<E>) -> AppResult<Self> {
        Ok(match operation(change)? {
            ChangeOperation::Create => Self::Remove(snapshot(change, change.new_entity.as_ref())?),
            ChangeOperation::Update => Self::Replace(snapshot(change, change.old_entity.as_ref())?),
            ChangeOperation::Delete => Self::Create(snapshot(change, change.old_entity.as_ref())?),
        })
    }

    /// Entity this mutation writes or removes
    #[must_use]
    pub const fn entity(&self) -> &E {
        match self {
            Self::Create(entity) | Self::Replace(entity) | Self::Remove(entity) => entity,
        }
    }

    /// Apply the mutation
    ///
    /// # Errors
    ///
    /// Returns a conflict error when the stored state contradicts the
    /// mutation, the adapter's in-use error on a vetoed removal, or a store
    /// error
    pub async fn apply(&self, store: &dyn EntityStore<E>) -> AppResult<()> {
        let id = self.entity().id();
        match self {
            Self::Create(entity) => {
                if store.load(id).await?.is_some() {
                    return Err(AppError::conflict(format!(
                        "{} with id: {id} already exists",
                        E::ENTITY_TYPE.label()
                    ))
                    .with_resource_id(id));
                }
                store.save(entity).await
            }
            Self::Replace(entity) => store.save(entity).await,
            Self::Remove(_) => {
                let current = store.load(id).await?.ok_or_else(|| {
                    AppError::conflict(format!(
                        "{} with id: {id} does not exist",
                        E::ENTITY_TYPE.label()
                    ))
                    .with_resource_id(id)
                })?;
                store.check_deletable(&current).await?;
                store.delete(id).await?;
                Ok(())
            }
        }
    }

    /// Whether the entity store already reflects this mutation
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn is_applied(&self, store: &dyn EntityStore<E>) -> AppResult<bool> {
        let current = store.load(self.entity().id()).await?;
        Ok(match self {
            Self::Create(entity) | Self::Replace(entity) => current.as_ref() == Some(entity),
            Self::Remove(_) => current.is_none(),
        })
    }
}

fn operation<E>(change: &Change<E>) -> AppResult<ChangeOperation> {
    change
        .operation
        .ok_or_else(|| AppError::invalid_input("Operation is empty"))
}

fn snapshot<E: ManagedEntity>(change: &Change<E>, entity: Option<&E>) -> AppResult<E> {
    let mut entity = entity.cloned().ok_or_else(|| {
        AppError::invalid_input(format!(
            "Change {} has no entity snapshot for {}",
            change.id,
            change.operation.map_or_else(String::new, |op| op.to_string())
        ))
    })?;
    entity.set_id(change.entity_id.clone());
    Ok(entity)
}
