// ABOUTME: Structural validation of pending and approved change records
// ABOUTME: Rejects blank identifiers and missing snapshots before persist or approval
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{ApprovedChange, Change, ChangeOperation, ManagedEntity};

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn empty<E: ManagedEntity>(entity: Option<&E>) -> bool {
    entity.map_or(true, ManagedEntity::is_empty)
}

/// Check the structural invariants of a change
///
/// # Errors
///
/// Returns an invalid-input error naming the first broken rule
pub fn validate_change<E: ManagedEntity>(change: Option<&Change<E>>) -> AppResult<()> {
    let change = change.ok_or_else(|| AppError::invalid_input("Change is empty"))?;

    if blank(&change.id) {
        return Err(AppError::invalid_input("Change id is empty"));
    }
    if blank(&change.author) {
        return Err(AppError::invalid_input("Author is empty"));
    }
    if blank(&change.entity_id) {
        return Err(AppError::invalid_input("Entity id is empty"));
    }
    let operation = change
        .operation
        .ok_or_else(|| AppError::invalid_input("Operation is empty"))?;

    let old_empty = empty(change.old_entity.as_ref());
    let new_empty = empty(change.new_entity.as_ref());
    match operation {
        ChangeOperation::Create if new_empty => {
            Err(AppError::invalid_input("New entity is empty"))
        }
        ChangeOperation::Delete if old_empty => {
            Err(AppError::invalid_input("Old entity is empty"))
        }
        ChangeOperation::Update if old_empty || new_empty => Err(AppError::invalid_input(
            "Update requires both old and new entity",
        )),
        _ => Ok(()),
    }
}

/// [`validate_change`] plus the approver identity
///
/// # Errors
///
/// Returns an invalid-input error naming the first broken rule
pub fn validate_approved_change<E: ManagedEntity>(
    approved: Option<&ApprovedChange<E>>,
) -> AppResult<()> {
    let approved = approved.ok_or_else(|| AppError::invalid_input("Change is empty"))?;
    validate_change(Some(&approved.change))?;
    if blank(&approved.approved_user) {
        return Err(AppError::invalid_input("Approved user is empty"));
    }
    Ok(())
}
