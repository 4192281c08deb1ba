// ABOUTME: Conflict detection for pending changes with identical content
// ABOUTME: Compares operation and entity snapshots, not change ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::constants::messages::SAME_CHANGE_EXISTS;
use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{Change, ManagedEntity};

use super::validation::validate_change;
use super::ChangeWorkflow;

/// Reject `candidate` if another pending change proposes the same mutation
///
/// A record with the candidate's own id is ignored so re-saving a change does
/// not conflict with itself.
///
/// # Errors
///
/// Returns a conflict error "The same change already exists"
pub fn validate_no_conflict<E: ManagedEntity>(
    candidate: &Change<E>,
    pending: &[Change<E>],
) -> AppResult<()> {
    match pending
        .iter()
        .find(|existing| existing.id != candidate.id && existing.same_content(candidate))
    {
        Some(existing) => Err(AppError::conflict(SAME_CHANGE_EXISTS).with_resource_id(&existing.id)),
        None => Ok(()),
    }
}

/// Validate every change of a batch and check each against the others
///
/// # Errors
///
/// Returns the first validation or conflict error
pub fn validate_all_changes<E: ManagedEntity>(changes: &[Change<E>]) -> AppResult<()> {
    for (idx, change) in changes.iter().enumerate() {
        validate_change(Some(change))?;
        validate_no_conflict(change, &changes[..idx])?;
    }
    Ok(())
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Check `candidate` against every stored pending change
    ///
    /// # Errors
    ///
    /// Returns a conflict error on duplicate content, or a store error
    pub async fn validate_no_conflict(&self, candidate: &Change<E>) -> AppResult<()> {
        let pending = self.pending_records().await?;
        validate_no_conflict(candidate, &pending)
    }
}
