// ABOUTME: Revert engine undoing an approved change against the entity store
// ABOUTME: Persists REVERTING before the inverse mutation and restores APPROVED on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::errors::AppResult;
use changeflow_core::models::{ApprovedChange, ChangeState, ManagedEntity};
use tracing::{error, info, warn};

use super::mutation::EntityMutation;
use super::{approved_change_not_found, ChangeWorkflow};
use crate::middleware::RequestContext;

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Undo an approved change and delete its record
    ///
    /// Returns the record as it was before the revert.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for a blank or unknown id, or the error
    /// raised by the inverse mutation
    pub async fn revert(&self, ctx: &RequestContext, id: &str) -> AppResult<ApprovedChange<E>> {
        if id.trim().is_empty() {
            return Err(approved_change_not_found(id));
        }
        let _guard = self.write_lock.lock().await;
        self.revert_locked(ctx, id).await
    }

    pub(super) async fn revert_locked(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> AppResult<ApprovedChange<E>> {
        let mut approved = self
            .approved_record(id)
            .await?
            .ok_or_else(|| approved_change_not_found(id))?;

        if approved.change.state.is_in_flight() {
            approved = self
                .reconcile_approved(approved)
                .await?
                .ok_or_else(|| approved_change_not_found(id))?;
        }

        let reverted = approved.clone();
        let mutation = EntityMutation::inverse(&approved.change)?;

        approved.change.state = ChangeState::Reverting;
        approved.change.touch();
        self.put_approved(&approved).await?;

        if let Err(err) = mutation.apply(self.entities.as_ref()).await {
            warn!(
                change_id = %id,
                entity_id = %approved.change.entity_id,
                error = %err,
                "Change revert failed, restoring approved state"
            );
            approved.change.state = ChangeState::Approved;
            approved.change.touch();
            if let Err(reset_err) = self.put_approved(&approved).await {
                error!(
                    change_id = %id,
                    error = %reset_err,
                    "Failed to restore approved state; record left REVERTING for reconciliation"
                );
            }
            return Err(err);
        }

        self.remove_approved(id).await?;

        info!(
            change_id = %id,
            entity_id = %reverted.change.entity_id,
            entity_type = %E::ENTITY_TYPE,
            user = %ctx.user,
            request_id = %ctx.request_id,
            "Change reverted"
        );
        Ok(reverted)
    }
}
