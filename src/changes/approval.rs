// ABOUTME: Approval engine applying a pending change to the entity store
// ABOUTME: Persists APPLYING before the mutation and rolls the record back on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{ApprovedChange, ChangeState, ManagedEntity};
use tracing::{error, info, warn};

use super::mutation::EntityMutation;
use super::reconcile::PendingOutcome;
use super::validation::validate_approved_change;
use super::{change_not_found, ChangeWorkflow};
use crate::middleware::RequestContext;

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Approve a pending change and apply it to the entity store
    ///
    /// The approver is the caller identity carried by `ctx`. The returned
    /// record keeps the pending change's id.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id or an invalid record, a
    /// not-found error for an unknown id, or the error raised by the entity
    /// mutation (conflict, in-use, store failure)
    pub async fn approve(&self, ctx: &RequestContext, id: &str) -> AppResult<ApprovedChange<E>> {
        if id.trim().is_empty() {
            return Err(AppError::invalid_input("Change id is empty"));
        }
        let _guard = self.write_lock.lock().await;
        self.approve_locked(ctx, id).await
    }

    pub(super) async fn approve_locked(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> AppResult<ApprovedChange<E>> {
        let mut change = self
            .pending_record(id)
            .await?
            .ok_or_else(|| change_not_found(id))?;

        if change.state.is_in_flight() {
            match self.reconcile_pending(change).await? {
                PendingOutcome::Approved(approved) => return Ok(approved),
                PendingOutcome::Pending(reset) => change = reset,
            }
        }

        validate_approved_change(Some(&change.clone().into_approved(ctx.user.as_str())))?;
        let mutation = EntityMutation::forward(&change)?;

        change.state = ChangeState::Applying;
        change.approving_user = Some(ctx.user.clone());
        change.touch();
        self.put_pending(&change).await?;

        if let Err(err) = mutation.apply(self.entities.as_ref()).await {
            warn!(
                change_id = %id,
                entity_id = %change.entity_id,
                error = %err,
                "Change approval failed, restoring pending state"
            );
            change.state = ChangeState::Pending;
            change.approving_user = None;
            change.touch();
            if let Err(reset_err) = self.put_pending(&change).await {
                error!(
                    change_id = %id,
                    error = %reset_err,
                    "Failed to restore pending state; record left APPLYING for reconciliation"
                );
            }
            return Err(err);
        }

        let mut approved = change.into_approved(ctx.user.as_str());
        approved.change.touch();
        self.put_approved(&approved).await?;
        self.remove_pending(id).await?;

        info!(
            change_id = %id,
            entity_id = %approved.change.entity_id,
            entity_type = %E::ENTITY_TYPE,
            approved_user = %approved.approved_user,
            request_id = %ctx.request_id,
            "Change approved"
        );
        Ok(approved)
    }
}
