// ABOUTME: Recovery of approve and revert operations interrupted between the two stores
// ABOUTME: Finishes or rolls back records left APPLYING or REVERTING
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::errors::AppResult;
use changeflow_core::models::{ApprovedChange, Change, ChangeState, ManagedEntity};
use serde::Serialize;
use tracing::{debug, info};

use super::mutation::EntityMutation;
use super::ChangeWorkflow;

/// Approver written when an interrupted approval recorded none
const RECOVERY_USER: &str = "system";

/// Where an in-flight pending record ended up
#[derive(Debug)]
pub(super) enum PendingOutcome<E> {
    /// The approval had completed; the pending record is gone
    Approved(ApprovedChange<E>),
    /// The approval never reached the entity store; the record is pending again
    Pending(Change<E>),
}

/// Counts of in-flight records resolved by one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Approvals found applied and finished
    pub approvals_completed: usize,
    /// Approvals found unapplied and reset to pending
    pub approvals_rolled_back: usize,
    /// Reverts found applied and finished
    pub reverts_completed: usize,
    /// Reverts found unapplied and reset to approved
    pub reverts_rolled_back: usize,
}

impl ReconcileReport {
    /// Whether the pass found nothing to do
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.approvals_completed == 0
            && self.approvals_rolled_back == 0
            && self.reverts_completed == 0
            && self.reverts_rolled_back == 0
    }
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Resolve every record left in an in-flight state
    ///
    /// Safe to run at any time; a pass with nothing in flight only reads.
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn reconcile(&self) -> AppResult<ReconcileReport> {
        let _guard = self.write_lock.lock().await;
        let mut report = ReconcileReport::default();

        for change in self.pending_records().await? {
            if !change.state.is_in_flight() {
                continue;
            }
            match self.reconcile_pending(change).await? {
                PendingOutcome::Approved(_) => report.approvals_completed += 1,
                PendingOutcome::Pending(_) => report.approvals_rolled_back += 1,
            }
        }

        for approved in self.approved_records().await? {
            if !approved.change.state.is_in_flight() {
                continue;
            }
            if self.reconcile_approved(approved).await?.is_some() {
                report.reverts_rolled_back += 1;
            } else {
                report.reverts_completed += 1;
            }
        }

        if report.is_empty() {
            debug!(entity_type = %E::ENTITY_TYPE, "Nothing to reconcile");
        } else {
            info!(
                entity_type = %E::ENTITY_TYPE,
                approvals_completed = report.approvals_completed,
                approvals_rolled_back = report.approvals_rolled_back,
                reverts_completed = report.reverts_completed,
                reverts_rolled_back = report.reverts_rolled_back,
                "Reconciled in-flight changes"
            );
        }
        Ok(report)
    }

    /// Resolve one pending record found `APPLYING`; caller holds the write lock
    pub(super) async fn reconcile_pending(
        &self,
        mut change: Change<E>,
    ) -> AppResult<PendingOutcome<E>> {
        if let Some(approved) = self.approved_record(&change.id).await? {
            self.remove_pending(&change.id).await?;
            return Ok(PendingOutcome::Approved(approved));
        }

        if EntityMutation::forward(&change)?
            .is_applied(self.entities.as_ref())
            .await?
        {
            let approver = change
                .approving_user
                .clone()
                .filter(|user| !user.trim().is_empty())
                .unwrap_or_else(|| RECOVERY_USER.to_owned());
            let mut approved = change.into_approved(approver);
            approved.change.touch();
            self.put_approved(&approved).await?;
            self.remove_pending(&approved.change.id).await?;
            info!(change_id = %approved.change.id, "Completed interrupted approval");
            return Ok(PendingOutcome::Approved(approved));
        }

        change.state = ChangeState::Pending;
        change.approving_user = None;
        change.touch();
        self.put_pending(&change).await?;
        info!(change_id = %change.id, "Rolled back interrupted approval");
        Ok(PendingOutcome::Pending(change))
    }

    /// Resolve one approved record found `REVERTING`; caller holds the write lock
    ///
    /// Returns the record when it is approved again, `None` when the revert
    /// had already reached the entity store and the record was removed.
    pub(super) async fn reconcile_approved(
        &self,
        mut approved: ApprovedChange<E>,
    ) -> AppResult<Option<ApprovedChange<E>>> {
        if EntityMutation::inverse(&approved.change)?
            .is_applied(self.entities.as_ref())
            .await?
        {
            self.remove_approved(&approved.change.id).await?;
            info!(change_id = %approved.change.id, "Completed interrupted revert");
            return Ok(None);
        }

        approved.change.state = ChangeState::Approved;
        approved.change.touch();
        self.put_approved(&approved).await?;
        info!(change_id = %approved.change.id, "Rolled back interrupted revert");
        Ok(Some(approved))
    }
}
