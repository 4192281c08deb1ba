// ABOUTME: Batch approve and revert with per-item failure isolation
// ABOUTME: Collects an id to message map instead of aborting on the first error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::collections::BTreeMap;

use changeflow_core::constants::messages::UNABLE_TO_EXTRACT_CHANGE_IDS;
use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::ManagedEntity;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::ChangeWorkflow;
use crate::middleware::RequestContext;

/// Outcome of a batch operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Ids processed successfully, in request order
    pub processed: Vec<String>,
    /// Failure message per id
    pub errors: BTreeMap<String, String>,
}

impl BatchReport {
    fn record(&mut self, id: &str, outcome: AppResult<()>) {
        match outcome {
            Ok(()) => self.processed.push(id.to_owned()),
            Err(err) => {
                self.errors.insert(id.to_owned(), err.message);
            }
        }
    }

    /// Whether every item failed
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.processed.is_empty() && !self.errors.is_empty()
    }

    fn into_result(self, action: &str) -> AppResult<Self> {
        if self.all_failed() {
            let details = json!({ "errors": self.errors });
            return Err(
                AppError::invalid_input(format!("No change could be {action}")).with_details(details)
            );
        }
        Ok(self)
    }
}

fn require_ids(ids: &[String]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::invalid_input(UNABLE_TO_EXTRACT_CHANGE_IDS));
    }
    Ok(())
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Approve each id in order, recording failures per id
    ///
    /// The write lock is taken per item so a long batch does not starve other
    /// writers.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error only when `ids` is empty
    pub async fn approve_each(&self, ctx: &RequestContext, ids: &[String]) -> AppResult<BatchReport> {
        require_ids(ids)?;
        let mut report = BatchReport::default();
        for id in ids {
            let outcome = self.approve(ctx, id).await.map(|_| ());
            if let Err(err) = &outcome {
                warn!(change_id = %id, error = %err, "Batch approval item failed");
            }
            report.record(id, outcome);
        }
        info!(
            entity_type = %E::ENTITY_TYPE,
            processed = report.processed.len(),
            failed = report.errors.len(),
            "Batch approval finished"
        );
        Ok(report)
    }

    /// [`Self::approve_each`], failing when no item succeeded
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when `ids` is empty or every item
    /// failed; the per-id messages are attached as details
    pub async fn approve_changes(&self, ctx: &RequestContext, ids: &[String]) -> AppResult<BatchReport> {
        self.approve_each(ctx, ids).await?.into_result("approved")
    }

    /// Revert each id in order, recording failures per id
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error only when `ids` is empty
    pub async fn revert_each(&self, ctx: &RequestContext, ids: &[String]) -> AppResult<BatchReport> {
        require_ids(ids)?;
        let mut report = BatchReport::default();
        for id in ids {
            let outcome = self.revert(ctx, id).await.map(|_| ());
            if let Err(err) = &outcome {
                warn!(change_id = %id, error = %err, "Batch revert item failed");
            }
            report.record(id, outcome);
        }
        info!(
            entity_type = %E::ENTITY_TYPE,
            processed = report.processed.len(),
            failed = report.errors.len(),
            "Batch revert finished"
        );
        Ok(report)
    }

    /// [`Self::revert_each`], failing when no item succeeded
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when `ids` is empty or every item
    /// failed
    pub async fn revert_changes(&self, ctx: &RequestContext, ids: &[String]) -> AppResult<BatchReport> {
        self.revert_each(ctx, ids).await?.into_result("reverted")
    }
}
