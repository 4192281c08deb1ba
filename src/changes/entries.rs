// ABOUTME: Entry-level proposals for permanent telemetry profiles
// ABOUTME: Turns entry add/remove requests into full-snapshot update changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use changeflow_core::constants::messages::ID_IS_EMPTY;
use changeflow_core::errors::{AppError, AppResult};
use changeflow_core::models::{
    Change, EntityType, ManagedEntity, PermanentTelemetryProfile, TelemetryElement,
};

use super::ChangeWorkflow;
use crate::middleware::RequestContext;

impl ChangeWorkflow<PermanentTelemetryProfile> {
    async fn live_profile(&self, profile_id: &str) -> AppResult<PermanentTelemetryProfile> {
        if profile_id.trim().is_empty() {
            return Err(AppError::invalid_input(ID_IS_EMPTY));
        }
        self.entities.load(profile_id).await?.ok_or_else(|| {
            AppError::not_found(format!(
                "{} with id: {profile_id} does not exist",
                EntityType::TelemetryProfile.label()
            ))
            .with_resource_id(profile_id)
        })
    }

    /// Propose adding `entries` to the live profile
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id or empty entry list, a
    /// not-found error for an unknown profile, a conflict error when an entry
    /// is already present, or any submit error
    pub async fn propose_entry_add(
        &self,
        ctx: &RequestContext,
        profile_id: &str,
        entries: Vec<TelemetryElement>,
    ) -> AppResult<Change<PermanentTelemetryProfile>> {
        let current = self.live_profile(profile_id).await?;
        if entries.is_empty() {
            return Err(AppError::invalid_input("Telemetry Profile entries are empty"));
        }

        let mut updated = current.clone();
        for entry in entries {
            if updated.contains_entry(&entry) {
                return Err(AppError::conflict(format!(
                    "Telemetry Profile entry already exists: {entry}"
                ))
                .with_resource_id(profile_id));
            }
            updated.telemetry_profile.push(entry);
        }
        updated.validate()?;

        self.submit(ctx, Change::update(current, updated, &ctx.user)).await
    }

    /// Propose removing `entries` from the live profile
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a blank id or empty entry list, a
    /// not-found error for an unknown profile or absent entry, or any submit
    /// error
    pub async fn propose_entry_remove(
        &self,
        ctx: &RequestContext,
        profile_id: &str,
        entries: Vec<TelemetryElement>,
    ) -> AppResult<Change<PermanentTelemetryProfile>> {
        let current = self.live_profile(profile_id).await?;
        if entries.is_empty() {
            return Err(AppError::invalid_input("Telemetry Profile entries are empty"));
        }

        let mut updated = current.clone();
        for entry in &entries {
            let Some(position) = updated
                .telemetry_profile
                .iter()
                .position(|existing| existing.same_definition(entry))
            else {
                return Err(AppError::not_found(format!(
                    "Telemetry Profile entry does not exist: {entry}"
                ))
                .with_resource_id(profile_id));
            };
            updated.telemetry_profile.remove(position);
        }

        self.submit(ctx, Change::update(current, updated, &ctx.user)).await
    }
}
