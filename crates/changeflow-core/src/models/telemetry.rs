// ABOUTME: Telemetry profile entities managed through the approval workflow
// ABOUTME: Permanent telemetry profiles with entries and telemetry 2.0 JSON profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::entity::{EntityType, ManagedEntity};
use crate::constants::{messages, tables};
use crate::errors::{AppError, AppResult};

/// One collected data point of a permanent telemetry profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryElement {
    /// Entry identifier
    #[serde(default)]
    pub id: String,
    /// Marker header reported by the device
    #[serde(default)]
    pub header: String,
    /// Content to collect
    #[serde(default)]
    pub content: String,
    /// Collection type
    #[serde(default, rename = "type")]
    pub element_type: String,
    /// Polling frequency in seconds, as sent by the UI
    #[serde(default)]
    pub polling_frequency: String,
    /// Owning component
    #[serde(default)]
    pub component: String,
}

impl TelemetryElement {
    /// Equality that ignores the entry id
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        self.header == other.header
            && self.content == other.content
            && self.element_type == other.element_type
            && self.polling_frequency == other.polling_frequency
            && self.component == other.component
    }
}

impl Display for TelemetryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{header: {}, content: {}, type: {}, pollingFrequency: {}}}",
            self.header, self.content, self.element_type, self.polling_frequency
        )
    }
}

/// Permanent telemetry profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermanentTelemetryProfile {
    /// Profile identifier
    #[serde(default)]
    pub id: String,
    /// Profile name
    #[serde(default)]
    pub name: String,
    /// Partition tag
    #[serde(default)]
    pub application_type: String,
    /// Profile type marker
    #[serde(default, rename = "type")]
    pub profile_type: String,
    /// Cron-like upload schedule
    #[serde(default)]
    pub schedule: String,
    /// Upload protocol (HTTP, TFTP, ...)
    #[serde(default)]
    pub upload_protocol: String,
    /// Upload destination
    #[serde(default)]
    pub upload_repository: String,
    /// Collected entries
    #[serde(default)]
    pub telemetry_profile: Vec<TelemetryElement>,
}

impl PermanentTelemetryProfile {
    /// First entry that duplicates an earlier one, ignoring ids
    #[must_use]
    pub fn duplicated_entry(&self) -> Option<&TelemetryElement> {
        self.telemetry_profile.iter().enumerate().find_map(|(idx, entry)| {
            self.telemetry_profile[..idx]
                .iter()
                .any(|earlier| earlier.same_definition(entry))
                .then_some(entry)
        })
    }

    /// Whether an entry with the same definition is present
    #[must_use]
    pub fn contains_entry(&self, entry: &TelemetryElement) -> bool {
        self.telemetry_profile
            .iter()
            .any(|existing| existing.same_definition(entry))
    }
}

impl ManagedEntity for PermanentTelemetryProfile {
    const ENTITY_TYPE: EntityType = EntityType::TelemetryProfile;
    const ENTITY_TABLE: &'static str = tables::PERMANENT_TELEMETRY;
    const PENDING_TABLE: &'static str = tables::PENDING_CHANGES;
    const APPROVED_TABLE: &'static str = tables::APPROVED_CHANGES;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn application_type(&self) -> &str {
        &self.application_type
    }

    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input(messages::NAME_IS_EMPTY));
        }
        if let Some(entry) = self.duplicated_entry() {
            return Err(AppError::invalid_input(format!(
                "Profile has duplicated telemetry entry: {entry}"
            )));
        }
        Ok(())
    }
}

/// Telemetry 2.0 profile carrying an opaque JSON configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryTwoProfile {
    /// Profile identifier
    #[serde(default)]
    pub id: String,
    /// Profile name
    #[serde(default)]
    pub name: String,
    /// Raw JSON configuration delivered to devices
    #[serde(default)]
    pub jsonconfig: String,
    /// Partition tag
    #[serde(default)]
    pub application_type: String,
}

impl ManagedEntity for TelemetryTwoProfile {
    const ENTITY_TYPE: EntityType = EntityType::TelemetryTwoProfile;
    const ENTITY_TABLE: &'static str = tables::TELEMETRY_TWO_PROFILES;
    const PENDING_TABLE: &'static str = tables::PENDING_TELEMETRY_TWO_CHANGES;
    const APPROVED_TABLE: &'static str = tables::APPROVED_TELEMETRY_TWO_CHANGES;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn application_type(&self) -> &str {
        &self.application_type
    }

    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input(messages::NAME_IS_EMPTY));
        }
        if self.jsonconfig.trim().is_empty() {
            return Err(AppError::invalid_input("JSON config is empty"));
        }
        Ok(())
    }
}
