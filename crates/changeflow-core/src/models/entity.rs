// ABOUTME: ManagedEntity trait describing a configuration object under change control
// ABOUTME: Supplies identity, display name, emptiness, business rules, and table names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::fmt::{self, Debug, Display};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

/// Tag identifying the kind of managed entity a change targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// Permanent telemetry profile
    #[serde(rename = "TELEMETRY_PROFILE")]
    TelemetryProfile,
    /// Telemetry 2.0 profile
    #[serde(rename = "TELEMETRY_TWO_PROFILE")]
    TelemetryTwoProfile,
}

impl EntityType {
    /// Wire name of the tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TelemetryProfile => "TELEMETRY_PROFILE",
            Self::TelemetryTwoProfile => "TELEMETRY_TWO_PROFILE",
        }
    }

    /// Human readable label used in messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TelemetryProfile => "Telemetry Profile",
            Self::TelemetryTwoProfile => "Telemetry 2.0 Profile",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration object whose mutations go through the approval workflow
///
/// Implementors are plain serde structs. The default value of the struct is
/// treated as "empty" by the change validator, so a deserialized `{}` payload
/// never counts as a real snapshot.
pub trait ManagedEntity:
    Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Tag written into every change for this entity kind
    const ENTITY_TYPE: EntityType;
    /// Record store table holding live entities
    const ENTITY_TABLE: &'static str;
    /// Record store table holding pending changes
    const PENDING_TABLE: &'static str;
    /// Record store table holding approved changes
    const APPROVED_TABLE: &'static str;

    /// Entity identifier
    fn id(&self) -> &str;

    /// Replace the entity identifier
    fn set_id(&mut self, id: String);

    /// Name shown to reviewers and matched by search filters
    fn display_name(&self) -> &str;

    /// Partition tag of the entity
    fn application_type(&self) -> &str;

    /// Whether this snapshot carries no content
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Entity-level business rules checked before a change is submitted
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error describing the first broken rule
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}
