// ABOUTME: Data models for change records and managed configuration entities
// ABOUTME: Re-exports the change, approved change, and telemetry profile types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

/// Pending and approved change records
pub mod change;

/// Managed entity contract shared by every variant
pub mod entity;

/// Telemetry profile and telemetry-two profile entities
pub mod telemetry;

pub use change::{ApprovedChange, Change, ChangeOperation, ChangeRecord, ChangeState};
pub use entity::{EntityType, ManagedEntity};
pub use telemetry::{PermanentTelemetryProfile, TelemetryElement, TelemetryTwoProfile};
