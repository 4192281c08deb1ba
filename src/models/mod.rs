// ABOUTME: Change records and managed entities re-exported from changeflow-core
// ABOUTME: Re-exports Change, ApprovedChange, and the telemetry profile entities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! # Data Models
//!
//! - `Change` / `ApprovedChange`: a proposed mutation and its applied record
//! - `ManagedEntity`: contract every entity under change control implements
//! - `PermanentTelemetryProfile`, `TelemetryTwoProfile`: the managed entities

pub use changeflow_core::models::*;
