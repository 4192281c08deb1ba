// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging, workflow context, router, and profile builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `changeflow`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::{Arc, Once};
use std::time::Duration;

use axum::Router;
use changeflow::{
    changes::WorkflowConfig,
    database::{InMemoryRecordStore, RecordStore},
    middleware::RequestContext,
    models::{PermanentTelemetryProfile, TelemetryElement, TelemetryTwoProfile},
    routes::{build_router, ServerContext},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Both workflows over one fresh in-memory record store
pub fn create_test_context() -> ServerContext {
    init_test_logging();
    let records: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    ServerContext::from_records(records, WorkflowConfig::default())
}

/// Both workflows over `records`, for tests that inspect or break the store
pub fn create_test_context_with(records: Arc<dyn RecordStore>) -> ServerContext {
    init_test_logging();
    ServerContext::from_records(records, WorkflowConfig::default())
}

/// Full application router over `context`
pub fn create_test_router(context: &ServerContext) -> Router {
    build_router(context, Duration::from_secs(5))
}

/// Request context for a named reviewer
pub fn as_user(user: &str) -> RequestContext {
    RequestContext::new(user)
}

/// Valid telemetry 2.0 profile
pub fn telemetry_two_profile(id: &str, name: &str) -> TelemetryTwoProfile {
    TelemetryTwoProfile {
        id: id.to_owned(),
        name: name.to_owned(),
        jsonconfig: format!(r#"{{"Description":"{name}"}}"#),
        application_type: "stb".to_owned(),
    }
}

/// Telemetry entry distinguished by its header
pub fn telemetry_entry(header: &str) -> TelemetryElement {
    TelemetryElement {
        id: String::new(),
        header: header.to_owned(),
        content: format!("{header}_content"),
        element_type: "<event>".to_owned(),
        polling_frequency: "0".to_owned(),
        component: String::new(),
    }
}

/// Valid permanent telemetry profile with one entry per header
pub fn permanent_profile(id: &str, name: &str, headers: &[&str]) -> PermanentTelemetryProfile {
    PermanentTelemetryProfile {
        id: id.to_owned(),
        name: name.to_owned(),
        application_type: "stb".to_owned(),
        profile_type: "PermanentTelemetry".to_owned(),
        schedule: "*/15 * * * *".to_owned(),
        upload_protocol: "HTTP".to_owned(),
        upload_repository: "https://upload.example.com".to_owned(),
        telemetry_profile: headers.iter().map(|header| telemetry_entry(header)).collect(),
    }
}
