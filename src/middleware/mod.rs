// ABOUTME: HTTP middleware for request tracing and caller context propagation
// ABOUTME: Provides request ID generation, identity extraction, and span creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

/// Request context and tracing spans
pub mod tracing;

pub use tracing::{attach_request_context, create_request_span, RequestContext};
