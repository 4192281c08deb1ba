// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Builds the RequestContext (request id, caller identity, application type) per request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use changeflow_core::constants::defaults::UNKNOWN_USER;
use changeflow_core::constants::http::{APPLICATION_TYPE, REQUEST_ID_HEADER};
use http::HeaderMap;
use tracing::{field, info_span, Span};
use uuid::Uuid;

use crate::changes::WorkflowConfig;

/// Request context that flows through the workflow operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id
    pub request_id: String,
    /// Caller identity, `UNKNOWN_USER` when the request carried none
    pub user: String,
    /// Application type named by the request, if any
    pub application_type: Option<String>,
}

impl RequestContext {
    /// Create a context for `user` with a generated request id
    ///
    /// A blank `user` resolves to `UNKNOWN_USER`.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            request_id: format!("req_{}", Uuid::new_v4().simple()),
            user: if user.trim().is_empty() {
                UNKNOWN_USER.to_owned()
            } else {
                user
            },
            application_type: None,
        }
    }

    /// Attach an application type
    #[must_use]
    pub fn with_application_type(mut self, application_type: impl Into<String>) -> Self {
        self.application_type = Some(application_type.into());
        self
    }

    /// Application type of the request or `default`
    #[must_use]
    pub fn application_type_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.application_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(default)
    }

    /// Build a context from request headers and query string
    #[must_use]
    pub fn from_request_parts(headers: &HeaderMap, query: Option<&str>, user_header: &str) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        let application_type = query
            .and_then(|raw| Query::<HashMap<String, String>>::try_from_uri(&query_uri(raw)).ok())
            .and_then(|Query(params)| params.get(APPLICATION_TYPE).cloned())
            .filter(|value| !value.trim().is_empty());

        Self {
            request_id: header(REQUEST_ID_HEADER)
                .unwrap_or_else(|| format!("req_{}", Uuid::new_v4().simple())),
            user: header(user_header).unwrap_or_else(|| UNKNOWN_USER.to_owned()),
            application_type,
        }
    }

    /// Record context in current tracing span
    pub fn record_in_span(&self) {
        let span = Span::current();
        span.record("request_id", self.request_id.as_str());
        span.record("user", self.user.as_str());
    }
}

fn query_uri(raw: &str) -> http::Uri {
    format!("/?{raw}").parse().unwrap_or_default()
}

/// Middleware that inserts a [`RequestContext`] into request extensions
pub async fn attach_request_context(
    State(config): State<Arc<WorkflowConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = RequestContext::from_request_parts(
        request.headers(),
        request.uri().query(),
        &config.user_header,
    );
    context.record_in_span();
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Create a tracing span for HTTP requests
pub fn create_request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = field::Empty,
        user = field::Empty,
    )
}
