// ABOUTME: Generic change review route handlers shared by every entity kind
// ABOUTME: Listing, grouping, filtering, approve/cancel/revert, and batch endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! Change review routes
//!
//! [`ChangeRoutes::routes`] builds one router per entity kind; the server
//! mounts it under the prefix of that kind. Handlers are thin: they parse
//! paging parameters and bodies, then delegate to [`ChangeWorkflow`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use changeflow_core::constants::http::{NUMBER_OF_ITEMS_HEADER, PAGE_NUMBER, PAGE_SIZE};
use changeflow_core::constants::messages::{
    UNABLE_TO_EXTRACT_CHANGE_IDS, UNABLE_TO_EXTRACT_SEARCH_CONTEXT,
};
use changeflow_core::errors::AppError;
use changeflow_core::models::ManagedEntity;
use changeflow_core::pagination::PageRequest;
use serde::Serialize;

use crate::changes::ChangeWorkflow;
use crate::middleware::RequestContext;

type WorkflowState<E> = State<Arc<ChangeWorkflow<E>>>;

/// Change review routes
pub struct ChangeRoutes;

impl ChangeRoutes {
    /// Create all change review routes for one entity kind
    pub fn routes<E: ManagedEntity>(workflow: Arc<ChangeWorkflow<E>>) -> Router {
        Router::new()
            .route("/changes", get(Self::handle_list_changes::<E>))
            .route("/changes/filtered", post(Self::handle_filtered_changes::<E>))
            .route("/approved", get(Self::handle_list_approved::<E>))
            .route("/approved/filtered", post(Self::handle_filtered_approved::<E>))
            .route("/grouped", get(Self::handle_grouped_changes::<E>))
            .route("/groupedApproved", get(Self::handle_grouped_approved::<E>))
            .route("/entityIds", get(Self::handle_entity_ids::<E>))
            .route(
                "/approve/:change_id",
                get(Self::handle_approve::<E>).post(Self::handle_approve::<E>),
            )
            .route(
                "/cancel/:change_id",
                get(Self::handle_cancel::<E>).post(Self::handle_cancel::<E>),
            )
            .route(
                "/revert/:approve_id",
                get(Self::handle_revert::<E>).post(Self::handle_revert::<E>),
            )
            .route("/approveEntities", post(Self::handle_approve_batch::<E>))
            .route("/revertEntities", post(Self::handle_revert_batch::<E>))
            .with_state(workflow)
    }

    async fn handle_list_changes<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
    ) -> Result<Response, AppError> {
        let changes = workflow.all_changes().await?;
        Ok((StatusCode::OK, Json(changes)).into_response())
    }

    async fn handle_list_approved<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
    ) -> Result<Response, AppError> {
        let approved = workflow.all_approved_changes().await?;
        Ok((StatusCode::OK, Json(approved)).into_response())
    }

    async fn handle_filtered_changes<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Query(params): Query<HashMap<String, String>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let page = optional_page(&workflow, &params)?;
        let filters = parse_search_context(&body)?;
        let result = workflow.filtered_changes(&filters, page).await?;
        Ok(with_total(result.total, result.items))
    }

    async fn handle_filtered_approved<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        Query(params): Query<HashMap<String, String>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let page = optional_page(&workflow, &params)?;
        let filters = parse_search_context(&body)?;
        let application_type = ctx.application_type_or(&workflow.config().default_application_type);
        let result = workflow
            .filtered_approved_changes(application_type, &filters, page)
            .await?;
        Ok(with_total(result.total, result.items))
    }

    async fn handle_grouped_changes<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Response, AppError> {
        let page = required_page(&workflow, &params)?;
        let grouped = workflow.grouped_changes(page).await?;
        Ok(with_total(grouped.total, grouped.groups))
    }

    async fn handle_grouped_approved<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Response, AppError> {
        let page = required_page(&workflow, &params)?;
        let grouped = workflow.grouped_approved_changes(page).await?;
        Ok(with_total(grouped.total, grouped.groups))
    }

    async fn handle_entity_ids<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
    ) -> Result<Response, AppError> {
        let ids = workflow.changed_entity_ids().await?;
        Ok((StatusCode::OK, Json(ids)).into_response())
    }

    async fn handle_approve<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        Path(change_id): Path<String>,
    ) -> Result<Response, AppError> {
        let approved = workflow
            .approve(&ctx, &change_id)
            .await
            .map_err(|e| e.with_request_id(&ctx.request_id))?;
        Ok((StatusCode::OK, Json(approved)).into_response())
    }

    async fn handle_cancel<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        Path(change_id): Path<String>,
    ) -> Result<Response, AppError> {
        let cancelled = workflow
            .cancel(&change_id)
            .await
            .map_err(|e| e.with_request_id(&ctx.request_id))?;
        Ok((StatusCode::OK, Json(cancelled)).into_response())
    }

    async fn handle_revert<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        Path(approve_id): Path<String>,
    ) -> Result<Response, AppError> {
        let reverted = workflow
            .revert(&ctx, &approve_id)
            .await
            .map_err(|e| e.with_request_id(&ctx.request_id))?;
        Ok((StatusCode::OK, Json(reverted)).into_response())
    }

    async fn handle_approve_batch<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let ids = parse_change_ids(&body)?;
        let report = workflow.approve_each(&ctx, &ids).await?;
        Ok((StatusCode::OK, Json(report.errors)).into_response())
    }

    async fn handle_revert_batch<E: ManagedEntity>(
        State(workflow): WorkflowState<E>,
        Extension(ctx): Extension<RequestContext>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let ids = parse_change_ids(&body)?;
        let report = workflow.revert_each(&ctx, &ids).await?;
        Ok((StatusCode::OK, Json(report.errors)).into_response())
    }
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

fn required_page<E: ManagedEntity>(
    workflow: &ChangeWorkflow<E>,
    params: &HashMap<String, String>,
) -> Result<PageRequest, AppError> {
    PageRequest::required(
        param(params, PAGE_NUMBER),
        param(params, PAGE_SIZE),
        workflow.config().max_page_size,
    )
}

fn optional_page<E: ManagedEntity>(
    workflow: &ChangeWorkflow<E>,
    params: &HashMap<String, String>,
) -> Result<PageRequest, AppError> {
    PageRequest::with_defaults(
        param(params, PAGE_NUMBER),
        param(params, PAGE_SIZE),
        workflow.config().default_page_size,
        workflow.config().max_page_size,
    )
}

/// Filter body: a JSON object of strings, or nothing at all
fn parse_search_context(body: &[u8]) -> Result<HashMap<String, String>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(HashMap::new());
    }
    serde_json::from_slice(body).map_err(|e| {
        AppError::invalid_input(UNABLE_TO_EXTRACT_SEARCH_CONTEXT).with_source(e)
    })
}

/// Batch body: a non-empty JSON list of change ids
fn parse_change_ids(body: &[u8]) -> Result<Vec<String>, AppError> {
    let ids: Vec<String> = serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(UNABLE_TO_EXTRACT_CHANGE_IDS).with_source(e))?;
    if ids.is_empty() {
        return Err(AppError::invalid_input(UNABLE_TO_EXTRACT_CHANGE_IDS));
    }
    Ok(ids)
}

fn with_total<T: Serialize>(total: usize, body: T) -> Response {
    (
        StatusCode::OK,
        [(NUMBER_OF_ITEMS_HEADER, total.to_string())],
        Json(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_context_body() {
        assert!(parse_search_context(b"").unwrap().is_empty());
        assert!(parse_search_context(b"  \n").unwrap().is_empty());

        let filters = parse_search_context(br#"{"author":"ali"}"#).unwrap();
        assert_eq!(filters.get("author").map(String::as_str), Some("ali"));

        let err = parse_search_context(b"[1,2]").unwrap_err();
        assert_eq!(err.message, "Unable to extract searchContext");
    }

    #[test]
    fn test_change_ids_body() {
        assert_eq!(parse_change_ids(br#"["a","b"]"#).unwrap(), vec!["a", "b"]);
        assert!(parse_change_ids(b"[]").is_err());
        assert!(parse_change_ids(b"{\"id\":1}").is_err());
        assert!(parse_change_ids(b"").is_err());
    }
}
