// ABOUTME: Entity-specific submission routes for telemetry profiles and telemetry 2.0 profiles
// ABOUTME: Turn create/update/delete and entry edits into pending changes, plus live entity lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use changeflow_core::errors::AppError;
use changeflow_core::models::{ManagedEntity, PermanentTelemetryProfile, TelemetryElement};
use serde::de::DeserializeOwned;

use crate::changes::ChangeWorkflow;
use crate::middleware::RequestContext;

/// Submission routes shared by every entity kind
pub struct EntityChangeRoutes;

impl EntityChangeRoutes {
    /// Create/update/delete proposal routes and live lookup for one entity kind
    pub fn routes<E: ManagedEntity>(workflow: Arc<ChangeWorkflow<E>>) -> Router {
        Router::new()
            .route(
                "/change",
                post(Self::handle_propose_create::<E>).put(Self::handle_propose_update::<E>),
            )
            .route("/change/:id", delete(Self::handle_propose_delete::<E>))
            .route("/:id", get(Self::handle_get_entity::<E>))
            .with_state(workflow)
    }

    async fn handle_propose_create<E: ManagedEntity>(
        State(workflow): State<Arc<ChangeWorkflow<E>>>,
        Extension(ctx): Extension<RequestContext>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let entity: E = parse_body(&body, E::ENTITY_TYPE.label())?;
        let change = workflow.propose_create(&ctx, entity).await?;
        Ok((StatusCode::CREATED, Json(change)).into_response())
    }

    async fn handle_propose_update<E: ManagedEntity>(
        State(workflow): State<Arc<ChangeWorkflow<E>>>,
        Extension(ctx): Extension<RequestContext>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let entity: E = parse_body(&body, E::ENTITY_TYPE.label())?;
        let change = workflow.propose_update(&ctx, entity).await?;
        Ok((StatusCode::OK, Json(change)).into_response())
    }

    async fn handle_propose_delete<E: ManagedEntity>(
        State(workflow): State<Arc<ChangeWorkflow<E>>>,
        Extension(ctx): Extension<RequestContext>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let change = workflow.propose_delete(&ctx, &id).await?;
        Ok((StatusCode::OK, Json(change)).into_response())
    }

    async fn handle_get_entity<E: ManagedEntity>(
        State(workflow): State<Arc<ChangeWorkflow<E>>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let entity = workflow.entities().load(&id).await?.ok_or_else(|| {
            AppError::not_found(format!(
                "{} with id: {id} does not exist",
                E::ENTITY_TYPE.label()
            ))
        })?;
        Ok((StatusCode::OK, Json(entity)).into_response())
    }
}

/// Entry add/remove routes, only meaningful for permanent telemetry profiles
pub struct TelemetryEntryRoutes;

impl TelemetryEntryRoutes {
    /// Create the entry proposal routes
    pub fn routes(workflow: Arc<ChangeWorkflow<PermanentTelemetryProfile>>) -> Router {
        Router::new()
            .route("/change/entry/add/:id", put(Self::handle_entry_add))
            .route("/change/entry/remove/:id", put(Self::handle_entry_remove))
            .with_state(workflow)
    }

    async fn handle_entry_add(
        State(workflow): State<Arc<ChangeWorkflow<PermanentTelemetryProfile>>>,
        Extension(ctx): Extension<RequestContext>,
        Path(id): Path<String>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let entries: Vec<TelemetryElement> = parse_body(&body, "telemetry entries")?;
        let change = workflow.propose_entry_add(&ctx, &id, entries).await?;
        Ok((StatusCode::OK, Json(change)).into_response())
    }

    async fn handle_entry_remove(
        State(workflow): State<Arc<ChangeWorkflow<PermanentTelemetryProfile>>>,
        Extension(ctx): Extension<RequestContext>,
        Path(id): Path<String>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let entries: Vec<TelemetryElement> = parse_body(&body, "telemetry entries")?;
        let change = workflow.propose_entry_remove(&ctx, &id, entries).await?;
        Ok((StatusCode::OK, Json(change)).into_response())
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Unable to extract {what}: {e}")))
}
