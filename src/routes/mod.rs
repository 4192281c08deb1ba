// ABOUTME: Route module organization and router assembly for the admin HTTP service
// ABOUTME: Mounts the change review and entity submission routes for each entity kind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! Route module for the change-approval service
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to [`ChangeWorkflow`]. [`build_router`] wires them
//! together under `/xconfAdminService` with the request id, request context,
//! tracing, CORS, and timeout layers.

/// Generic change review routes
pub mod changes;
/// Health check routes
pub mod health;
/// Entity-specific submission routes
pub mod telemetry_profiles;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use changeflow_core::errors::AppResult;
use changeflow_core::models::{PermanentTelemetryProfile, TelemetryTwoProfile};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::changes::{ChangeWorkflow, WorkflowConfig};
use crate::database::RecordStore;
use crate::entities::KvEntityStore;
use crate::middleware::{attach_request_context, create_request_span};

/// Change review route handlers
pub use changes::ChangeRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Entity submission route handlers
pub use telemetry_profiles::{EntityChangeRoutes, TelemetryEntryRoutes};

/// Prefix shared by every admin route
pub const ADMIN_PREFIX: &str = "/xconfAdminService";

/// Workflows served by one HTTP server
#[derive(Clone)]
pub struct ServerContext {
    /// Permanent telemetry profile workflow
    pub telemetry: Arc<ChangeWorkflow<PermanentTelemetryProfile>>,
    /// Telemetry 2.0 profile workflow
    pub telemetry_two: Arc<ChangeWorkflow<TelemetryTwoProfile>>,
    /// Settings shared by the request context middleware
    pub config: Arc<WorkflowConfig>,
}

impl ServerContext {
    /// Bundle the two workflows with the configuration they were built from
    #[must_use]
    pub fn new(
        telemetry: ChangeWorkflow<PermanentTelemetryProfile>,
        telemetry_two: ChangeWorkflow<TelemetryTwoProfile>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            telemetry: Arc::new(telemetry),
            telemetry_two: Arc::new(telemetry_two),
            config: Arc::new(config),
        }
    }

    /// Build both workflows over one record store, entities included
    #[must_use]
    pub fn from_records(records: Arc<dyn RecordStore>, config: WorkflowConfig) -> Self {
        let telemetry = ChangeWorkflow::new(
            Arc::clone(&records),
            Arc::new(KvEntityStore::<PermanentTelemetryProfile>::new(Arc::clone(&records))),
            config.clone(),
        );
        let telemetry_two = ChangeWorkflow::new(
            Arc::clone(&records),
            Arc::new(KvEntityStore::<TelemetryTwoProfile>::new(records)),
            config.clone(),
        );
        Self::new(telemetry, telemetry_two, config)
    }

    /// Resolve interrupted approvals and reverts of both workflows
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn reconcile(&self) -> AppResult<()> {
        self.telemetry.reconcile().await?;
        self.telemetry_two.reconcile().await?;
        Ok(())
    }
}

/// Assemble the complete application router
pub fn build_router(context: &ServerContext, request_timeout: Duration) -> Router {
    let admin = Router::new()
        .nest("/change", ChangeRoutes::routes(Arc::clone(&context.telemetry)))
        .nest(
            "/telemetry/v2/change",
            ChangeRoutes::routes(Arc::clone(&context.telemetry_two)),
        )
        .nest(
            "/telemetry/profile",
            EntityChangeRoutes::routes(Arc::clone(&context.telemetry))
                .merge(TelemetryEntryRoutes::routes(Arc::clone(&context.telemetry))),
        )
        .nest(
            "/telemetry/v2/profile",
            EntityChangeRoutes::routes(Arc::clone(&context.telemetry_two)),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&context.config),
            attach_request_context,
        ));

    Router::new()
        .merge(HealthRoutes::routes())
        .nest(ADMIN_PREFIX, admin)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
