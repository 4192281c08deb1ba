// ABOUTME: Main library entry point for the changeflow configuration change-approval service
// ABOUTME: Provides the generic approval workflow, record stores, and admin HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

#![deny(unsafe_code)]

//! # Changeflow
//!
//! A staged-commit service for managed configuration entities. Every proposed
//! create, update, or delete of a telemetry profile is stored as a pending
//! change, reviewed, and then approved (applied to the live entity), cancelled,
//! or, once approved, reverted.
//!
//! ## Architecture
//!
//! - **Changes**: the generic [`changes::ChangeWorkflow`], instantiated once per
//!   entity kind
//! - **Entities**: the [`entities::EntityStore`] adapter the workflow applies
//!   mutations through
//! - **Database**: the [`database::RecordStore`] key-value abstraction with
//!   in-memory and `SQLite` backends
//! - **Routes**: the axum router under `/xconfAdminService`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use changeflow::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("changeflow configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Generic change-approval workflow
pub mod changes;
/// Environment-based server configuration
pub mod config;
/// Application constants and configuration values
pub mod constants;
/// Key-value record store with pluggable backends
pub mod database;
/// Entity adapters the workflow applies changes through
pub mod entities;
/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;
/// Production logging and structured output
pub mod logging;
/// HTTP middleware for request tracing and caller context
pub mod middleware;
/// Change records and managed entity models
pub mod models;
/// Page-number pagination for review listings
pub mod pagination;
/// `HTTP` routes for change review and submission
pub mod routes;
