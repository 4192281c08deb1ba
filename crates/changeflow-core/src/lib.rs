// ABOUTME: Core types and constants for the changeflow approval service
// ABOUTME: Foundation crate with error handling, change models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

#![deny(unsafe_code)]

//! # Changeflow Core
//!
//! Foundation crate providing shared types for the configuration change-approval
//! workflow. This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and HTTP mapping
//! - **constants**: Table names, headers, defaults, and user-facing messages
//! - **pagination**: Page-number based paging used by review listings
//! - **models**: Change records and the managed telemetry entities

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Page-number pagination for review listings
pub mod pagination;

/// Change records and managed entity models
pub mod models;
