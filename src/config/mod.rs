// ABOUTME: Configuration management module for server and workflow settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its typed pieces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors
//! Configuration module
//!
//! All configuration is read from environment variables (optionally seeded from a
//! `.env` file) and passed explicitly to the components that need it.

/// Environment and server configuration
pub mod environment;

pub use environment::{DatabaseUrl, Environment, LogLevel, ServerConfig};
