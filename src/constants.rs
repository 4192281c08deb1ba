// ABOUTME: Re-exports application constants from changeflow-core
// ABOUTME: Table names, header names, defaults, and user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

pub use changeflow_core::constants::*;
