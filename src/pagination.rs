// ABOUTME: Re-exports pagination types from changeflow-core for unified type identity
// ABOUTME: Ensures PageRequest/Page are the same type across all workspace crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

pub use changeflow_core::pagination::*;
