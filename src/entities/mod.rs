// ABOUTME: Entity store abstraction used to apply and undo approved changes
// ABOUTME: Defines the per-entity adapter capability set and its record-store implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

//! # Entity Store
//!
//! The approval workflow never touches entity tables directly. It goes through
//! an [`EntityStore`], so each entity kind can plug in its own persistence and
//! "in use" checks while the workflow itself stays generic.

/// Record-store backed adapter
pub mod store;

use async_trait::async_trait;
use changeflow_core::errors::AppResult;
use changeflow_core::models::ManagedEntity;

pub use store::KvEntityStore;

/// Load/save/delete access to live entities of one kind
#[async_trait]
pub trait EntityStore<E: ManagedEntity>: Send + Sync {
    /// Fetch the live entity
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails
    async fn load(&self, id: &str) -> AppResult<Option<E>>;

    /// Insert or replace the live entity under its own id
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails
    async fn save(&self, entity: &E) -> AppResult<()>;

    /// Remove the live entity, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Every live entity
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails
    async fn list(&self) -> AppResult<Vec<E>>;

    /// Veto deletion of an entity that other live state still depends on
    ///
    /// # Errors
    ///
    /// Returns an in-use error when the entity must not be removed
    async fn check_deletable(&self, entity: &E) -> AppResult<()> {
        let _ = entity;
        Ok(())
    }
}
