// ABOUTME: Grouping, free-text filtering, and paging of change listings for reviewers
// ABOUTME: Groups by entity id and matches author/entity name filters case-insensitively
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use std::collections::{BTreeMap, BTreeSet, HashMap};

use changeflow_core::constants::search_keys::{AUTHOR, ENTITY, PROFILE_NAME};
use changeflow_core::errors::AppResult;
use changeflow_core::models::{ApprovedChange, Change, ChangeRecord, ManagedEntity};
use changeflow_core::pagination::{Page, PageRequest};
use serde::Serialize;

use super::ChangeWorkflow;

/// One page of changes grouped by entity id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedPage<R> {
    /// Changes per entity id, entity ids in sorted order
    pub groups: BTreeMap<String, Vec<R>>,
    /// Number of entity ids before paging
    pub total: usize,
}

impl<R> GroupedPage<R> {
    /// Page over the sorted group keys
    #[must_use]
    pub fn generate(groups: BTreeMap<String, Vec<R>>, request: PageRequest) -> Self {
        let total = groups.len();
        let groups = groups
            .into_iter()
            .skip(request.offset())
            .take(request.page_size)
            .collect();
        Self { groups, total }
    }
}

/// Group records by entity id, keeping their relative order within a group
pub fn group_changes<E, R: ChangeRecord<E>>(records: Vec<R>) -> BTreeMap<String, Vec<R>> {
    let mut groups: BTreeMap<String, Vec<R>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.change().entity_id.clone())
            .or_default()
            .push(record);
    }
    groups
}

/// Lower-cased filter values that take part in matching
#[derive(Debug, Default)]
struct SearchContext {
    author: Option<String>,
    entity: Option<String>,
}

impl SearchContext {
    fn from_filters(filters: &HashMap<String, String>) -> Self {
        let value = |key: &str| {
            filters
                .get(key)
                .map(|raw| raw.trim().to_lowercase())
                .filter(|value| !value.is_empty())
        };
        Self {
            author: value(AUTHOR),
            entity: value(ENTITY).or_else(|| value(PROFILE_NAME)),
        }
    }

    fn matches<E: ManagedEntity>(&self, change: &Change<E>) -> bool {
        let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(needle);
        self.author
            .as_deref()
            .map_or(true, |needle| contains(&change.author, needle))
            && self.entity.as_deref().map_or(true, |needle| {
                change
                    .entity_name()
                    .is_some_and(|name| contains(name, needle))
            })
    }
}

/// Records matching every recognised filter
///
/// Recognised keys are `author`, `entity`, and `profileName` (an alias of
/// `entity`). Unknown keys and blank values are ignored.
pub fn find_by_context<E: ManagedEntity, R: ChangeRecord<E>>(
    records: Vec<R>,
    filters: &HashMap<String, String>,
) -> Vec<R> {
    let context = SearchContext::from_filters(filters);
    records
        .into_iter()
        .filter(|record| context.matches(record.change()))
        .collect()
}

impl<E: ManagedEntity> ChangeWorkflow<E> {
    /// Distinct entity ids with at least one pending change
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn changed_entity_ids(&self) -> AppResult<BTreeSet<String>> {
        Ok(self
            .all_changes()
            .await?
            .into_iter()
            .map(|change| change.entity_id)
            .collect())
    }

    /// Pending changes grouped by entity id, paged over entity ids
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn grouped_changes(&self, page: PageRequest) -> AppResult<GroupedPage<Change<E>>> {
        let changes = self.all_changes().await?;
        Ok(GroupedPage::generate(group_changes(changes), page))
    }

    /// Approved changes grouped by entity id, paged over entity ids
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn grouped_approved_changes(
        &self,
        page: PageRequest,
    ) -> AppResult<GroupedPage<ApprovedChange<E>>> {
        let approved = self.all_approved_changes().await?;
        Ok(GroupedPage::generate(group_changes(approved), page))
    }

    /// Pending changes matching `filters`
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn find_by_context_for_changes(
        &self,
        filters: &HashMap<String, String>,
    ) -> AppResult<Vec<Change<E>>> {
        Ok(find_by_context(self.all_changes().await?, filters))
    }

    /// Approved changes of `application_type` matching `filters`
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn find_by_context_for_approved_changes(
        &self,
        application_type: &str,
        filters: &HashMap<String, String>,
    ) -> AppResult<Vec<ApprovedChange<E>>> {
        let approved = self
            .all_approved_changes()
            .await?
            .into_iter()
            .filter(|record| record.change.application_type == application_type)
            .collect();
        Ok(find_by_context(approved, filters))
    }

    /// Filtered and paged pending changes
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn filtered_changes(
        &self,
        filters: &HashMap<String, String>,
        page: PageRequest,
    ) -> AppResult<Page<Change<E>>> {
        let matches = self.find_by_context_for_changes(filters).await?;
        Ok(Page::generate(matches, page))
    }

    /// Filtered and paged approved changes of `application_type`
    ///
    /// # Errors
    ///
    /// Returns a store error
    pub async fn filtered_approved_changes(
        &self,
        application_type: &str,
        filters: &HashMap<String, String>,
        page: PageRequest,
    ) -> AppResult<Page<ApprovedChange<E>>> {
        let matches = self
            .find_by_context_for_approved_changes(application_type, filters)
            .await?;
        Ok(Page::generate(matches, page))
    }
}
