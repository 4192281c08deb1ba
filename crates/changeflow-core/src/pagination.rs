// ABOUTME: Page-number pagination for change review listings
// ABOUTME: Parses pageNumber/pageSize parameters and slices ordered result sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

use serde::{Deserialize, Serialize};

use crate::constants::http::{PAGE_NUMBER, PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number
    pub page_number: usize,
    /// Items per page
    pub page_size: usize,
}

impl PageRequest {
    /// Build a page request, rejecting zero values and sizes above `max_page_size`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error naming the offending parameter
    pub fn new(page_number: usize, page_size: usize, max_page_size: usize) -> AppResult<Self> {
        if page_number == 0 {
            return Err(invalid_parameter(PAGE_NUMBER));
        }
        if page_size == 0 || page_size > max_page_size {
            return Err(invalid_parameter(PAGE_SIZE));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Parse raw query values where both parameters are mandatory
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or invalid parameter
    pub fn required(
        page_number: Option<&str>,
        page_size: Option<&str>,
        max_page_size: usize,
    ) -> AppResult<Self> {
        let number = page_number.ok_or_else(|| AppError::missing_parameter(PAGE_NUMBER))?;
        let size = page_size.ok_or_else(|| AppError::missing_parameter(PAGE_SIZE))?;
        Self::new(
            parse_positive(PAGE_NUMBER, number)?,
            parse_positive(PAGE_SIZE, size)?,
            max_page_size,
        )
    }

    /// Parse raw query values, falling back to page 1 and `default_page_size`
    ///
    /// # Errors
    ///
    /// Returns an error naming the parameter when a supplied value is invalid
    pub fn with_defaults(
        page_number: Option<&str>,
        page_size: Option<&str>,
        default_page_size: usize,
        max_page_size: usize,
    ) -> AppResult<Self> {
        let number = page_number.map_or(Ok(1), |raw| parse_positive(PAGE_NUMBER, raw))?;
        let size = page_size.map_or(Ok(default_page_size), |raw| parse_positive(PAGE_SIZE, raw))?;
        Self::new(number, size, max_page_size)
    }

    /// Index of the first item on this page
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }
}

fn parse_positive(name: &str, raw: &str) -> AppResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(invalid_parameter(name)),
    }
}

fn invalid_parameter(name: &str) -> AppError {
    AppError::invalid_input(format!("{name} should be a positive integer"))
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on the requested page
    pub items: Vec<T>,
    /// Number of items before paging
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice an ordered collection into the requested page
    ///
    /// Pages past the end are empty rather than an error.
    #[must_use]
    pub fn generate(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.page_size)
            .collect();
        Self { items, total }
    }
}
