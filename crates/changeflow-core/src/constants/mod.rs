// ABOUTME: Application-wide constants for the change-approval service
// ABOUTME: Table names, header names, defaults, and user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Changeflow Contributors

/// Logical table names in the record store
pub mod tables {
    /// Pending changes for telemetry profiles
    pub const PENDING_CHANGES: &str = "XconfChange";
    /// Approved changes for telemetry profiles
    pub const APPROVED_CHANGES: &str = "XconfApprovedChange";
    /// Pending changes for telemetry-two profiles
    pub const PENDING_TELEMETRY_TWO_CHANGES: &str = "XconfTelemetryTwoChange";
    /// Approved changes for telemetry-two profiles
    pub const APPROVED_TELEMETRY_TWO_CHANGES: &str = "XconfApprovedTelemetryTwoChange";
    /// Live permanent telemetry profiles
    pub const PERMANENT_TELEMETRY: &str = "PermanentTelemetry";
    /// Live telemetry-two profiles
    pub const TELEMETRY_TWO_PROFILES: &str = "TelemetryTwoProfiles";
}

/// Defaults applied when configuration or request omits a value
pub mod defaults {
    /// Application type assigned to changes that do not name one
    pub const APPLICATION_TYPE: &str = "stb";
    /// Page size for filtered listings when the caller omits it
    pub const PAGE_SIZE: usize = 50;
    /// Upper bound for any requested page size
    pub const MAX_PAGE_SIZE: usize = 1000;
    /// HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Record store location
    pub const DATABASE_URL: &str = "sqlite::memory:";
    /// Per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Caller identity recorded when a request names none
    pub const UNKNOWN_USER: &str = "UNKNOWN_USER";
}

/// HTTP header and query parameter names
pub mod http {
    /// Header carrying the caller identity
    pub const USER_HEADER: &str = "x-user-name";
    /// Header carrying the request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
    /// Header carrying the unpaged item count
    pub const NUMBER_OF_ITEMS_HEADER: &str = "numberOfItems";
    /// Query parameter for the 1-based page number
    pub const PAGE_NUMBER: &str = "pageNumber";
    /// Query parameter for the page size
    pub const PAGE_SIZE: &str = "pageSize";
    /// Query parameter for the application type
    pub const APPLICATION_TYPE: &str = "applicationType";
}

/// Search context keys accepted by filtered listings
pub mod search_keys {
    /// Substring of the change author
    pub const AUTHOR: &str = "author";
    /// Substring of the target entity name
    pub const ENTITY: &str = "entity";
    /// Alias of [`ENTITY`] used by profile review screens
    pub const PROFILE_NAME: &str = "profileName";
}

/// User-facing messages that clients match on
pub mod messages {
    /// Duplicate pending change
    pub const SAME_CHANGE_EXISTS: &str = "The same change already exists";
    /// Batch body could not be decoded
    pub const UNABLE_TO_EXTRACT_CHANGE_IDS: &str = "Unable to extract changeIds";
    /// Filter body could not be decoded
    pub const UNABLE_TO_EXTRACT_SEARCH_CONTEXT: &str = "Unable to extract searchContext";
    /// Blank entity id on an entity path
    pub const ID_IS_EMPTY: &str = "Id is empty";
    /// Blank entity name
    pub const NAME_IS_EMPTY: &str = "Name is empty";
}

/// Service identity reported by health and startup logs
pub mod service {
    /// Service name
    pub const NAME: &str = "changeflow";
}
