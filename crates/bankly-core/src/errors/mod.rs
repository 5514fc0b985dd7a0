// ABOUTME: Unified error handling for the identity server bootstrap
// ABOUTME: Defines AppError, ErrorCode and the AppResult alias shared by every component
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every failure in the bootstrap is fatal for process startup, so the error type
//! is mostly about carrying enough context for an operator to act on it. The
//! [`ErrorCode`] groups failures into the phases they come from:
//!
//! - **Configuration**: a required connection string is missing, empty or unreadable
//! - **Argument**: invalid input handed straight to context construction
//! - **Migration**: a pending schema migration failed to apply
//! - **Provisioning**: a catalog category could not be inserted

#[cfg(feature = "database-errors")]
mod database;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Configuration (1000-1999)
    /// Required configuration value is absent or empty
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 1000,
    /// Configuration source exists but cannot be read or parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 1001,

    // Validation (2000-2999)
    /// Invalid argument passed by the caller
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 2000,

    // Schema lifecycle (3000-3999)
    /// A pending migration failed or the recorded history is inconsistent
    #[serde(rename = "MIGRATION_FAILED")]
    MigrationFailed = 3000,
    /// A catalog category could not be provisioned
    #[serde(rename = "PROVISIONING_FAILED")]
    ProvisioningFailed = 3001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Database driver failure outside of a migration or provisioning step
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
}

impl ErrorCode {
    /// Get a human-readable description of this error code
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InvalidInput => "The provided input is invalid",
            Self::MigrationFailed => "Schema migration failed",
            Self::ProvisioningFailed => "Resource provisioning failed",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
        }
    }

    /// Whether this code belongs to the configuration error class
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigMissing | Self::ConfigInvalid)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::InvalidInput => "INVALID_INPUT",
            Self::MigrationFailed => "MIGRATION_FAILED",
            Self::ProvisioningFailed => "PROVISIONING_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        };
        f.write_str(name)
    }
}

/// Unified error type for the bootstrap
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Required configuration value is missing or empty
    #[must_use]
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// Configuration source could not be read or parsed
    #[must_use]
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Migration failure
    #[must_use]
    pub fn migration_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MigrationFailed, message)
    }

    /// Provisioning failure
    #[must_use]
    pub fn provisioning_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProvisioningFailed, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Re-classify this error under a new code, keeping the original as the source.
    ///
    /// Used when a driver error surfaces inside a migration or provisioning step and
    /// must be reported as that phase's failure.
    #[must_use]
    pub fn reclassify(self, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message).with_source(self)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_description() {
        let error = AppError::config_missing("connection string 'Users' not found");
        assert_eq!(
            error.to_string(),
            "Required configuration is missing: connection string 'Users' not found"
        );
        assert!(error.code.is_configuration());
    }

    #[test]
    fn test_reclassify_keeps_source() {
        let inner = AppError::database("disk I/O error");
        let outer = inner.reclassify(ErrorCode::ProvisioningFailed, "category ApiResource");

        assert_eq!(outer.code, ErrorCode::ProvisioningFailed);
        let source = outer.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("disk I/O error"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::MigrationFailed).unwrap();
        assert_eq!(json, "\"MIGRATION_FAILED\"");
        assert_eq!(ErrorCode::MigrationFailed.to_string(), "MIGRATION_FAILED");
    }
}
