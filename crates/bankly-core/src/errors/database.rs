// ABOUTME: Conversions from database driver errors into AppError
// ABOUTME: Enabled by the database-errors feature so the core crate stays driver-free by default
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let message = match &error {
            sqlx::Error::Configuration(e) => format!("invalid database configuration: {e}"),
            sqlx::Error::PoolTimedOut => "timed out acquiring a database connection".to_owned(),
            sqlx::Error::PoolClosed => "database pool is closed".to_owned(),
            sqlx::Error::Database(e) => format!("database rejected statement: {e}"),
            other => other.to_string(),
        };
        Self::new(ErrorCode::DatabaseError, message).with_source(error)
    }
}
