// ABOUTME: Operational grant schema context holding persisted grants and device codes
// ABOUTME: Carries the token cleanup switch and removes expired grants on demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::migrations::operational;
use crate::database::{
    format_timestamp, ContextOptions, Migration, SchemaContext, SchemaContextType,
};
use bankly_core::constants::defaults;
use bankly_core::errors::AppResult;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Construction-time options of the operational store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalStoreOptions {
    /// Periodically delete expired grants
    pub enable_token_cleanup: bool,
    /// Delay between cleanup sweeps
    pub token_cleanup_interval: Duration,
}

impl Default for OperationalStoreOptions {
    fn default() -> Self {
        Self {
            enable_token_cleanup: true,
            token_cleanup_interval: Duration::from_secs(defaults::TOKEN_CLEANUP_INTERVAL_SECS),
        }
    }
}

/// Handle to the operational grant schema
#[derive(Debug, Clone)]
pub struct OperationalGrantContext {
    options: ContextOptions,
    store_options: OperationalStoreOptions,
}

impl OperationalGrantContext {
    /// Store options the context was built with
    #[must_use]
    pub const fn store_options(&self) -> &OperationalStoreOptions {
        &self.store_options
    }

    /// Delete persisted grants and device codes that expired before `now`
    ///
    /// Grants without an expiration never expire. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseError` if either delete fails; both run in one transaction.
    pub async fn remove_expired_grants(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = format_timestamp(now);
        let mut tx = self.pool().begin().await?;

        let grants = sqlx::query(
            "DELETE FROM persisted_grants WHERE expiration IS NOT NULL AND expiration < $1",
        )
        .bind(&cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let device_codes = sqlx::query("DELETE FROM device_codes WHERE expiration < $1")
            .bind(&cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(
            persisted_grants = grants,
            device_codes = device_codes,
            "Removed expired grants"
        );
        Ok(grants + device_codes)
    }
}

impl SchemaContext for OperationalGrantContext {
    type StoreOptions = OperationalStoreOptions;

    const KIND: SchemaContextType = SchemaContextType::OperationalGrant;

    fn from_options(options: ContextOptions, store_options: Self::StoreOptions) -> Self {
        Self {
            options,
            store_options,
        }
    }

    fn options(&self) -> &ContextOptions {
        &self.options
    }

    fn migrations() -> &'static [Migration] {
        operational::MIGRATIONS
    }
}
