// ABOUTME: Generic schema context factory shared by the live service and the offline migration tool
// ABOUTME: Validates connection strings, builds lazy pools and delegates construction to the context type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{
    detect_database_type, redact_connection_string, ContextOptions, PoolSettings, SchemaContext,
    SchemaContextType,
};
use crate::config::ConnectionResolver;
use bankly_core::constants::defaults;
use bankly_core::errors::{AppError, AppResult};
use sqlx::any::AnyPoolOptions;
use std::marker::PhantomData;
use std::sync::Once;
use tracing::{debug, info};

static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
}

/// Where a context's connection string lives and which migration set applies to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    /// Deployment environment the connection string is resolved for
    pub environment_name: String,
    /// Key under the `ConnectionStrings` section
    pub connection_string_key: String,
    /// Label recorded with applied migrations
    pub migrations_label: String,
}

impl ConnectionSpec {
    /// Spec with an explicit key and label
    #[must_use]
    pub fn new(
        environment_name: impl Into<String>,
        connection_string_key: impl Into<String>,
        migrations_label: impl Into<String>,
    ) -> Self {
        Self {
            environment_name: environment_name.into(),
            connection_string_key: connection_string_key.into(),
            migrations_label: migrations_label.into(),
        }
    }

    /// Spec using the default key and label of a schema context
    #[must_use]
    pub fn for_context(kind: SchemaContextType, environment_name: impl Into<String>) -> Self {
        Self::new(
            environment_name,
            kind.default_connection_key(),
            defaults::MIGRATIONS_LABEL,
        )
    }
}

/// Factory producing handles of one schema context type
pub struct ContextFactory<C: SchemaContext> {
    pool_settings: PoolSettings,
    store_options: C::StoreOptions,
    _context: PhantomData<fn() -> C>,
}

impl<C: SchemaContext> Default for ContextFactory<C> {
    fn default() -> Self {
        Self::new(PoolSettings::default())
    }
}

impl<C: SchemaContext> ContextFactory<C> {
    /// Factory with default store options
    #[must_use]
    pub fn new(pool_settings: PoolSettings) -> Self {
        Self {
            pool_settings,
            store_options: C::StoreOptions::default(),
            _context: PhantomData,
        }
    }

    /// Replace the construction-time store options
    #[must_use]
    pub fn with_store_options(mut self, store_options: C::StoreOptions) -> Self {
        self.store_options = store_options;
        self
    }

    /// Build a handle bound to `connection_string`, tagged with `migrations_label`
    ///
    /// The returned handle holds a lazy pool: nothing connects until the first query.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error if the connection string is empty, names an
    /// unsupported backend, or cannot be parsed into pool options.
    pub fn create(&self, connection_string: &str, migrations_label: &str) -> AppResult<C> {
        let connection_string = connection_string.trim();
        if connection_string.is_empty() {
            return Err(AppError::invalid_input("connection_string is null or empty"));
        }
        if migrations_label.trim().is_empty() {
            return Err(AppError::invalid_input("migrations_label is null or empty"));
        }

        let database_type = detect_database_type(connection_string)?;
        let url = normalize_connection_url(connection_string);

        install_drivers();
        let pool_options = AnyPoolOptions::new().acquire_timeout(self.pool_settings.acquire_timeout);
        // An in-memory SQLite database lives and dies with its single connection
        let pool_options = if is_in_memory(connection_string) {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(self.pool_settings.max_connections)
        };
        let pool = pool_options
            .connect_lazy(&url)
            .map_err(|e| {
                AppError::invalid_input(format!(
                    "connection string for {} context is malformed: {}",
                    C::KIND,
                    redact_connection_string(connection_string)
                ))
                .with_source(e)
            })?;

        debug!(
            schema.context = %C::KIND,
            database.type = ?database_type,
            connection = %redact_connection_string(connection_string),
            migrations.label = migrations_label,
            "Created schema context"
        );

        let options = ContextOptions::new(
            C::KIND,
            connection_string.to_owned(),
            migrations_label.to_owned(),
            pool,
        );
        Ok(C::from_options(options, self.store_options.clone()))
    }

    /// Resolve the connection string for `spec` and build a handle from it
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the key does not resolve, or any error
    /// from [`ContextFactory::create`].
    pub fn create_from_configuration(
        &self,
        resolver: &ConnectionResolver,
        spec: &ConnectionSpec,
    ) -> AppResult<C> {
        let connection_string = resolver.resolve(&spec.connection_string_key)?;
        info!(
            schema.context = %C::KIND,
            environment = %spec.environment_name,
            connection.key = %spec.connection_string_key,
            "Resolved connection string"
        );
        self.create(&connection_string, &spec.migrations_label)
    }
}

fn is_in_memory(connection_string: &str) -> bool {
    connection_string.starts_with("sqlite:")
        && (connection_string.contains(":memory:") || connection_string.contains("mode=memory"))
}

/// Apply driver URL tweaks: `SQLite` files are created when missing
fn normalize_connection_url(connection_string: &str) -> String {
    if !connection_string.starts_with("sqlite:")
        || is_in_memory(connection_string)
        || connection_string.contains("mode=")
    {
        return connection_string.to_owned();
    }
    let separator = if connection_string.contains('?') { '&' } else { '?' };
    format!("{connection_string}{separator}mode=rwc")
}
