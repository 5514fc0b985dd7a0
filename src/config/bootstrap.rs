// ABOUTME: Bootstrap switches read from the Bootstrap configuration section
// ABOUTME: Pool limits, provisioning strategy and operational store token cleanup settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{OperationalStoreOptions, PoolSettings};
use crate::provisioning::ProvisioningStrategy;
use bankly_core::constants::configuration;
use bankly_core::errors::{AppError, AppResult};
use config::{Config, ConfigError};
use std::time::Duration;

/// Settings applied to every bootstrap run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapSettings {
    /// Idempotency strategy of the provisioner
    pub provisioning_strategy: ProvisioningStrategy,
    /// Pool limits of each schema context
    pub pool: PoolSettings,
    /// Operational store options
    pub operational_store: OperationalStoreOptions,
}

impl BootstrapSettings {
    pub(crate) fn from_config(config: &Config) -> AppResult<Self> {
        let defaults = Self::default();

        let provisioning_strategy =
            match optional(config, "provisioningstrategy", Config::get_string)? {
                Some(value) => value.parse()?,
                None => defaults.provisioning_strategy,
            };

        let max_connections = match optional(config, "database.maxconnections", Config::get_int)? {
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::config_invalid(format!(
                        "Bootstrap:Database:MaxConnections must be a positive integer, got {value}"
                    ))
                })?,
            None => defaults.pool.max_connections,
        };

        let acquire_timeout =
            match optional(config, "database.acquiretimeoutseconds", Config::get_int)? {
                Some(value) => Duration::from_secs(non_negative(
                    value,
                    "Bootstrap:Database:AcquireTimeoutSeconds",
                )?),
                None => defaults.pool.acquire_timeout,
            };

        let enable_token_cleanup =
            optional(config, "operationalstore.enabletokencleanup", Config::get_bool)?
                .unwrap_or(defaults.operational_store.enable_token_cleanup);

        let token_cleanup_interval = match optional(
            config,
            "operationalstore.tokencleanupintervalseconds",
            Config::get_int,
        )? {
            Some(value) => Duration::from_secs(
                non_negative(value, "Bootstrap:OperationalStore:TokenCleanupIntervalSeconds")?
                    .max(1),
            ),
            None => defaults.operational_store.token_cleanup_interval,
        };

        Ok(Self {
            provisioning_strategy,
            pool: PoolSettings {
                max_connections,
                acquire_timeout,
            },
            operational_store: OperationalStoreOptions {
                enable_token_cleanup,
                token_cleanup_interval,
            },
        })
    }
}

fn optional<T>(
    config: &Config,
    key: &str,
    read: fn(&Config, &str) -> Result<T, ConfigError>,
) -> AppResult<Option<T>> {
    let path = format!(
        "{}.{key}",
        configuration::BOOTSTRAP_SECTION.to_lowercase()
    );
    match read(config, &path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(AppError::config_invalid(format!("cannot read {path}")).with_source(e)),
    }
}

fn non_negative(value: i64, name: &str) -> AppResult<u64> {
    u64::try_from(value).map_err(|_| {
        AppError::config_invalid(format!("{name} must not be negative, got {value}"))
    })
}
