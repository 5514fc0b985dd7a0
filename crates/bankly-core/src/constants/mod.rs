// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Configuration keys, file names, schema names and identity server defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by the part of the bootstrap that consumes them.

/// Layered configuration sources
pub mod configuration {
    /// Base settings file, required in the content root
    pub const BASE_SETTINGS_FILE: &str = "appsettings.json";
    /// Prefix of the environment-specific override file (`appsettings.<env>.json`)
    pub const ENVIRONMENT_SETTINGS_PREFIX: &str = "appsettings";
    /// Extension of every settings file
    pub const SETTINGS_EXTENSION: &str = "json";
    /// Section holding named connection strings
    pub const CONNECTION_STRINGS_SECTION: &str = "ConnectionStrings";
    /// Separator between sections in environment variable names (`ConnectionStrings__Users`)
    pub const ENVIRONMENT_SEPARATOR: &str = "__";
    /// Section holding bootstrap behaviour switches
    pub const BOOTSTRAP_SECTION: &str = "Bootstrap";
}

/// Environment variables read by the binaries (never by the library)
pub mod env_vars {
    /// Deployment environment name (`Development`, `Staging`, `Production`, ...)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Log filter directive
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Log output format (`json`, `pretty`, `compact`)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Include source locations in log lines when set
    pub const LOG_INCLUDE_LOCATION: &str = "LOG_INCLUDE_LOCATION";
    /// Service name override for structured logs
    pub const SERVICE_NAME: &str = "SERVICE_NAME";
}

/// Defaults applied when configuration is silent
pub mod defaults {
    /// Environment assumed when no environment name is supplied
    pub const ENVIRONMENT_NAME: &str = "Production";
    /// Connection string key used by the provisioning and operational schemas
    pub const DEFAULT_CONNECTION_KEY: &str = "DefaultConnection";
    /// Connection string key used by the user identity schema
    pub const USERS_CONNECTION_KEY: &str = "Users";
    /// Label recorded with every applied migration
    pub const MIGRATIONS_LABEL: &str = "bankly_identity_server";
    /// Maximum pooled connections per schema context
    pub const MAX_CONNECTIONS: u32 = 5;
    /// Seconds to wait for a pooled connection
    pub const ACQUIRE_TIMEOUT_SECS: u64 = 30;
    /// Seconds between expired grant sweeps
    pub const TOKEN_CLEANUP_INTERVAL_SECS: u64 = 3600;
}

/// Identity server token lifetimes written for provisioned clients
pub mod token_lifetimes {
    /// Access token lifetime in seconds
    pub const ACCESS_TOKEN_SECS: i64 = 3600;
    /// Identity token lifetime in seconds
    pub const IDENTITY_TOKEN_SECS: i64 = 300;
    /// Authorization code lifetime in seconds
    pub const AUTHORIZATION_CODE_SECS: i64 = 300;
}

/// Service identity used in structured logs
pub mod service_names {
    /// Identity server bootstrap service name
    pub const IDENTITY_SERVER: &str = "bankly-identity-server";
    /// Design-time migration tool name
    pub const MIGRATION_TOOL: &str = "idsvr-migrate";
}
