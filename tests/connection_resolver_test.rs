// ABOUTME: Integration tests for layered connection string resolution
// ABOUTME: Covers layer priority, missing and empty keys, bootstrap settings and process capture
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use bankly_identity_server::config::{
    resolve_connection_string, ConnectionResolver, ResolverSettings,
};
use bankly_identity_server::provisioning::ProvisioningStrategy;
use bankly_identity_server::ErrorCode;
use common::TestContentRoot;
use serde_json::json;
use serial_test::serial;
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_resolves_from_base_settings() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./base.db" } }),
    );

    let resolver = ConnectionResolver::load(&root.settings("Production")).unwrap();
    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./base.db");
    assert_eq!(resolver.environment_name(), "Production");
}

#[test]
fn test_environment_file_overrides_base() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "ConnectionStrings": {
            "DefaultConnection": "sqlite:./base.db",
            "Users": "sqlite:./users.db"
        } }),
    );
    root.write_settings(
        "appsettings.Development.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./dev.db" } }),
    );

    let resolver = ConnectionResolver::load(&root.settings("Development")).unwrap();
    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./dev.db");
    // Keys absent from the override fall through to the base file
    assert_eq!(resolver.resolve("Users").unwrap(), "sqlite:./users.db");

    // A different environment never sees the Development override
    let staging = ConnectionResolver::load(&root.settings("Staging")).unwrap();
    assert_eq!(staging.resolve("DefaultConnection").unwrap(), "sqlite:./base.db");
}

#[test]
fn test_environment_variables_have_highest_priority() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./base.db" } }),
    );
    root.write_settings(
        "appsettings.Staging.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./staging.db" } }),
    );

    let settings = root
        .settings("Staging")
        .with_environment_variable("ConnectionStrings__DefaultConnection", "sqlite:./env.db");
    let resolver = ConnectionResolver::load(&settings).unwrap();
    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./env.db");
}

#[test]
fn test_key_only_in_environment_variables_resolves() {
    let root = TestContentRoot::new();
    root.write_settings("appsettings.json", &json!({ "Logging": { "Level": "Information" } }));

    let settings = root
        .settings("Production")
        .with_environment_variable("ConnectionStrings__Users", "sqlite:./only-env.db");

    assert_eq!(
        resolve_connection_string(&settings, "Users").unwrap(),
        "sqlite:./only-env.db"
    );
}

#[test]
fn test_replacing_environment_layer_drops_earlier_variables() {
    let root = TestContentRoot::new();
    root.write_default_appsettings();

    let settings = root
        .settings("Production")
        .with_environment_variable("ConnectionStrings__Users", "sqlite:./stale.db")
        .with_environment_variables(HashMap::from([(
            "ConnectionStrings__DefaultConnection".to_owned(),
            "sqlite:./captured.db".to_owned(),
        )]));
    let resolver = ConnectionResolver::load(&settings).unwrap();

    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./captured.db");
    assert_eq!(resolver.resolve("Users").unwrap(), root.sqlite_url("users.db"));
}

#[test]
fn test_absent_key_is_configuration_error() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./base.db" } }),
    );
    root.write_settings(
        "appsettings.Production.json",
        &json!({ "ConnectionStrings": { "Reporting": "sqlite:./reporting.db" } }),
    );
    let settings = root
        .settings("Production")
        .with_environment_variable("ConnectionStrings__Audit", "sqlite:./audit.db");

    let err = resolve_connection_string(&settings, "Users").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert!(err.message.contains("Users"));
    assert!(err.message.contains("Production"));
}

#[test]
fn test_empty_and_whitespace_values_are_configuration_errors() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "", "Users": "   " } }),
    );

    let resolver = ConnectionResolver::load(&root.settings("Production")).unwrap();
    assert_eq!(
        resolver.resolve("DefaultConnection").unwrap_err().code,
        ErrorCode::ConfigMissing
    );
    assert_eq!(resolver.resolve("Users").unwrap_err().code, ErrorCode::ConfigMissing);
}

#[test]
fn test_empty_environment_variable_masks_file_value() {
    let root = TestContentRoot::new();
    root.write_default_appsettings();
    let settings = root
        .settings("Production")
        .with_environment_variable("ConnectionStrings__Users", "");

    let err = resolve_connection_string(&settings, "Users").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
}

#[test]
fn test_lookup_is_case_insensitive() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "connectionStrings": { "defaultconnection": "sqlite:./base.db" } }),
    );

    let resolver = ConnectionResolver::load(&root.settings("Production")).unwrap();
    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./base.db");
    assert_eq!(resolver.resolve("DEFAULTCONNECTION").unwrap(), "sqlite:./base.db");
}

#[test]
fn test_missing_base_file_is_configuration_error() {
    let root = TestContentRoot::new();
    let err = ConnectionResolver::load(&root.settings("Production")).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigMissing);
}

#[test]
fn test_malformed_settings_file_is_invalid_configuration() {
    let root = TestContentRoot::new();
    root.write_default_appsettings();
    root.write_raw("appsettings.Development.json", "{ \"ConnectionStrings\": ");

    let err = ConnectionResolver::load(&root.settings("Development")).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_bootstrap_settings_defaults() {
    let root = TestContentRoot::new();
    root.write_default_appsettings();

    let settings = ConnectionResolver::load(&root.settings("Production"))
        .unwrap()
        .bootstrap_settings()
        .unwrap();
    assert_eq!(
        settings.provisioning_strategy,
        ProvisioningStrategy::SkipPopulatedCategories
    );
    assert_eq!(settings.pool.max_connections, 5);
    assert_eq!(settings.pool.acquire_timeout, Duration::from_secs(30));
    assert!(settings.operational_store.enable_token_cleanup);
    assert_eq!(
        settings.operational_store.token_cleanup_interval,
        Duration::from_secs(3600)
    );
}

#[test]
fn test_bootstrap_settings_from_files_and_environment() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({
            "ConnectionStrings": { "DefaultConnection": "sqlite:./base.db" },
            "Bootstrap": {
                "ProvisioningStrategy": "InsertMissingEntries",
                "Database": { "MaxConnections": 2, "AcquireTimeoutSeconds": 5 },
                "OperationalStore": { "EnableTokenCleanup": false }
            }
        }),
    );
    let settings = root.settings("Production").with_environment_variable(
        "Bootstrap__OperationalStore__TokenCleanupIntervalSeconds",
        "60",
    );

    let bootstrap = ConnectionResolver::load(&settings)
        .unwrap()
        .bootstrap_settings()
        .unwrap();
    assert_eq!(
        bootstrap.provisioning_strategy,
        ProvisioningStrategy::InsertMissingEntries
    );
    assert_eq!(bootstrap.pool.max_connections, 2);
    assert_eq!(bootstrap.pool.acquire_timeout, Duration::from_secs(5));
    assert!(!bootstrap.operational_store.enable_token_cleanup);
    assert_eq!(
        bootstrap.operational_store.token_cleanup_interval,
        Duration::from_secs(60)
    );
}

#[test]
fn test_unknown_provisioning_strategy_is_invalid_configuration() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "Bootstrap": { "ProvisioningStrategy": "UpsertEverything" } }),
    );

    let err = ConnectionResolver::load(&root.settings("Production"))
        .unwrap()
        .bootstrap_settings()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_zero_max_connections_is_invalid_configuration() {
    let root = TestContentRoot::new();
    root.write_settings(
        "appsettings.json",
        &json!({ "Bootstrap": { "Database": { "MaxConnections": 0 } } }),
    );

    let err = ConnectionResolver::load(&root.settings("Production"))
        .unwrap()
        .bootstrap_settings()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
}

#[test]
#[serial]
fn test_from_process_reads_environment_name_and_variables() {
    let root = TestContentRoot::new();
    root.write_default_appsettings();
    root.write_settings(
        "appsettings.Qa.json",
        &json!({ "ConnectionStrings": { "DefaultConnection": "sqlite:./qa.db" } }),
    );

    std::env::set_var("ENVIRONMENT", "Qa");
    std::env::set_var("ConnectionStrings__Users", "sqlite:./process-users.db");

    let settings = ResolverSettings::from_process(root.path(), None);
    let resolver = ConnectionResolver::load(&settings);

    std::env::remove_var("ENVIRONMENT");
    std::env::remove_var("ConnectionStrings__Users");

    let resolver = resolver.unwrap();
    assert_eq!(settings.environment_name, "Qa");
    assert_eq!(resolver.resolve("DefaultConnection").unwrap(), "sqlite:./qa.db");
    assert_eq!(resolver.resolve("Users").unwrap(), "sqlite:./process-users.db");
}

#[test]
#[serial]
fn test_from_process_prefers_explicit_environment() {
    std::env::set_var("ENVIRONMENT", "Staging");
    let settings = ResolverSettings::from_process("/srv/idsvr", Some("Development".to_owned()));
    std::env::remove_var("ENVIRONMENT");
    assert_eq!(settings.environment_name, "Development");

    let settings = ResolverSettings::from_process("/srv/idsvr", None);
    assert_eq!(settings.environment_name, "Production");
}
