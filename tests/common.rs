// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Scratch content roots with appsettings files, SQLite URLs and migrated schema contexts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `bankly_identity_server`

use bankly_identity_server::config::ResolverSettings;
use bankly_identity_server::database::{
    ContextFactory, OperationalGrantContext, ProvisioningContext, SchemaContext,
    UserIdentityContext,
};
use serde_json::{json, Value};
use sqlx::AnyPool;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Scratch content root; removed when dropped
pub struct TestContentRoot {
    dir: TempDir,
}

impl TestContentRoot {
    pub fn new() -> Self {
        init_test_logging();
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `sqlite:` URL of a database file inside the content root
    pub fn sqlite_url(&self, file_name: &str) -> String {
        format!("sqlite:{}", self.dir.path().join(file_name).display())
    }

    /// Write `appsettings.json` (or any other settings file) as JSON
    pub fn write_settings(&self, file_name: &str, contents: &Value) {
        fs::write(
            self.dir.path().join(file_name),
            serde_json::to_string_pretty(contents).unwrap(),
        )
        .unwrap();
    }

    pub fn write_raw(&self, file_name: &str, contents: &str) {
        fs::write(self.dir.path().join(file_name), contents).unwrap();
    }

    /// Base settings pointing both connection keys at files in the content root
    pub fn write_default_appsettings(&self) {
        self.write_settings(
            "appsettings.json",
            &json!({
                "ConnectionStrings": {
                    "DefaultConnection": self.sqlite_url("idsvr.db"),
                    "Users": self.sqlite_url("users.db")
                }
            }),
        );
    }

    pub fn settings(&self, environment: &str) -> ResolverSettings {
        ResolverSettings::new(self.dir.path(), environment)
    }
}

pub fn provisioning_context(url: &str) -> ProvisioningContext {
    ContextFactory::<ProvisioningContext>::default()
        .create(url, "bankly_identity_server")
        .unwrap()
}

pub fn operational_context(url: &str) -> OperationalGrantContext {
    ContextFactory::<OperationalGrantContext>::default()
        .create(url, "bankly_identity_server")
        .unwrap()
}

pub fn identity_context(url: &str) -> UserIdentityContext {
    ContextFactory::<UserIdentityContext>::default()
        .create(url, "bankly_identity_server")
        .unwrap()
}

/// Provisioning context with every migration applied
pub async fn migrated_provisioning_context(root: &TestContentRoot) -> ProvisioningContext {
    let context = provisioning_context(&root.sqlite_url("provisioning.db"));
    context.apply_pending_migrations().await.unwrap();
    context
}

pub async fn row_count(pool: &AnyPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn identifiers(pool: &AnyPool, table: &str, column: &str) -> Vec<String> {
    sqlx::query_scalar::<_, String>(&format!("SELECT {column} FROM {table} ORDER BY {column}"))
        .fetch_all(pool)
        .await
        .unwrap()
}
