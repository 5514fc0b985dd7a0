// ABOUTME: Integration tests for idempotent catalog provisioning
// ABOUTME: Covers repeat runs, per-category atomicity, failure propagation and the insert-missing strategy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use bankly_core::models::{
    ApiResourceDefinition, ApiScopeDefinition, ClientDefinition, GrantType,
    IdentityResourceDefinition, ResourceCatalogEntry, ResourceCategory, Secret,
};
use bankly_identity_server::database::SchemaContext;
use bankly_identity_server::provisioning::{
    BanklyCatalog, CategoryOutcome, InMemoryCatalog, ProvisioningStore, ProvisioningStrategy,
    ResourceProvisioner,
};
use bankly_identity_server::{AppError, AppResult, ErrorCode};
use common::{identifiers, migrated_provisioning_context, row_count, TestContentRoot};
use std::collections::HashSet;
use std::sync::Mutex;

#[tokio::test]
async fn test_provisioning_twice_inserts_each_entry_once() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;
    let provisioner = ResourceProvisioner::new(BanklyCatalog);

    let first = provisioner.provision(&context).await.unwrap();
    assert_eq!(
        first.outcome(ResourceCategory::Client),
        Some(CategoryOutcome::Inserted(2))
    );
    assert_eq!(first.inserted(), 6);

    let pool = context.pool();
    assert_eq!(row_count(pool, "clients").await, 2);
    assert_eq!(row_count(pool, "identity_resources").await, 2);
    assert_eq!(row_count(pool, "api_resources").await, 1);
    assert_eq!(row_count(pool, "api_scopes").await, 1);

    let second = provisioner.provision(&context).await.unwrap();
    assert_eq!(second.inserted(), 0);
    assert_eq!(
        second.outcome(ResourceCategory::IdentityResource),
        Some(CategoryOutcome::SkippedAlreadyProvisioned { existing_rows: 2 })
    );
    assert_eq!(row_count(pool, "clients").await, 2);
    assert_eq!(row_count(pool, "identity_resources").await, 2);
    assert_eq!(row_count(pool, "api_resources").await, 1);
    assert_eq!(row_count(pool, "api_scopes").await, 1);
    assert_eq!(row_count(pool, "client_secrets").await, 2);

    context.close().await;
}

#[tokio::test]
async fn test_child_rows_are_written_with_the_parent() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;
    ResourceProvisioner::new(BanklyCatalog)
        .provision(&context)
        .await
        .unwrap();
    let pool = context.pool();

    assert_eq!(
        identifiers(pool, "clients", "client_id").await,
        vec!["compliance".to_owned(), "ro.compliance".to_owned()]
    );
    assert_eq!(
        identifiers(pool, "client_grant_types", "grant_type").await,
        vec!["client_credentials".to_owned(), "password".to_owned()]
    );
    assert_eq!(
        identifiers(pool, "client_scopes", "scope").await,
        vec!["complianceapi".to_owned(), "complianceapi".to_owned()]
    );

    // Secrets are stored hashed, never in plain text
    let secrets = identifiers(pool, "client_secrets", "value").await;
    assert!(secrets.contains(&Secret::sha256("A53j98983nbf8hf83fjjf0383983").value));
    assert!(!secrets.contains(&"A53j98983nbf8hf83fjjf0383983".to_owned()));

    let display_names = identifiers(pool, "api_resources", "display_name").await;
    assert_eq!(display_names, vec!["compliance  api for bankly".to_owned()]);
    // The API resource carries no scope rows; its scope is the standalone ApiScope
    assert_eq!(row_count(pool, "api_resource_scopes").await, 0);
    assert_eq!(
        row_count(pool, "identity_resource_claims").await,
        1 + i64::try_from(IdentityResourceDefinition::profile().user_claims.len()).unwrap()
    );

    let lifetimes: Vec<i64> =
        sqlx::query_scalar("SELECT access_token_lifetime FROM clients ORDER BY client_id")
            .fetch_all(pool)
            .await
            .unwrap();
    assert_eq!(lifetimes, vec![3600, 3600]);

    context.close().await;
}

#[tokio::test]
async fn test_category_row_count_matches_catalog_regardless_of_order() {
    let scopes = ["accounts", "payments", "transfers", "statements"];
    let orders: [[usize; 4]; 3] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]];

    for order in orders {
        let root = TestContentRoot::new();
        let context = migrated_provisioning_context(&root).await;
        let catalog = order.iter().fold(InMemoryCatalog::default(), |catalog, i| {
            catalog.with_entry(ApiScopeDefinition::new(scopes[*i]))
        });

        ResourceProvisioner::new(catalog)
            .provision(&context)
            .await
            .unwrap();

        assert_eq!(row_count(context.pool(), "api_scopes").await, 4);
        assert_eq!(
            identifiers(context.pool(), "api_scopes", "name").await,
            vec!["accounts", "payments", "statements", "transfers"]
        );
        context.close().await;
    }
}

#[tokio::test]
async fn test_failure_in_second_category_keeps_earlier_categories() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;
    let pool = context.pool();

    sqlx::query(
        "CREATE TRIGGER fail_api_resources BEFORE INSERT ON api_resources
         BEGIN SELECT RAISE(ABORT, 'simulated failure'); END",
    )
    .execute(pool)
    .await
    .unwrap();

    let catalog = InMemoryCatalog::default()
        .with_entry(
            ClientDefinition::new("compliance")
                .with_grant_types(&[GrantType::ClientCredentials])
                .with_scope("complianceapi"),
        )
        .with_entry(
            ApiResourceDefinition::new("complianceapi", "compliance api")
                .with_scope("complianceapi"),
        )
        .with_entry(ApiScopeDefinition::new("complianceapi"));

    let err = ResourceProvisioner::new(catalog.clone())
        .provision(&context)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProvisioningFailed);
    assert!(err.message.contains("ApiResource"));

    // Client committed before the failure; ApiResource rolled back; ApiScope never attempted
    assert_eq!(row_count(pool, "clients").await, 1);
    assert_eq!(row_count(pool, "client_grant_types").await, 1);
    assert_eq!(row_count(pool, "api_resources").await, 0);
    assert_eq!(row_count(pool, "api_resource_scopes").await, 0);
    assert_eq!(row_count(pool, "api_scopes").await, 0);

    // The next start resumes where the failed one stopped
    sqlx::query("DROP TRIGGER fail_api_resources")
        .execute(pool)
        .await
        .unwrap();
    let report = ResourceProvisioner::new(catalog)
        .provision(&context)
        .await
        .unwrap();
    assert_eq!(
        report.outcome(ResourceCategory::Client),
        Some(CategoryOutcome::SkippedAlreadyProvisioned { existing_rows: 1 })
    );
    assert_eq!(
        report.outcome(ResourceCategory::ApiResource),
        Some(CategoryOutcome::Inserted(1))
    );
    assert_eq!(row_count(pool, "clients").await, 1);
    assert_eq!(row_count(pool, "api_resources").await, 1);
    assert_eq!(row_count(pool, "api_resource_scopes").await, 1);
    assert_eq!(row_count(pool, "api_scopes").await, 1);

    context.close().await;
}

#[tokio::test]
async fn test_client_overrides_are_stored() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;
    let pool = context.pool();

    let catalog = InMemoryCatalog::default()
        .with_entry(
            ClientDefinition::new("statements")
                .with_name("Statement export")
                .with_grant_types(&[GrantType::AuthorizationCode, GrantType::RefreshToken])
                .with_secret(Secret::sha256("statements-secret").with_description("export job"))
                .with_offline_access()
                .with_access_token_lifetime(900),
        )
        .with_entry(ClientDefinition::new("compliance"));
    ResourceProvisioner::new(catalog)
        .provision(&context)
        .await
        .unwrap();

    let name: Option<String> =
        sqlx::query_scalar("SELECT client_name FROM clients WHERE client_id = $1")
            .bind("statements")
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(name.as_deref(), Some("Statement export"));

    // Override for one client, store default for the other
    let lifetimes: Vec<i64> =
        sqlx::query_scalar("SELECT access_token_lifetime FROM clients ORDER BY client_id")
            .fetch_all(pool)
            .await
            .unwrap();
    assert_eq!(lifetimes, vec![3600, 900]);

    let offline: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE allow_offline_access")
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(offline, 1);

    assert_eq!(
        identifiers(pool, "client_secrets", "description").await,
        vec!["export job"]
    );
    assert_eq!(
        identifiers(pool, "client_grant_types", "grant_type").await,
        vec!["authorization_code", "refresh_token"]
    );

    context.close().await;
}

#[tokio::test]
async fn test_presence_check_ignores_catalog_additions() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;

    let original = InMemoryCatalog::default().with_entry(ApiScopeDefinition::new("complianceapi"));
    ResourceProvisioner::new(original.clone())
        .provision(&context)
        .await
        .unwrap();

    let grown = original.with_entry(ApiScopeDefinition::new("reportingapi"));
    let report = ResourceProvisioner::new(grown)
        .provision(&context)
        .await
        .unwrap();
    assert_eq!(
        report.outcome(ResourceCategory::ApiScope),
        Some(CategoryOutcome::SkippedAlreadyProvisioned { existing_rows: 1 })
    );
    assert_eq!(
        identifiers(context.pool(), "api_scopes", "name").await,
        vec!["complianceapi"]
    );

    context.close().await;
}

#[tokio::test]
async fn test_insert_missing_entries_adds_only_new_identifiers() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;

    let original = InMemoryCatalog::default().with_entry(ApiScopeDefinition::new("complianceapi"));
    ResourceProvisioner::new(original.clone())
        .provision(&context)
        .await
        .unwrap();

    let grown = original.with_entry(ApiScopeDefinition::new("reportingapi"));
    let provisioner =
        ResourceProvisioner::new(grown).with_strategy(ProvisioningStrategy::InsertMissingEntries);

    let report = provisioner.provision(&context).await.unwrap();
    assert_eq!(
        report.outcome(ResourceCategory::ApiScope),
        Some(CategoryOutcome::Inserted(1))
    );
    assert_eq!(
        report.outcome(ResourceCategory::Client),
        Some(CategoryOutcome::NothingToInsert)
    );
    assert_eq!(
        identifiers(context.pool(), "api_scopes", "name").await,
        vec!["complianceapi", "reportingapi"]
    );

    // Still idempotent
    let again = provisioner.provision(&context).await.unwrap();
    assert_eq!(again.inserted(), 0);
    assert_eq!(row_count(context.pool(), "api_scopes").await, 2);

    context.close().await;
}

#[tokio::test]
async fn test_duplicate_catalog_identifiers_fail_before_writing() {
    let root = TestContentRoot::new();
    let context = migrated_provisioning_context(&root).await;

    let catalog = InMemoryCatalog::default()
        .with_entry(ClientDefinition::new("compliance"))
        .with_entry(ClientDefinition::new("compliance"));
    let err = ResourceProvisioner::new(catalog)
        .provision(&context)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProvisioningFailed);
    assert_eq!(row_count(context.pool(), "clients").await, 0);

    context.close().await;
}

/// Store double recording calls and failing on a chosen category
struct RecordingStore {
    fail_on: Option<ResourceCategory>,
    calls: Mutex<Vec<(ResourceCategory, usize)>>,
}

impl RecordingStore {
    fn new(fail_on: Option<ResourceCategory>) -> Self {
        Self {
            fail_on,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(ResourceCategory, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProvisioningStore for RecordingStore {
    async fn category_row_count(&self, _category: ResourceCategory) -> AppResult<i64> {
        Ok(0)
    }

    async fn existing_identifiers(&self, _category: ResourceCategory) -> AppResult<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn insert_entries(
        &self,
        category: ResourceCategory,
        entries: &[ResourceCatalogEntry],
    ) -> AppResult<usize> {
        if self.fail_on == Some(category) {
            return Err(AppError::database("disk I/O error"));
        }
        self.calls.lock().unwrap().push((category, entries.len()));
        Ok(entries.len())
    }
}

#[tokio::test]
async fn test_categories_are_processed_in_fixed_order() {
    let store = RecordingStore::new(None);
    // Catalog authored in reverse category order
    let catalog = InMemoryCatalog::default()
        .with_entry(ApiScopeDefinition::new("complianceapi"))
        .with_entry(ApiResourceDefinition::new("complianceapi", "compliance"))
        .with_entry(IdentityResourceDefinition::openid())
        .with_entry(ClientDefinition::new("compliance"));

    ResourceProvisioner::new(catalog)
        .provision(&store)
        .await
        .unwrap();
    assert_eq!(
        store.calls(),
        vec![
            (ResourceCategory::Client, 1),
            (ResourceCategory::IdentityResource, 1),
            (ResourceCategory::ApiResource, 1),
            (ResourceCategory::ApiScope, 1),
        ]
    );
}

#[tokio::test]
async fn test_store_errors_surface_as_provisioning_failures() {
    let store = RecordingStore::new(Some(ResourceCategory::IdentityResource));

    let err = ResourceProvisioner::new(BanklyCatalog)
        .provision(&store)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProvisioningFailed);
    let source = std::error::Error::source(&err)
        .map(ToString::to_string)
        .unwrap_or_default();
    assert!(source.contains("disk I/O error"));

    // Nothing after the failing category was attempted
    assert_eq!(store.calls(), vec![(ResourceCategory::Client, 2)]);
}

#[tokio::test]
async fn test_empty_catalog_categories_are_left_alone() {
    let store = RecordingStore::new(None);
    let report = ResourceProvisioner::new(InMemoryCatalog::default())
        .provision(&store)
        .await
        .unwrap();

    assert!(store.calls().is_empty());
    for category in ResourceCategory::PROVISIONING_ORDER {
        assert_eq!(report.outcome(category), Some(CategoryOutcome::NothingToInsert));
    }
}
