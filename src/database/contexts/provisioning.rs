// ABOUTME: Provisioning schema context storing OAuth2 clients, identity resources, API resources and scopes
// ABOUTME: Implements ProvisioningStore with one transaction per inserted category
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::migrations::provisioning;
use crate::database::{
    format_timestamp, ContextOptions, Migration, SchemaContext, SchemaContextType,
};
use crate::provisioning::ProvisioningStore;
use async_trait::async_trait;
use bankly_core::constants::token_lifetimes;
use bankly_core::errors::{AppError, AppResult};
use bankly_core::models::{
    ApiResourceDefinition, ApiScopeDefinition, ClientDefinition, IdentityResourceDefinition,
    ResourceCatalogEntry, ResourceCategory,
};
use chrono::Utc;
use sqlx::{Any, AnyConnection, Row, Transaction};
use std::collections::HashSet;
use uuid::Uuid;

/// Token lifetimes written for clients that do not override them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningStoreOptions {
    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,
    /// Identity token lifetime in seconds
    pub identity_token_lifetime: i64,
    /// Authorization code lifetime in seconds
    pub authorization_code_lifetime: i64,
}

impl Default for ProvisioningStoreOptions {
    fn default() -> Self {
        Self {
            access_token_lifetime: token_lifetimes::ACCESS_TOKEN_SECS,
            identity_token_lifetime: token_lifetimes::IDENTITY_TOKEN_SECS,
            authorization_code_lifetime: token_lifetimes::AUTHORIZATION_CODE_SECS,
        }
    }
}

/// Handle to the provisioning schema
#[derive(Debug, Clone)]
pub struct ProvisioningContext {
    options: ContextOptions,
    store_options: ProvisioningStoreOptions,
}

impl ProvisioningContext {
    /// Store options the context was built with
    #[must_use]
    pub const fn store_options(&self) -> &ProvisioningStoreOptions {
        &self.store_options
    }

    async fn insert_client(
        &self,
        conn: &mut AnyConnection,
        client: &ClientDefinition,
        created_at: &str,
    ) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        let lifetimes = &self.store_options;

        sqlx::query(
            "INSERT INTO clients (id, client_id, client_name, require_client_secret,
                allow_offline_access, access_token_lifetime, identity_token_lifetime,
                authorization_code_lifetime, enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&id)
        .bind(&client.client_id)
        .bind(client.client_name.as_deref())
        .bind(client.require_client_secret)
        .bind(client.allow_offline_access)
        .bind(
            client
                .access_token_lifetime
                .unwrap_or(lifetimes.access_token_lifetime),
        )
        .bind(lifetimes.identity_token_lifetime)
        .bind(lifetimes.authorization_code_lifetime)
        .bind(true)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        for grant_type in &client.allowed_grant_types {
            sqlx::query(
                "INSERT INTO client_grant_types (id, client_id, grant_type) VALUES ($1, $2, $3)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(grant_type.as_str())
            .execute(&mut *conn)
            .await?;
        }

        for secret in &client.client_secrets {
            sqlx::query(
                "INSERT INTO client_secrets (id, client_id, value, secret_type, description, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&secret.value)
            .bind(&secret.secret_type)
            .bind(secret.description.as_deref())
            .bind(created_at)
            .execute(&mut *conn)
            .await?;
        }

        insert_children(
            conn,
            "INSERT INTO client_scopes (id, client_id, scope) VALUES ($1, $2, $3)",
            &id,
            &client.allowed_scopes,
        )
        .await
    }

    async fn insert_identity_resource(
        conn: &mut AnyConnection,
        resource: &IdentityResourceDefinition,
        created_at: &str,
    ) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO identity_resources (id, name, display_name, description, required,
                emphasize, show_in_discovery_document, enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&id)
        .bind(&resource.name)
        .bind(resource.display_name.as_deref())
        .bind(resource.description.as_deref())
        .bind(resource.required)
        .bind(resource.emphasize)
        .bind(resource.show_in_discovery_document)
        .bind(true)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        insert_children(
            conn,
            "INSERT INTO identity_resource_claims (id, identity_resource_id, claim_type)
             VALUES ($1, $2, $3)",
            &id,
            &resource.user_claims,
        )
        .await
    }

    async fn insert_api_resource(
        conn: &mut AnyConnection,
        resource: &ApiResourceDefinition,
        created_at: &str,
    ) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO api_resources (id, name, display_name, description, enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&id)
        .bind(&resource.name)
        .bind(resource.display_name.as_deref())
        .bind(resource.description.as_deref())
        .bind(true)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        insert_children(
            conn,
            "INSERT INTO api_resource_scopes (id, api_resource_id, scope) VALUES ($1, $2, $3)",
            &id,
            &resource.scopes,
        )
        .await?;
        insert_children(
            conn,
            "INSERT INTO api_resource_claims (id, api_resource_id, claim_type) VALUES ($1, $2, $3)",
            &id,
            &resource.user_claims,
        )
        .await
    }

    async fn insert_api_scope(
        conn: &mut AnyConnection,
        scope: &ApiScopeDefinition,
        created_at: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO api_scopes (id, name, display_name, description, required, emphasize,
                enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&scope.name)
        .bind(scope.display_name.as_deref())
        .bind(scope.description.as_deref())
        .bind(scope.required)
        .bind(scope.emphasize)
        .bind(true)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

async fn insert_children(
    conn: &mut AnyConnection,
    statement: &str,
    parent_id: &str,
    values: &[String],
) -> AppResult<()> {
    for value in values {
        sqlx::query(statement)
            .bind(Uuid::new_v4().to_string())
            .bind(parent_id)
            .bind(value)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ProvisioningStore for ProvisioningContext {
    async fn category_row_count(&self, category: ResourceCategory) -> AppResult<i64> {
        let query = format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            category.table_name()
        );
        let row = sqlx::query(&query).fetch_one(self.pool()).await?;
        Ok(row.try_get("row_count")?)
    }

    async fn existing_identifiers(&self, category: ResourceCategory) -> AppResult<HashSet<String>> {
        let query = format!(
            "SELECT {} AS identifier FROM {}",
            category.identifier_column(),
            category.table_name()
        );
        let rows = sqlx::query(&query).fetch_all(self.pool()).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("identifier").map_err(AppError::from))
            .collect()
    }

    async fn insert_entries(
        &self,
        category: ResourceCategory,
        entries: &[ResourceCatalogEntry],
    ) -> AppResult<usize> {
        if let Some(stray) = entries.iter().find(|entry| entry.category() != category) {
            return Err(AppError::invalid_input(format!(
                "catalog entry '{}' is a {}, not a {category}",
                stray.identifier(),
                stray.category()
            )));
        }

        let created_at = format_timestamp(Utc::now());
        let mut tx: Transaction<'_, Any> = self.pool().begin().await?;

        for entry in entries {
            match entry {
                ResourceCatalogEntry::Client(client) => {
                    self.insert_client(&mut tx, client, &created_at).await?;
                }
                ResourceCatalogEntry::IdentityResource(resource) => {
                    Self::insert_identity_resource(&mut tx, resource, &created_at).await?;
                }
                ResourceCatalogEntry::ApiResource(resource) => {
                    Self::insert_api_resource(&mut tx, resource, &created_at).await?;
                }
                ResourceCatalogEntry::ApiScope(scope) => {
                    Self::insert_api_scope(&mut tx, scope, &created_at).await?;
                }
            }
        }

        // Dropping the transaction on an early return rolls the category back.
        tx.commit().await?;
        Ok(entries.len())
    }
}

impl SchemaContext for ProvisioningContext {
    type StoreOptions = ProvisioningStoreOptions;

    const KIND: SchemaContextType = SchemaContextType::Provisioning;

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
        provisioning::MIGRATIONS
    }
}
