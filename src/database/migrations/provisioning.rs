// ABOUTME: Compiled migrations for the provisioning schema
// ABOUTME: Clients with their grant types, secrets and scopes, plus identity and API resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Migration;

/// Provisioning schema migrations, ascending
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_clients",
        statements: &[
            "CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL UNIQUE,
                client_name TEXT,
                require_client_secret BOOLEAN NOT NULL,
                allow_offline_access BOOLEAN NOT NULL,
                access_token_lifetime BIGINT NOT NULL,
                identity_token_lifetime BIGINT NOT NULL,
                authorization_code_lifetime BIGINT NOT NULL,
                enabled BOOLEAN NOT NULL,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS client_grant_types (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                grant_type TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS client_secrets (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                value TEXT NOT NULL,
                secret_type TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS client_scopes (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                scope TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_client_grant_types_client ON client_grant_types(client_id)",
            "CREATE INDEX IF NOT EXISTS idx_client_secrets_client ON client_secrets(client_id)",
            "CREATE INDEX IF NOT EXISTS idx_client_scopes_client ON client_scopes(client_id)",
        ],
    },
    Migration {
        version: 2,
        description: "create_resources",
        statements: &[
            "CREATE TABLE IF NOT EXISTS identity_resources (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                display_name TEXT,
                description TEXT,
                required BOOLEAN NOT NULL,
                emphasize BOOLEAN NOT NULL,
                show_in_discovery_document BOOLEAN NOT NULL,
                enabled BOOLEAN NOT NULL,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS identity_resource_claims (
                id TEXT PRIMARY KEY,
                identity_resource_id TEXT NOT NULL REFERENCES identity_resources(id) ON DELETE CASCADE,
                claim_type TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS api_resources (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                display_name TEXT,
                description TEXT,
                enabled BOOLEAN NOT NULL,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS api_resource_scopes (
                id TEXT PRIMARY KEY,
                api_resource_id TEXT NOT NULL REFERENCES api_resources(id) ON DELETE CASCADE,
                scope TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS api_resource_claims (
                id TEXT PRIMARY KEY,
                api_resource_id TEXT NOT NULL REFERENCES api_resources(id) ON DELETE CASCADE,
                claim_type TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS api_scopes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                display_name TEXT,
                description TEXT,
                required BOOLEAN NOT NULL,
                emphasize BOOLEAN NOT NULL,
                enabled BOOLEAN NOT NULL,
                created_at TEXT NOT NULL
            )",
        ],
    },
];
