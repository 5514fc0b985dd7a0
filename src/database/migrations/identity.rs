// ABOUTME: Compiled migrations for the user identity schema
// ABOUTME: Users, roles and the claim, login and token tables hanging off them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Migration;

/// User identity schema migrations, ascending
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_users_and_roles",
        statements: &[
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                user_name TEXT NOT NULL,
                normalized_user_name TEXT NOT NULL UNIQUE,
                email TEXT,
                normalized_email TEXT,
                email_confirmed BOOLEAN NOT NULL,
                password_hash TEXT,
                security_stamp TEXT,
                concurrency_stamp TEXT,
                phone_number TEXT,
                phone_number_confirmed BOOLEAN NOT NULL,
                two_factor_enabled BOOLEAN NOT NULL,
                lockout_end TEXT,
                lockout_enabled BOOLEAN NOT NULL,
                access_failed_count BIGINT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_users_normalized_email ON users(normalized_email)",
            "CREATE TABLE IF NOT EXISTS roles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                normalized_name TEXT NOT NULL UNIQUE,
                concurrency_stamp TEXT
            )",
            "CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, role_id)
            )",
        ],
    },
    Migration {
        version: 2,
        description: "create_user_claims_logins_tokens",
        statements: &[
            "CREATE TABLE IF NOT EXISTS user_claims (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                claim_type TEXT NOT NULL,
                claim_value TEXT
            )",
            "CREATE TABLE IF NOT EXISTS user_logins (
                login_provider TEXT NOT NULL,
                provider_key TEXT NOT NULL,
                provider_display_name TEXT,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (login_provider, provider_key)
            )",
            "CREATE TABLE IF NOT EXISTS user_tokens (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                login_provider TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT,
                PRIMARY KEY (user_id, login_provider, name)
            )",
            "CREATE TABLE IF NOT EXISTS role_claims (
                id TEXT PRIMARY KEY,
                role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
                claim_type TEXT NOT NULL,
                claim_value TEXT
            )",
        ],
    },
];
