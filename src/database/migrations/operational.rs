// ABOUTME: Compiled migrations for the operational grant schema
// ABOUTME: Persisted grants and device flow codes with expiration indexes for token cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Migration;

/// Operational grant schema migrations, ascending
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_persisted_grants",
        statements: &[
            "CREATE TABLE IF NOT EXISTS persisted_grants (
                grant_key TEXT PRIMARY KEY,
                grant_type TEXT NOT NULL,
                subject_id TEXT,
                session_id TEXT,
                client_id TEXT NOT NULL,
                description TEXT,
                creation_time TEXT NOT NULL,
                expiration TEXT,
                consumed_time TEXT,
                data TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_persisted_grants_expiration ON persisted_grants(expiration)",
            "CREATE INDEX IF NOT EXISTS idx_persisted_grants_subject ON persisted_grants(subject_id, client_id, grant_type)",
        ],
    },
    Migration {
        version: 2,
        description: "create_device_codes",
        statements: &[
            "CREATE TABLE IF NOT EXISTS device_codes (
                user_code TEXT PRIMARY KEY,
                device_code TEXT NOT NULL UNIQUE,
                subject_id TEXT,
                session_id TEXT,
                client_id TEXT NOT NULL,
                description TEXT,
                creation_time TEXT NOT NULL,
                expiration TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_device_codes_expiration ON device_codes(expiration)",
        ],
    },
];
