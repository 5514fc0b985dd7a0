// ABOUTME: Versioned migration runner with per-schema history tables and checksum verification
// ABOUTME: Applies compiled-in migrations in ascending order, each inside its own transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Migrations
//!
//! Each schema context owns a compiled-in list of [`Migration`]s and a history
//! table. "Pending" means compiled in but not recorded. Pending migrations are
//! applied in ascending version order; the statements and the history row of one
//! migration commit together or not at all.

/// Operational grant schema (persisted grants, device codes)
pub mod operational;
/// Provisioning schema (clients, resources, scopes)
pub mod provisioning;
/// User identity schema (users, roles, claims)
pub mod identity;

use super::{format_timestamp, SchemaContextType};
use bankly_core::errors::{AppError, AppResult, ErrorCode};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{AnyPool, Row};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// One versioned schema change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Strictly increasing version number
    pub version: i64,
    /// Short snake-case description
    pub description: &'static str,
    /// Statements executed in order inside one transaction
    pub statements: &'static [&'static str],
}

impl Migration {
    /// Hex SHA-256 of the migration statements, recorded when the migration is applied
    #[must_use]
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.statements.join("\n").as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Migration applied during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    /// Version applied
    pub version: i64,
    /// Description of the migration
    pub description: String,
}

/// Outcome of applying pending migrations to one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Schema the migrations belong to
    pub context: SchemaContextType,
    /// Migrations applied by this run, in application order
    pub applied: Vec<AppliedMigration>,
    /// Migrations that were already recorded before the run
    pub already_applied: usize,
}

impl MigrationReport {
    /// Whether the run changed the schema
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applied and pending versions of one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Schema inspected
    pub context: SchemaContextType,
    /// Versions recorded in the history table and compiled in
    pub applied: Vec<i64>,
    /// Compiled versions not yet recorded, ascending
    pub pending: Vec<i64>,
    /// Recorded versions this build does not know about
    pub unknown: Vec<i64>,
}

impl MigrationStatus {
    /// Whether the schema is at the latest compiled version
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

struct RecordedMigration {
    checksum: String,
}

/// Runs a compiled migration set against one schema's history table
#[derive(Debug, Clone)]
pub struct Migrator<'a> {
    kind: SchemaContextType,
    migrations: &'a [Migration],
    label: String,
}

impl<'a> Migrator<'a> {
    /// Migrator for `migrations`, recording `label` with each applied version
    #[must_use]
    pub fn new(kind: SchemaContextType, migrations: &'a [Migration], label: &str) -> Self {
        Self {
            kind,
            migrations,
            label: label.to_owned(),
        }
    }

    /// Apply every pending migration in ascending version order
    ///
    /// # Errors
    ///
    /// Returns a `MigrationFailed` error if the compiled set has duplicate versions,
    /// an applied migration's checksum changed, or any pending migration fails. A
    /// failed migration is rolled back; migrations applied before it stay applied.
    pub async fn run(&self, pool: &AnyPool) -> AppResult<MigrationReport> {
        let compiled = self.compiled_by_version()?;
        self.ensure_history_table(pool).await?;
        let recorded = self.recorded(pool).await?;
        self.verify_recorded(&compiled, &recorded)?;

        let pending: Vec<&Migration> = compiled
            .values()
            .filter(|migration| !recorded.contains_key(&migration.version))
            .copied()
            .collect();

        if pending.is_empty() {
            info!(schema.context = %self.kind, "Schema is up to date");
        }

        let mut applied = Vec::with_capacity(pending.len());
        for migration in pending {
            self.apply(pool, migration).await?;
            applied.push(AppliedMigration {
                version: migration.version,
                description: migration.description.to_owned(),
            });
        }

        Ok(MigrationReport {
            context: self.kind,
            already_applied: compiled.len() - applied.len(),
            applied,
        })
    }

    /// Report applied, pending and unknown versions without applying anything
    ///
    /// The history table is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a `MigrationFailed` error if the compiled set is invalid or the
    /// history cannot be read.
    pub async fn status(&self, pool: &AnyPool) -> AppResult<MigrationStatus> {
        let compiled = self.compiled_by_version()?;
        self.ensure_history_table(pool).await?;
        let recorded = self.recorded(pool).await?;

        let applied = compiled
            .keys()
            .filter(|version| recorded.contains_key(version))
            .copied()
            .collect();
        let pending = compiled
            .keys()
            .filter(|version| !recorded.contains_key(version))
            .copied()
            .collect();
        let unknown = recorded
            .keys()
            .filter(|version| !compiled.contains_key(version))
            .copied()
            .collect();

        Ok(MigrationStatus {
            context: self.kind,
            applied,
            pending,
            unknown,
        })
    }

    fn compiled_by_version(&self) -> AppResult<BTreeMap<i64, &'a Migration>> {
        let mut seen = HashSet::with_capacity(self.migrations.len());
        let mut by_version = BTreeMap::new();
        for migration in self.migrations {
            if !seen.insert(migration.version) {
                return Err(AppError::migration_failed(format!(
                    "{} migration set declares version {} more than once",
                    self.kind, migration.version
                )));
            }
            by_version.insert(migration.version, migration);
        }
        Ok(by_version)
    }

    async fn ensure_history_table(&self, pool: &AnyPool) -> AppResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                checksum TEXT NOT NULL,
                migrations_label TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
            self.kind.history_table()
        );
        sqlx::query(&ddl).execute(pool).await.map_err(|e| {
            AppError::from(e).reclassify(
                ErrorCode::MigrationFailed,
                format!("cannot create migration history for {} schema", self.kind),
            )
        })?;
        Ok(())
    }

    async fn recorded(&self, pool: &AnyPool) -> AppResult<BTreeMap<i64, RecordedMigration>> {
        let query = format!(
            "SELECT version, checksum FROM {} ORDER BY version",
            self.kind.history_table()
        );
        let history_error = |e: sqlx::Error| {
            AppError::from(e).reclassify(
                ErrorCode::MigrationFailed,
                format!("cannot read migration history for {} schema", self.kind),
            )
        };

        let rows = sqlx::query(&query)
            .fetch_all(pool)
            .await
            .map_err(history_error)?;

        let mut recorded = BTreeMap::new();
        for row in rows {
            let version: i64 = row.try_get("version").map_err(history_error)?;
            let checksum: String = row.try_get("checksum").map_err(history_error)?;
            recorded.insert(version, RecordedMigration { checksum });
        }
        Ok(recorded)
    }

    fn verify_recorded(
        &self,
        compiled: &BTreeMap<i64, &Migration>,
        recorded: &BTreeMap<i64, RecordedMigration>,
    ) -> AppResult<()> {
        for (version, entry) in recorded {
            match compiled.get(version) {
                Some(migration) if migration.checksum() != entry.checksum => {
                    return Err(AppError::migration_failed(format!(
                        "{} migration {version} ({}) was modified after it was applied",
                        self.kind, migration.description
                    )));
                }
                Some(_) => {}
                None => warn!(
                    schema.context = %self.kind,
                    migration.version = version,
                    "Recorded migration is not part of this build"
                ),
            }
        }
        Ok(())
    }

    async fn apply(&self, pool: &AnyPool, migration: &Migration) -> AppResult<()> {
        let failed = |e: sqlx::Error| {
            AppError::from(e).reclassify(
                ErrorCode::MigrationFailed,
                format!(
                    "{} migration {} ({}) failed",
                    self.kind, migration.version, migration.description
                ),
            )
        };

        let mut tx = pool.begin().await.map_err(failed)?;
        for statement in migration.statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(failed)?;
        }

        let insert = format!(
            "INSERT INTO {} (version, description, checksum, migrations_label, applied_at)
             VALUES ($1, $2, $3, $4, $5)",
            self.kind.history_table()
        );
        sqlx::query(&insert)
            .bind(migration.version)
            .bind(migration.description)
            .bind(migration.checksum())
            .bind(&self.label)
            .bind(format_timestamp(Utc::now()))
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        info!(
            schema.context = %self.kind,
            migration.version = migration.version,
            migration.description = migration.description,
            "Applied migration"
        );
        Ok(())
    }
}
