// ABOUTME: Idempotent provisioning of the static OAuth2 resource catalog into the provisioning schema
// ABOUTME: Processes categories in a fixed order, one atomic insert per category
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resource Provisioning
//!
//! The provisioner walks [`ResourceCategory::PROVISIONING_ORDER`] and, for each
//! category, decides what to insert based on the [`ProvisioningStrategy`]:
//!
//! - [`ProvisioningStrategy::SkipPopulatedCategories`] treats any existing row as
//!   "already provisioned" and skips the whole category. Entries added to the
//!   catalog after the first deployment are therefore never inserted.
//! - [`ProvisioningStrategy::InsertMissingEntries`] keys entries by their stable
//!   identifier and inserts only those not already stored.
//!
//! A category's inserts commit together. A failure stops the run: categories
//! committed before it stay provisioned and are skipped on the next start.

mod catalog;

pub use catalog::BanklyCatalog;

use async_trait::async_trait;
use bankly_core::errors::{AppError, AppResult, ErrorCode};
use bankly_core::models::{ResourceCatalogEntry, ResourceCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Source of the static catalog entries to provision
pub trait ResourceCatalog: Send + Sync {
    /// Every catalog entry, in authoring order
    fn entries(&self) -> Vec<ResourceCatalogEntry>;

    /// Entries of one category, in authoring order
    fn entries_for(&self, category: ResourceCategory) -> Vec<ResourceCatalogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.category() == category)
            .collect()
    }
}

/// Catalog backed by a plain list of entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCatalog {
    entries: Vec<ResourceCatalogEntry>,
}

impl InMemoryCatalog {
    /// Catalog holding `entries`
    #[must_use]
    pub fn new(entries: Vec<ResourceCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<ResourceCatalogEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }
}

impl ResourceCatalog for InMemoryCatalog {
    fn entries(&self) -> Vec<ResourceCatalogEntry> {
        self.entries.clone()
    }
}

/// Storage operations the provisioner needs from the provisioning schema
#[async_trait]
pub trait ProvisioningStore: Send + Sync {
    /// Number of rows in the category's backing table
    async fn category_row_count(&self, category: ResourceCategory) -> AppResult<i64>;

    /// Identifiers already stored for the category
    async fn existing_identifiers(&self, category: ResourceCategory) -> AppResult<HashSet<String>>;

    /// Insert `entries` and their child rows in a single transaction
    ///
    /// Either every entry is committed or none is.
    async fn insert_entries(
        &self,
        category: ResourceCategory,
        entries: &[ResourceCatalogEntry],
    ) -> AppResult<usize>;
}

/// How the provisioner decides whether an entry is already present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningStrategy {
    /// A category with at least one row is skipped entirely
    #[default]
    SkipPopulatedCategories,
    /// Entries whose identifier is not yet stored are inserted
    InsertMissingEntries,
}

impl fmt::Display for ProvisioningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipPopulatedCategories => f.write_str("SkipPopulatedCategories"),
            Self::InsertMissingEntries => f.write_str("InsertMissingEntries"),
        }
    }
}

impl FromStr for ProvisioningStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skippopulatedcategories" | "skip_populated_categories" => {
                Ok(Self::SkipPopulatedCategories)
            }
            "insertmissingentries" | "insert_missing_entries" => Ok(Self::InsertMissingEntries),
            other => Err(AppError::config_invalid(format!(
                "unknown provisioning strategy '{other}' \
                 (expected SkipPopulatedCategories or InsertMissingEntries)"
            ))),
        }
    }
}

/// What happened to one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryOutcome {
    /// Rows were inserted
    Inserted(usize),
    /// The category already had rows and was left untouched
    SkippedAlreadyProvisioned {
        /// Rows found in the backing table
        existing_rows: i64,
    },
    /// The catalog had nothing new for the category
    NothingToInsert,
}

/// Per-category outcomes of one provisioning run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisioningReport {
    /// Outcome per category
    pub categories: Vec<(ResourceCategory, CategoryOutcome)>,
}

impl ProvisioningReport {
    /// Outcome recorded for `category`
    #[must_use]
    pub fn outcome(&self, category: ResourceCategory) -> Option<CategoryOutcome> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, outcome)| *outcome)
    }

    /// Total rows inserted across categories
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.categories
            .iter()
            .map(|(_, outcome)| match outcome {
                CategoryOutcome::Inserted(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

/// Inserts the static catalog into a provisioning store
pub struct ResourceProvisioner<C: ResourceCatalog> {
    catalog: C,
    strategy: ProvisioningStrategy,
}

impl<C: ResourceCatalog> ResourceProvisioner<C> {
    /// Provisioner with the default presence-based strategy
    #[must_use]
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            strategy: ProvisioningStrategy::default(),
        }
    }

    /// Use a different idempotency strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: ProvisioningStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Strategy in effect
    #[must_use]
    pub const fn strategy(&self) -> ProvisioningStrategy {
        self.strategy
    }

    /// Provision every category in the fixed order
    ///
    /// # Errors
    ///
    /// Returns a `ProvisioningFailed` error on the first category that cannot be
    /// read or inserted, or if the catalog lists one identifier twice within a
    /// category. Categories before the failing one stay committed.
    pub async fn provision<S>(&self, store: &S) -> AppResult<ProvisioningReport>
    where
        S: ProvisioningStore + ?Sized,
    {
        let mut report = ProvisioningReport::default();
        for category in ResourceCategory::PROVISIONING_ORDER {
            let outcome = self
                .provision_category(store, category)
                .await
                .map_err(|e| {
                    if e.code == ErrorCode::ProvisioningFailed {
                        e
                    } else {
                        e.reclassify(
                            ErrorCode::ProvisioningFailed,
                            format!("provisioning category {category} failed"),
                        )
                    }
                })?;

            match outcome {
                CategoryOutcome::Inserted(rows) => {
                    info!(provisioning.category = %category, rows, "Provisioned category");
                }
                CategoryOutcome::SkippedAlreadyProvisioned { existing_rows } => info!(
                    provisioning.category = %category,
                    rows = existing_rows,
                    "Category already provisioned, skipping"
                ),
                CategoryOutcome::NothingToInsert => info!(
                    provisioning.category = %category,
                    "Nothing to provision"
                ),
            }
            report.categories.push((category, outcome));
        }
        Ok(report)
    }

    async fn provision_category<S>(
        &self,
        store: &S,
        category: ResourceCategory,
    ) -> AppResult<CategoryOutcome>
    where
        S: ProvisioningStore + ?Sized,
    {
        let entries = self.catalog.entries_for(category);
        reject_duplicate_identifiers(category, &entries)?;

        let to_insert = match self.strategy {
            ProvisioningStrategy::SkipPopulatedCategories => {
                let existing_rows = store.category_row_count(category).await?;
                if existing_rows > 0 {
                    return Ok(CategoryOutcome::SkippedAlreadyProvisioned { existing_rows });
                }
                entries
            }
            ProvisioningStrategy::InsertMissingEntries => {
                let existing = store.existing_identifiers(category).await?;
                entries
                    .into_iter()
                    .filter(|entry| !existing.contains(entry.identifier()))
                    .collect()
            }
        };

        if to_insert.is_empty() {
            return Ok(CategoryOutcome::NothingToInsert);
        }

        let inserted = store.insert_entries(category, &to_insert).await?;
        Ok(CategoryOutcome::Inserted(inserted))
    }
}

fn reject_duplicate_identifiers(
    category: ResourceCategory,
    entries: &[ResourceCatalogEntry],
) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.identifier()) {
            warn!(
                provisioning.category = %category,
                identifier = entry.identifier(),
                "Duplicate catalog identifier"
            );
            return Err(AppError::provisioning_failed(format!(
                "catalog lists {category} '{}' more than once",
                entry.identifier()
            )));
        }
    }
    Ok(())
}
