// ABOUTME: Core data models for the identity server bootstrap
// ABOUTME: Re-exports the resource catalog entry types and hashed client secrets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Catalog entries are hand-authored, immutable definitions. They are built fresh
//! on every bootstrap run and never read back from the database.

mod catalog;
mod secret;

pub use catalog::{
    ApiResourceDefinition, ApiScopeDefinition, ClientDefinition, GrantType,
    IdentityResourceDefinition, ResourceCatalogEntry, ResourceCategory,
};
pub use secret::{Secret, SHARED_SECRET};
