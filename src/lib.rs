// ABOUTME: Main library entry point for the Bankly identity server bootstrap
// ABOUTME: Schema migration sequencing, catalog provisioning and environment-aware connection resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Bankly Identity Server Bootstrap
//!
//! Brings the identity server's relational schemas to the latest compiled version
//! and provisions its static `OAuth2` configuration before the server starts
//! accepting requests.
//!
//! ## Components
//!
//! - **Configuration**: resolves named connection strings from `appsettings.json`,
//!   `appsettings.<Environment>.json` and environment variables
//! - **Database**: one schema context per logical schema, built by a generic
//!   factory, each with its own migration history
//! - **Provisioning**: idempotent insertion of clients, identity resources, API
//!   resources and API scopes, one category at a time
//! - **Bootstrap**: the fixed startup order tying the above together
//!
//! ## Entry points
//!
//! - `idsvr-bootstrap`: runs the bootstrap for the live service, then sweeps
//!   expired grants until shut down
//! - `idsvr-migrate`: design-time tool inspecting and applying migrations per
//!   schema context without starting the service

/// Startup sequencing of migrations and provisioning
pub mod bootstrap;
/// Layered configuration and connection string resolution
pub mod config;
/// Schema contexts, context factory and migrations
pub mod database;
/// Structured logging setup
pub mod logging;
/// Static catalog provisioning
pub mod provisioning;

pub use bankly_core::errors::{AppError, AppResult, ErrorCode};
