// ABOUTME: Configuration module for environment-aware connection resolution and bootstrap switches
// ABOUTME: Layers appsettings files and injected environment variables without reading ambient state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the Bankly identity server bootstrap
//!
//! - **Resolver**: layered `appsettings.json` / `appsettings.<env>.json` / environment
//!   variable lookup of named connection strings
//! - **Bootstrap**: pool limits, provisioning strategy and operational store switches
//!   read from the same merged configuration

/// Bootstrap behaviour read from the `Bootstrap` section
pub mod bootstrap;
/// Layered connection string resolution
pub mod resolver;

pub use bootstrap::BootstrapSettings;
pub use resolver::{resolve_connection_string, ConnectionResolver, ResolverSettings};
