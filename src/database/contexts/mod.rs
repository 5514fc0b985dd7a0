// ABOUTME: Concrete schema contexts, one per SchemaContextType
// ABOUTME: Each context carries its own store options and compiled migration set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod identity;
mod operational;
mod provisioning;

pub use identity::UserIdentityContext;
pub use operational::{OperationalGrantContext, OperationalStoreOptions};
pub use provisioning::{ProvisioningContext, ProvisioningStoreOptions};
