// ABOUTME: User identity schema context (users, roles, claims, logins)
// ABOUTME: Needs no store options; only owns its connection and migration set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::migrations::identity;
use crate::database::{ContextOptions, Migration, SchemaContext, SchemaContextType};

/// Handle to the user identity schema
#[derive(Debug, Clone)]
pub struct UserIdentityContext {
    options: ContextOptions,
}

impl SchemaContext for UserIdentityContext {
    type StoreOptions = ();

    const KIND: SchemaContextType = SchemaContextType::UserIdentity;

    fn from_options(options: ContextOptions, (): Self::StoreOptions) -> Self {
        Self { options }
    }

    fn options(&self) -> &ContextOptions {
        &self.options
    }

    fn migrations() -> &'static [Migration] {
        identity::MIGRATIONS
    }
}
