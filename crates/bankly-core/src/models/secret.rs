// ABOUTME: Client secret model with SHA-256 hashing for catalog-defined OAuth2 clients
// ABOUTME: Secrets are hashed before they ever reach the provisioning store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Secret type recorded for hashed shared secrets
pub const SHARED_SECRET: &str = "SharedSecret";

/// Hashed client secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Base64-encoded SHA-256 digest of the plain secret
    pub value: String,
    /// Secret type (always [`SHARED_SECRET`] for catalog secrets)
    pub secret_type: String,
    /// Optional description shown in admin tooling
    pub description: Option<String>,
}

impl Secret {
    /// Hash a plain-text shared secret.
    ///
    /// The stored value is `base64(sha256(utf8(plain)))`, which is what the token
    /// endpoint compares incoming client secrets against.
    #[must_use]
    pub fn sha256(plain: &str) -> Self {
        Self {
            value: hash_secret(plain),
            secret_type: SHARED_SECRET.to_owned(),
            description: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check a plain-text candidate against this secret
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.value == hash_secret(candidate)
    }
}

// The digest never goes to logs, not even hashed.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("value", &"<redacted>")
            .field("secret_type", &self.secret_type)
            .field("description", &self.description)
            .finish()
    }
}

fn hash_secret(plain: &str) -> String {
    let digest = Sha256::digest(plain.as_bytes());
    STANDARD.encode(digest)
}
