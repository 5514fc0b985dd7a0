// ABOUTME: Static resource catalog models for OAuth2 clients, API resources, API scopes and identity resources
// ABOUTME: Immutable definitions consumed by the provisioner, one category at a time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::secret::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning category, each backed by its own table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    /// OAuth2 clients
    Client,
    /// OIDC identity resources (`openid`, `profile`, ...)
    IdentityResource,
    /// Protected API resources
    ApiResource,
    /// API scopes
    ApiScope,
}

impl ResourceCategory {
    /// Fixed order in which categories are provisioned
    pub const PROVISIONING_ORDER: [Self; 4] = [
        Self::Client,
        Self::IdentityResource,
        Self::ApiResource,
        Self::ApiScope,
    ];

    /// Table whose row count decides whether the category is already provisioned
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::IdentityResource => "identity_resources",
            Self::ApiResource => "api_resources",
            Self::ApiScope => "api_scopes",
        }
    }

    /// Column holding each entry's stable identifier
    #[must_use]
    pub const fn identifier_column(&self) -> &'static str {
        match self {
            Self::Client => "client_id",
            Self::IdentityResource | Self::ApiResource | Self::ApiScope => "name",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Client => "Client",
            Self::IdentityResource => "IdentityResource",
            Self::ApiResource => "ApiResource",
            Self::ApiScope => "ApiScope",
        };
        f.write_str(name)
    }
}

/// OAuth 2.0 grant types a client may be allowed to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    /// Machine-to-machine `client_credentials`
    ClientCredentials,
    /// Resource owner `password`
    ResourceOwnerPassword,
    /// `authorization_code`
    AuthorizationCode,
    /// `refresh_token`
    RefreshToken,
    /// `implicit`
    Implicit,
    /// Device authorization grant
    DeviceCode,
}

impl GrantType {
    /// Wire name of the grant type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::ResourceOwnerPassword => "password",
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::Implicit => "implicit",
            Self::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth2 client definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDefinition {
    /// Unique client identifier
    pub client_id: String,
    /// Display name
    pub client_name: Option<String>,
    /// Grant types the client may use
    pub allowed_grant_types: Vec<GrantType>,
    /// Hashed client secrets
    pub client_secrets: Vec<Secret>,
    /// Scopes the client may request
    pub allowed_scopes: Vec<String>,
    /// Whether the token endpoint requires a secret from this client
    pub require_client_secret: bool,
    /// Whether refresh tokens may be issued
    pub allow_offline_access: bool,
    /// Access token lifetime override in seconds; store default when `None`
    pub access_token_lifetime: Option<i64>,
}

impl ClientDefinition {
    /// Start a client definition with the identity server defaults
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_name: None,
            allowed_grant_types: Vec::new(),
            client_secrets: Vec::new(),
            allowed_scopes: Vec::new(),
            require_client_secret: true,
            allow_offline_access: false,
            access_token_lifetime: None,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Replace the allowed grant types
    #[must_use]
    pub fn with_grant_types(mut self, grant_types: &[GrantType]) -> Self {
        self.allowed_grant_types = grant_types.to_vec();
        self
    }

    /// Add a secret
    #[must_use]
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.client_secrets.push(secret);
        self
    }

    /// Add an allowed scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.allowed_scopes.push(scope.into());
        self
    }

    /// Allow refresh tokens
    #[must_use]
    pub fn with_offline_access(mut self) -> Self {
        self.allow_offline_access = true;
        self
    }

    /// Override the access token lifetime
    #[must_use]
    pub fn with_access_token_lifetime(mut self, seconds: i64) -> Self {
        self.access_token_lifetime = Some(seconds);
        self
    }
}

/// OIDC identity resource definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResourceDefinition {
    /// Unique resource name, also the scope value
    pub name: String,
    /// Display name for consent screens
    pub display_name: Option<String>,
    /// Description for consent screens
    pub description: Option<String>,
    /// Claims included when the scope is granted
    pub user_claims: Vec<String>,
    /// Whether the user may deselect the scope on consent
    pub required: bool,
    /// Whether consent screens emphasize the scope
    pub emphasize: bool,
    /// Whether the scope is listed in the discovery document
    pub show_in_discovery_document: bool,
}

impl IdentityResourceDefinition {
    /// Custom identity resource
    #[must_use]
    pub fn new(name: impl Into<String>, user_claims: &[&str]) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            user_claims: user_claims.iter().map(|c| (*c).to_owned()).collect(),
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
        }
    }

    /// Standard `openid` scope carrying the subject identifier
    #[must_use]
    pub fn openid() -> Self {
        Self {
            display_name: Some("Your user identifier".to_owned()),
            required: true,
            ..Self::new("openid", &["sub"])
        }
    }

    /// Standard `profile` scope with the OIDC profile claims
    #[must_use]
    pub fn profile() -> Self {
        Self {
            display_name: Some("User profile".to_owned()),
            description: Some("Your user profile information (first name, last name, etc.)".to_owned()),
            emphasize: true,
            ..Self::new(
                "profile",
                &[
                    "name",
                    "family_name",
                    "given_name",
                    "middle_name",
                    "nickname",
                    "preferred_username",
                    "profile",
                    "picture",
                    "website",
                    "gender",
                    "birthdate",
                    "zoneinfo",
                    "locale",
                    "updated_at",
                ],
            )
        }
    }
}

/// Protected API resource definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResourceDefinition {
    /// Unique resource name
    pub name: String,
    /// Display name
    pub display_name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Scopes belonging to this resource
    pub scopes: Vec<String>,
    /// Claims included in access tokens for this resource
    pub user_claims: Vec<String>,
}

impl ApiResourceDefinition {
    /// API resource with a display name
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: Some(display_name.into()),
            description: None,
            scopes: Vec::new(),
            user_claims: Vec::new(),
        }
    }

    /// Add a scope to the resource
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }
}

/// API scope definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiScopeDefinition {
    /// Unique scope name
    pub name: String,
    /// Display name
    pub display_name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Whether the user may deselect the scope on consent
    pub required: bool,
    /// Whether consent screens emphasize the scope
    pub emphasize: bool,
}

impl ApiScopeDefinition {
    /// API scope with only a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            required: false,
            emphasize: false,
        }
    }
}

/// One entry of the static resource catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceCatalogEntry {
    /// OAuth2 client
    Client(ClientDefinition),
    /// Protected API resource
    ApiResource(ApiResourceDefinition),
    /// API scope
    ApiScope(ApiScopeDefinition),
    /// OIDC identity resource
    IdentityResource(IdentityResourceDefinition),
}

impl ResourceCatalogEntry {
    /// Category this entry is provisioned under
    #[must_use]
    pub const fn category(&self) -> ResourceCategory {
        match self {
            Self::Client(_) => ResourceCategory::Client,
            Self::ApiResource(_) => ResourceCategory::ApiResource,
            Self::ApiScope(_) => ResourceCategory::ApiScope,
            Self::IdentityResource(_) => ResourceCategory::IdentityResource,
        }
    }

    /// Stable identifier (client id or resource name)
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Client(c) => &c.client_id,
            Self::ApiResource(r) => &r.name,
            Self::ApiScope(s) => &s.name,
            Self::IdentityResource(r) => &r.name,
        }
    }
}

impl From<ClientDefinition> for ResourceCatalogEntry {
    fn from(client: ClientDefinition) -> Self {
        Self::Client(client)
    }
}

impl From<ApiResourceDefinition> for ResourceCatalogEntry {
    fn from(resource: ApiResourceDefinition) -> Self {
        Self::ApiResource(resource)
    }
}

impl From<ApiScopeDefinition> for ResourceCatalogEntry {
    fn from(scope: ApiScopeDefinition) -> Self {
        Self::ApiScope(scope)
    }
}

impl From<IdentityResourceDefinition> for ResourceCatalogEntry {
    fn from(resource: IdentityResourceDefinition) -> Self {
        Self::IdentityResource(resource)
    }
}
