// ABOUTME: Bankly's hand-authored resource catalog for the compliance API
// ABOUTME: Two compliance clients, the openid and profile identity resources, one API resource and scope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ResourceCatalog;
use bankly_core::models::{
    ApiResourceDefinition, ApiScopeDefinition, ClientDefinition, GrantType,
    IdentityResourceDefinition, ResourceCatalogEntry, Secret,
};

const COMPLIANCE_SCOPE: &str = "complianceapi";

/// Static catalog deployed with the Bankly identity server
#[derive(Debug, Clone, Copy, Default)]
pub struct BanklyCatalog;

impl BanklyCatalog {
    /// OAuth2 clients
    #[must_use]
    pub fn clients() -> Vec<ClientDefinition> {
        vec![
            ClientDefinition::new("compliance")
                .with_grant_types(&[GrantType::ClientCredentials])
                .with_secret(Secret::sha256("A53j98983nbf8hf83fjjf0383983"))
                .with_scope(COMPLIANCE_SCOPE),
            ClientDefinition::new("ro.compliance")
                .with_grant_types(&[GrantType::ResourceOwnerPassword])
                .with_secret(Secret::sha256("8783784878498jjhjhdjhjh8783pj"))
                .with_scope(COMPLIANCE_SCOPE),
        ]
    }

    /// OIDC identity resources
    #[must_use]
    pub fn identity_resources() -> Vec<IdentityResourceDefinition> {
        vec![
            IdentityResourceDefinition::openid(),
            IdentityResourceDefinition::profile(),
        ]
    }

    /// Protected APIs
    #[must_use]
    pub fn api_resources() -> Vec<ApiResourceDefinition> {
        vec![ApiResourceDefinition::new(
            COMPLIANCE_SCOPE,
            "compliance  api for bankly",
        )]
    }

    /// API scopes
    #[must_use]
    pub fn api_scopes() -> Vec<ApiScopeDefinition> {
        vec![ApiScopeDefinition::new(COMPLIANCE_SCOPE)]
    }
}

impl ResourceCatalog for BanklyCatalog {
    fn entries(&self) -> Vec<ResourceCatalogEntry> {
        Self::clients()
            .into_iter()
            .map(ResourceCatalogEntry::from)
            .chain(
                Self::identity_resources()
                    .into_iter()
                    .map(ResourceCatalogEntry::from),
            )
            .chain(Self::api_resources().into_iter().map(ResourceCatalogEntry::from))
            .chain(Self::api_scopes().into_iter().map(ResourceCatalogEntry::from))
            .collect()
    }
}
