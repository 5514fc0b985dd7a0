// ABOUTME: Command implementations of the design-time migration tool
// ABOUTME: Each command opens the selected schema contexts, acts on them and closes them again
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use bankly_core::errors::AppResult;
use bankly_identity_server::config::{BootstrapSettings, ConnectionResolver};
use bankly_identity_server::database::{
    redact_connection_string, ConnectionSpec, ContextFactory, MigrationReport, MigrationStatus,
    OperationalGrantContext, ProvisioningContext, SchemaContext, SchemaContextType,
    UserIdentityContext,
};
use clap::ValueEnum;
use tracing::{error, info};

/// Schema contexts a command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContextSelection {
    /// Clients, resources and scopes
    Provisioning,
    /// Persisted grants and device codes
    Operational,
    /// Users and roles
    Identity,
    /// All three, in bootstrap order
    All,
}

impl ContextSelection {
    fn kinds(self) -> Vec<SchemaContextType> {
        match self {
            Self::Provisioning => vec![SchemaContextType::Provisioning],
            Self::Operational => vec![SchemaContextType::OperationalGrant],
            Self::Identity => vec![SchemaContextType::UserIdentity],
            Self::All => SchemaContextType::MIGRATION_ORDER.to_vec(),
        }
    }
}

/// A handle of any of the three context types
enum OpenContext {
    Provisioning(ProvisioningContext),
    Operational(OperationalGrantContext),
    Identity(UserIdentityContext),
}

impl OpenContext {
    fn open(
        kind: SchemaContextType,
        resolver: &ConnectionResolver,
        settings: &BootstrapSettings,
    ) -> AppResult<Self> {
        let spec = ConnectionSpec::for_context(kind, resolver.environment_name());
        Ok(match kind {
            SchemaContextType::Provisioning => Self::Provisioning(
                ContextFactory::<ProvisioningContext>::new(settings.pool)
                    .create_from_configuration(resolver, &spec)?,
            ),
            SchemaContextType::OperationalGrant => Self::Operational(
                ContextFactory::<OperationalGrantContext>::new(settings.pool)
                    .with_store_options(settings.operational_store)
                    .create_from_configuration(resolver, &spec)?,
            ),
            SchemaContextType::UserIdentity => Self::Identity(
                ContextFactory::<UserIdentityContext>::new(settings.pool)
                    .create_from_configuration(resolver, &spec)?,
            ),
        })
    }

    fn connection_string(&self) -> &str {
        match self {
            Self::Provisioning(c) => c.options().connection_string(),
            Self::Operational(c) => c.options().connection_string(),
            Self::Identity(c) => c.options().connection_string(),
        }
    }

    async fn status(&self) -> AppResult<MigrationStatus> {
        match self {
            Self::Provisioning(c) => c.migration_status().await,
            Self::Operational(c) => c.migration_status().await,
            Self::Identity(c) => c.migration_status().await,
        }
    }

    async fn apply(&self) -> AppResult<MigrationReport> {
        match self {
            Self::Provisioning(c) => c.apply_pending_migrations().await,
            Self::Operational(c) => c.apply_pending_migrations().await,
            Self::Identity(c) => c.apply_pending_migrations().await,
        }
    }

    async fn ping(&self) -> AppResult<()> {
        match self {
            Self::Provisioning(c) => c.ping().await,
            Self::Operational(c) => c.ping().await,
            Self::Identity(c) => c.ping().await,
        }
    }

    async fn close(&self) {
        match self {
            Self::Provisioning(c) => c.close().await,
            Self::Operational(c) => c.close().await,
            Self::Identity(c) => c.close().await,
        }
    }
}

/// Print applied and pending migrations
pub async fn status(
    resolver: &ConnectionResolver,
    settings: &BootstrapSettings,
    selection: ContextSelection,
) -> AppResult<()> {
    for kind in selection.kinds() {
        let context = OpenContext::open(kind, resolver, settings)?;
        let result = context.status().await;
        context.close().await;
        let status = result?;

        println!("{kind}:");
        println!("  applied: {:?}", status.applied);
        println!("  pending: {:?}", status.pending);
        if !status.unknown.is_empty() {
            println!("  unknown to this build: {:?}", status.unknown);
        }
    }
    Ok(())
}

/// Apply pending migrations to each selected context, stopping at the first failure
pub async fn apply(
    resolver: &ConnectionResolver,
    settings: &BootstrapSettings,
    selection: ContextSelection,
) -> AppResult<()> {
    for kind in selection.kinds() {
        let context = OpenContext::open(kind, resolver, settings)?;
        let result = context.apply().await;
        context.close().await;
        let report = result?;

        if report.is_noop() {
            println!("{kind}: up to date ({} applied)", report.already_applied);
        } else {
            for migration in &report.applied {
                println!(
                    "{kind}: applied {} {}",
                    migration.version, migration.description
                );
            }
        }
    }
    info!("Migrations complete");
    Ok(())
}

/// Open each selected connection and report whether it works
pub async fn check_connection(
    resolver: &ConnectionResolver,
    settings: &BootstrapSettings,
    selection: ContextSelection,
) -> AppResult<()> {
    let mut first_error = None;
    for kind in selection.kinds() {
        let context = OpenContext::open(kind, resolver, settings)?;
        let redacted = redact_connection_string(context.connection_string());
        let result = context.ping().await;
        context.close().await;

        match result {
            Ok(()) => println!("{kind}: ok ({redacted})"),
            Err(e) => {
                error!(schema.context = %kind, error = %e, "Connection check failed");
                println!("{kind}: FAILED ({redacted})");
                first_error.get_or_insert(e);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}
