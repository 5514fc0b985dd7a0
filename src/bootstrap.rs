// ABOUTME: Startup bootstrap sequencing schema migrations across contexts, then catalog provisioning
// ABOUTME: Owns the scoped set of schema contexts and the periodic operational token cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Bootstrap
//!
//! Runs once per process start, before the identity server accepts requests:
//!
//! 1. Apply pending migrations to the operational grant schema
//! 2. Apply pending migrations to the provisioning schema
//! 3. Apply pending migrations to the user identity schema
//! 4. Provision the resource catalog into the provisioning schema
//!
//! Any failure aborts the sequence and is returned unchanged. Nothing is retried.

use crate::config::{BootstrapSettings, ConnectionResolver};
use crate::database::{
    ConnectionSpec, ContextFactory, MigrationReport, OperationalGrantContext, ProvisioningContext,
    SchemaContext, UserIdentityContext,
};
use crate::provisioning::{
    ProvisioningReport, ProvisioningStore, ResourceCatalog, ResourceProvisioner,
};
use bankly_core::errors::AppResult;
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Everything one bootstrap run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Migration outcome per schema, in application order
    pub migrations: Vec<MigrationReport>,
    /// Provisioning outcome per category
    pub provisioning: ProvisioningReport,
}

impl BootstrapReport {
    /// Number of migrations applied across all schemas
    #[must_use]
    pub fn migrations_applied(&self) -> usize {
        self.migrations.iter().map(|m| m.applied.len()).sum()
    }
}

/// Sequences migrations and provisioning over caller-supplied contexts
pub struct MigrationBootstrapper<C: ResourceCatalog> {
    provisioner: ResourceProvisioner<C>,
}

impl<C: ResourceCatalog> MigrationBootstrapper<C> {
    /// Bootstrapper provisioning through `provisioner`
    #[must_use]
    pub const fn new(provisioner: ResourceProvisioner<C>) -> Self {
        Self { provisioner }
    }

    /// Migrate operational, provisioning and identity schemas in that order, then provision
    ///
    /// The contexts are borrowed; releasing them is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns the first `MigrationFailed` or `ProvisioningFailed` error. Provisioning
    /// never starts if any migration failed.
    pub async fn run<O, P, U>(
        &self,
        operational: &O,
        provisioning: &P,
        identity: &U,
    ) -> AppResult<BootstrapReport>
    where
        O: SchemaContext,
        P: SchemaContext + ProvisioningStore,
        U: SchemaContext,
    {
        let migrations = vec![
            migrate(operational).await?,
            migrate(provisioning).await?,
            migrate(identity).await?,
        ];

        info!(
            strategy = %self.provisioner.strategy(),
            "Provisioning resource catalog"
        );
        let provisioning = self.provisioner.provision(provisioning).await?;

        let report = BootstrapReport {
            migrations,
            provisioning,
        };
        info!(
            migrations_applied = report.migrations_applied(),
            rows_provisioned = report.provisioning.inserted(),
            "Bootstrap complete"
        );
        Ok(report)
    }
}

async fn migrate<S: SchemaContext>(context: &S) -> AppResult<MigrationReport> {
    info!(schema.context = %S::KIND, "Applying pending migrations");
    let report = context
        .apply_pending_migrations()
        .await
        .inspect_err(|e| error!(schema.context = %S::KIND, error = %e, "Migration failed"))?;
    debug!(
        schema.context = %S::KIND,
        applied = report.applied.len(),
        already_applied = report.already_applied,
        "Migrations finished"
    );
    Ok(report)
}

/// The three schema contexts of one bootstrap scope
#[derive(Debug, Clone)]
pub struct SchemaContexts {
    /// Clients, resources and scopes
    pub provisioning: ProvisioningContext,
    /// Persisted grants and device codes
    pub operational: OperationalGrantContext,
    /// Users and roles
    pub identity: UserIdentityContext,
}

impl SchemaContexts {
    /// Resolve each context's connection string and build its handle
    ///
    /// No connection is opened yet.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unresolvable connection string and an
    /// `InvalidInput` error for a malformed one.
    pub fn create(resolver: &ConnectionResolver, settings: &BootstrapSettings) -> AppResult<Self> {
        let environment = resolver.environment_name();

        let provisioning = ContextFactory::<ProvisioningContext>::new(settings.pool)
            .create_from_configuration(
                resolver,
                &ConnectionSpec::for_context(ProvisioningContext::KIND, environment),
            )?;
        let operational = ContextFactory::<OperationalGrantContext>::new(settings.pool)
            .with_store_options(settings.operational_store)
            .create_from_configuration(
                resolver,
                &ConnectionSpec::for_context(OperationalGrantContext::KIND, environment),
            )?;
        let identity = ContextFactory::<UserIdentityContext>::new(settings.pool)
            .create_from_configuration(
                resolver,
                &ConnectionSpec::for_context(UserIdentityContext::KIND, environment),
            )?;

        Ok(Self {
            provisioning,
            operational,
            identity,
        })
    }

    /// Run the bootstrap sequence over these contexts
    ///
    /// # Errors
    ///
    /// See [`MigrationBootstrapper::run`].
    pub async fn bootstrap<C: ResourceCatalog>(
        &self,
        bootstrapper: &MigrationBootstrapper<C>,
    ) -> AppResult<BootstrapReport> {
        bootstrapper
            .run(&self.operational, &self.provisioning, &self.identity)
            .await
    }

    /// Release every pooled connection
    pub async fn close(&self) {
        self.operational.close().await;
        self.provisioning.close().await;
        self.identity.close().await;
    }
}

/// Build the contexts, run the bootstrap and release the contexts again
///
/// Contexts are closed on success and on failure.
///
/// # Errors
///
/// Returns the first configuration, argument, migration or provisioning error.
pub async fn bootstrap<C: ResourceCatalog>(
    resolver: &ConnectionResolver,
    catalog: C,
) -> AppResult<BootstrapReport> {
    let settings = resolver.bootstrap_settings()?;
    let contexts = SchemaContexts::create(resolver, &settings)?;
    let bootstrapper = MigrationBootstrapper::new(
        ResourceProvisioner::new(catalog).with_strategy(settings.provisioning_strategy),
    );

    let report = bootstrap_contexts(&contexts, &bootstrapper).await?;
    contexts.close().await;
    Ok(report)
}

/// Run the bootstrap over `contexts`, closing them if it fails
///
/// On success the contexts stay open for the caller.
///
/// # Errors
///
/// See [`MigrationBootstrapper::run`].
pub async fn bootstrap_contexts<C: ResourceCatalog>(
    contexts: &SchemaContexts,
    bootstrapper: &MigrationBootstrapper<C>,
) -> AppResult<BootstrapReport> {
    match contexts.bootstrap(bootstrapper).await {
        Ok(report) => Ok(report),
        Err(e) => {
            error!(error = %e, "Bootstrap failed, releasing schema contexts");
            contexts.close().await;
            Err(e)
        }
    }
}

/// Remove expired grants every cleanup interval until `shutdown` completes
///
/// Does nothing when token cleanup is disabled. A failed sweep is logged and
/// retried on the next tick.
pub async fn run_token_cleanup<F>(context: &OperationalGrantContext, shutdown: F)
where
    F: Future<Output = ()> + Send,
{
    let options = *context.store_options();
    if !options.enable_token_cleanup {
        info!("Token cleanup disabled");
        shutdown.await;
        return;
    }

    info!(
        interval_secs = options.token_cleanup_interval.as_secs(),
        "Starting token cleanup"
    );
    // tokio panics on a zero period
    let period = options.token_cleanup_interval.max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match context.remove_expired_grants(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "Removed expired grants"),
                    Err(e) => warn!(error = %e, "Token cleanup failed"),
                }
            }
            () = &mut shutdown => {
                debug!("Token cleanup received shutdown signal");
                break;
            }
        }
    }
}
