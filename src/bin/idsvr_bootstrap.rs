// ABOUTME: Identity server startup gate running schema migrations and catalog provisioning
// ABOUTME: Keeps sweeping expired operational grants after a successful bootstrap until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Identity server bootstrap.
//!
//! Brings the operational, provisioning and user identity schemas up to date,
//! provisions the Bankly resource catalog, then runs the expired grant sweep
//! until Ctrl+C. Any bootstrap failure exits with a non-zero status.
//!
//! Usage:
//! ```bash
//! # Bootstrap using ./appsettings.json and ENVIRONMENT (default Production)
//! idsvr-bootstrap
//!
//! # Explicit content root and environment
//! idsvr-bootstrap --content-root /srv/idsvr --environment Staging
//!
//! # Migrate and provision, then exit (CI, init containers)
//! idsvr-bootstrap --exit-after-bootstrap
//! ```

use anyhow::{Context, Result};
use bankly_core::constants::service_names;
use bankly_identity_server::bootstrap::{
    bootstrap_contexts, run_token_cleanup, MigrationBootstrapper, SchemaContexts,
};
use bankly_identity_server::config::{ConnectionResolver, ResolverSettings};
use bankly_identity_server::logging::LoggingConfig;
use bankly_identity_server::provisioning::{BanklyCatalog, ResourceProvisioner};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "idsvr-bootstrap",
    about = "Bankly identity server bootstrap",
    long_about = "Apply pending schema migrations and provision the static OAuth2 catalog before the identity server starts"
)]
struct Args {
    /// Directory holding appsettings.json (defaults to the current directory)
    #[arg(long)]
    content_root: Option<PathBuf>,

    /// Environment name (overrides ENVIRONMENT)
    #[arg(long)]
    environment: Option<String>,

    /// Exit once the bootstrap has finished instead of running token cleanup
    #[arg(long)]
    exit_after_bootstrap: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let content_root = match args.content_root {
        Some(path) => path,
        None => env::current_dir().context("cannot determine the current directory")?,
    };
    let settings = ResolverSettings::from_process(content_root, args.environment);

    LoggingConfig::from_variables(
        &settings.environment_variables,
        service_names::IDENTITY_SERVER,
        &settings.environment_name,
    )
    .init()?;

    info!(
        content_root = %settings.base_path.display(),
        environment = %settings.environment_name,
        "Bootstrapping identity server"
    );

    let resolver = ConnectionResolver::load(&settings)?;
    let bootstrap_settings = resolver.bootstrap_settings()?;
    let contexts = SchemaContexts::create(&resolver, &bootstrap_settings)?;
    let bootstrapper = MigrationBootstrapper::new(
        ResourceProvisioner::new(BanklyCatalog)
            .with_strategy(bootstrap_settings.provisioning_strategy),
    );

    let report = bootstrap_contexts(&contexts, &bootstrapper)
        .await
        .context("bootstrap failed, identity server will not start")?;
    info!(
        migrations_applied = report.migrations_applied(),
        rows_provisioned = report.provisioning.inserted(),
        "Identity server schemas ready"
    );

    if !args.exit_after_bootstrap {
        run_token_cleanup(&contexts.operational, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for shutdown signal");
            }
        })
        .await;
        info!("Shutdown signal received");
    }

    contexts.close().await;
    Ok(())
}
