// ABOUTME: Design-time migration tool for the identity server schema contexts
// ABOUTME: Resolves connections from the working directory or an explicit base path, never a fixed location
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Identity server migration tool.
//!
//! Usage:
//! ```bash
//! # Show applied and pending migrations of every schema
//! idsvr-migrate status
//!
//! # Apply pending migrations to the user identity schema only
//! idsvr-migrate --environment Development apply --context identity
//!
//! # Check that every configured connection string opens
//! idsvr-migrate --base-path ./deploy check-connection
//! ```

mod commands;

use bankly_core::constants::service_names;
use bankly_core::errors::{AppError, AppResult};
use bankly_identity_server::config::{ConnectionResolver, ResolverSettings};
use bankly_identity_server::logging::LoggingConfig;
use clap::{Parser, Subcommand};
use commands::ContextSelection;
use std::env;
use std::path::PathBuf;
use tracing::info;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "idsvr-migrate",
    about = "Bankly identity server migration tool",
    long_about = "Inspect and apply schema migrations for the provisioning, operational grant and user identity contexts without starting the identity server."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding appsettings.json (defaults to the current directory)
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,

    /// Environment name (overrides ENVIRONMENT)
    #[arg(long, global = true)]
    environment: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// List applied and pending migrations
    Status {
        /// Schema context to inspect
        #[arg(long, value_enum, default_value_t = ContextSelection::All)]
        context: ContextSelection,
    },

    /// Apply pending migrations
    Apply {
        /// Schema context to migrate
        #[arg(long, value_enum, default_value_t = ContextSelection::All)]
        context: ContextSelection,
    },

    /// Resolve and open each connection
    CheckConnection {
        /// Schema context to check
        #[arg(long, value_enum, default_value_t = ContextSelection::All)]
        context: ContextSelection,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_path = match cli.base_path {
        Some(path) => path,
        None => env::current_dir().map_err(|e| {
            AppError::config_missing("cannot determine the current directory").with_source(e)
        })?,
    };
    let settings = ResolverSettings::from_process(base_path, cli.environment);

    let mut logging = LoggingConfig::from_variables(
        &settings.environment_variables,
        service_names::MIGRATION_TOOL,
        &settings.environment_name,
    );
    if cli.verbose {
        logging = logging.verbose();
    }
    logging
        .init()
        .map_err(|e| AppError::internal(format!("cannot initialize logging: {e}")))?;

    info!(
        base_path = %settings.base_path.display(),
        environment = %settings.environment_name,
        "Loading configuration"
    );
    let resolver = ConnectionResolver::load(&settings)?;
    let bootstrap_settings = resolver.bootstrap_settings()?;

    match cli.command {
        Command::Status { context } => {
            commands::status(&resolver, &bootstrap_settings, context).await?;
        }
        Command::Apply { context } => {
            commands::apply(&resolver, &bootstrap_settings, context).await?;
        }
        Command::CheckConnection { context } => {
            commands::check_connection(&resolver, &bootstrap_settings, context).await?;
        }
    }

    Ok(())
}
