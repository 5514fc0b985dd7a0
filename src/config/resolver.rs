// ABOUTME: Layered connection string resolver over base settings, environment override and environment variables
// ABOUTME: Takes every input explicitly so the live service and offline tooling share one code path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::BootstrapSettings;
use bankly_core::constants::{configuration, defaults, env_vars};
use bankly_core::errors::{AppError, AppResult};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Explicit inputs of connection resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Directory holding `appsettings.json`
    pub base_path: PathBuf,
    /// Environment name selecting `appsettings.<name>.json`
    pub environment_name: String,
    /// Highest-priority layer, keyed like `ConnectionStrings__Users`
    pub environment_variables: HashMap<String, String>,
}

impl ResolverSettings {
    /// Settings with no environment variable layer
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, environment_name: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            environment_name: environment_name.into(),
            environment_variables: HashMap::new(),
        }
    }

    /// Add one environment variable to the override layer
    #[must_use]
    pub fn with_environment_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(name.into(), value.into());
        self
    }

    /// Replace the environment variable layer
    #[must_use]
    pub fn with_environment_variables(
        mut self,
        variables: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.environment_variables = variables.into_iter().collect();
        self
    }

    /// Capture the process environment
    ///
    /// Only entry points call this. The environment name is `environment_override`
    /// when given, else `ENVIRONMENT`, else `Production`.
    #[must_use]
    pub fn from_process(
        base_path: impl Into<PathBuf>,
        environment_override: Option<String>,
    ) -> Self {
        let variables: HashMap<String, String> = env::vars().collect();
        let environment_name = environment_override
            .or_else(|| variables.get(env_vars::ENVIRONMENT).cloned())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| defaults::ENVIRONMENT_NAME.to_owned());

        Self {
            base_path: base_path.into(),
            environment_name,
            environment_variables: variables,
        }
    }

    fn base_file(&self) -> PathBuf {
        self.base_path.join(configuration::BASE_SETTINGS_FILE)
    }

    fn environment_file(&self) -> PathBuf {
        self.base_path.join(format!(
            "{}.{}.{}",
            configuration::ENVIRONMENT_SETTINGS_PREFIX,
            self.environment_name,
            configuration::SETTINGS_EXTENSION
        ))
    }
}

/// Merged configuration able to resolve named connection strings
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    environment_name: String,
    config: Config,
}

impl ConnectionResolver {
    /// Load and merge the three configuration layers
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` if the base settings file does not exist and
    /// `ConfigInvalid` if any settings file cannot be read or parsed.
    pub fn load(settings: &ResolverSettings) -> AppResult<Self> {
        let base_file = settings.base_file();
        let base = read_settings_file(&base_file)?.ok_or_else(|| {
            AppError::config_missing(format!(
                "base settings file {} not found",
                base_file.display()
            ))
        })?;

        let mut builder = Config::builder().add_source(File::from_str(&base, FileFormat::Json));

        let environment_file = settings.environment_file();
        match read_settings_file(&environment_file)? {
            Some(overrides) => {
                debug!(file = %environment_file.display(), "Layering environment settings");
                builder = builder.add_source(File::from_str(&overrides, FileFormat::Json));
            }
            None => debug!(
                file = %environment_file.display(),
                "No environment settings file, using base settings"
            ),
        }

        let variables: config::Map<String, String> = settings
            .environment_variables
            .iter()
            .filter(|(name, _)| is_configuration_key(name))
            .map(|(name, value)| (name.to_lowercase(), value.clone()))
            .collect();
        builder = builder.add_source(
            Environment::default()
                .separator(configuration::ENVIRONMENT_SEPARATOR)
                .source(Some(variables)),
        );

        let config = builder.build().map_err(|e| {
            AppError::config_invalid(format!(
                "cannot merge configuration for environment {}",
                settings.environment_name
            ))
            .with_source(e)
        })?;

        Ok(Self {
            environment_name: settings.environment_name.clone(),
            config,
        })
    }

    /// Environment the configuration was loaded for
    #[must_use]
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    /// Look up `ConnectionStrings:<key>` in the merged configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when the key is absent from every layer or its value
    /// is empty, and `ConfigInvalid` when the value is not a string.
    pub fn resolve(&self, connection_string_key: &str) -> AppResult<String> {
        let path = format!(
            "{}.{}",
            configuration::CONNECTION_STRINGS_SECTION.to_lowercase(),
            connection_string_key.to_lowercase()
        );
        let missing = || {
            AppError::config_missing(format!(
                "connection string '{connection_string_key}' is not configured for environment {}",
                self.environment_name
            ))
        };

        let value = match self.config.get_string(&path) {
            Ok(value) => value,
            Err(ConfigError::NotFound(_)) => return Err(missing()),
            Err(e) => {
                return Err(AppError::config_invalid(format!(
                    "connection string '{connection_string_key}' cannot be read"
                ))
                .with_source(e))
            }
        };

        let value = value.trim();
        if value.is_empty() {
            return Err(missing());
        }
        Ok(value.to_owned())
    }

    /// Bootstrap switches from the `Bootstrap` section, with defaults for absent keys
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a present value has the wrong type or range.
    pub fn bootstrap_settings(&self) -> AppResult<BootstrapSettings> {
        BootstrapSettings::from_config(&self.config)
    }
}

/// Resolve one connection string in a single call
///
/// # Errors
///
/// Any error of [`ConnectionResolver::load`] or [`ConnectionResolver::resolve`].
pub fn resolve_connection_string(
    settings: &ResolverSettings,
    connection_string_key: &str,
) -> AppResult<String> {
    ConnectionResolver::load(settings)?.resolve(connection_string_key)
}

/// Read a JSON settings file with keys folded to lower case; `None` if it does not exist
fn read_settings_file(path: &Path) -> AppResult<Option<String>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::config_invalid(format!(
                "cannot read settings file {}",
                path.display()
            ))
            .with_source(e))
        }
    };

    let parsed: Value = serde_json::from_str(&text).map_err(|e| {
        AppError::config_invalid(format!("settings file {} is not valid JSON", path.display()))
            .with_source(e)
    })?;

    Ok(Some(normalize_keys(parsed).to_string()))
}

// Variables such as `FOO__` or `dotted.name` do not map to a configuration path.
fn is_configuration_key(name: &str) -> bool {
    name.split(configuration::ENVIRONMENT_SEPARATOR).all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

// Keys compare case-insensitively; null values count as absent.
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.to_lowercase(), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}
