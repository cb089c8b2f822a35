//! `showroom-config`: configuration for the Showroom admin console.
//!
//! Provides:
//! - Typed config schema (backend, storage bucket, logging, catalog)
//! - YAML read/write with backup rotation, JSON session file helpers
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation with errors and warnings
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{
    config_dir, config_file_path, load_config, load_json, remove_file, save_json,
    session_file_path, write_config,
};
pub use redact::{collect_redacted_paths, redact};
pub use schema::ShowroomConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars, apply overrides and defaults,
/// then log validation findings.
///
/// Validation errors are logged, not returned: `config validate` wants to
/// print the whole report, and commands that need the backend fail on their
/// own when it is missing.
pub async fn load_and_prepare(path: &Path) -> Result<ShowroomConfig> {
    let raw = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: ShowroomConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(apply_env_overrides(config));

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::debug!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
