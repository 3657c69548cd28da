//! `bugscope-config`: runtime configuration management.
//!
//! Provides:
//! - Typed config schema (LLM provider, OCR, upload limits, extraction, server, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution
//! - Config redaction for safe logging/display
//! - Default value application
//! - Validation, where a missing credential is fatal at startup

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw_config, resolve_config_path, write_yaml};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{BugscopeConfig, LlmConfig, LoggingConfig, OcrConfig, ProviderKind, ServerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, apply env substitution, apply defaults and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Any
/// validation error (most commonly a missing API key) is returned as an error.
pub async fn load_and_prepare(path: &Path) -> Result<BugscopeConfig> {
    let raw = load_raw_config(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    finish(value)
}

/// Same pipeline as [`load_and_prepare`] over an in-memory tree and env map.
pub fn prepare_with(raw: &Value, env: &HashMap<String, String>) -> Result<BugscopeConfig> {
    let value = resolve_env_vars_with(raw, env).context("Failed to resolve env vars in config")?;
    finish(value)
}

fn finish(value: Value) -> Result<BugscopeConfig> {
    let config: BugscopeConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("invalid configuration: {}", report.error_summary());
    }

    Ok(config)
}
