//! Config loading and the `bugscope config` subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bugscope_config::{
    apply_all_defaults, collect_redacted_paths, collect_referenced_vars, load_and_prepare,
    load_raw_config, redact, resolve_config_path, resolve_env_vars, validate, write_yaml,
    BugscopeConfig,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Commented starter config written by `bugscope config init`.
const CONFIG_TEMPLATE: &str = r#"# bugscope configuration
# ${VAR} references are resolved from the environment at startup.

llm:
  provider: gemini            # gemini | openrouter | ollama
  apiKey: ${GEMINI_API_KEY}
  # model: gemini-2.0-flash
  maxOutputTokens: 4096
  temperature: 0.2
  replyFormat: json           # json | headings

ocr:
  enabled: true
  apiKey: ${GOOGLE_VISION_API_KEY}
  timeoutSecs: 30
  languageHints: [en]
  retry:
    maxAttempts: 3
    baseDelayMs: 1000

limits:
  maxImageBytes: 5242880
  maxSourceBytes: 1048576
  maxCodeChars: 15000

server:
  bind: 127.0.0.1
  port: 8080

logging:
  level: info
  # dir: ~/.bugscope/logs
"#;

/// Load, substitute, default and validate the config. Fatal on any error.
pub async fn load(explicit: Option<&Path>) -> Result<(PathBuf, BugscopeConfig)> {
    let path = resolve_config_path(explicit);
    let config = load_and_prepare(&path)
        .await
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((path, config))
}

/// Print every validation error and warning. Returns whether the config is usable.
pub async fn check(explicit: Option<&Path>) -> Result<bool> {
    let path = resolve_config_path(explicit);
    note_info(&format!("Checking {}", path.display()));

    let raw = load_raw_config(&path).await?;
    let vars = collect_referenced_vars(&raw);
    if !vars.is_empty() {
        note_info(&format!("Environment references: {}", vars.join(", ")));
    }
    let value = match resolve_env_vars(&raw) {
        Ok(value) => value,
        Err(e) => {
            note_error(&format!("{e:#}"));
            return Ok(false);
        }
    };
    let config: BugscopeConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let report = validate(&apply_all_defaults(config));

    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    if report.is_valid() {
        note_success("Config is valid");
    }
    Ok(report.is_valid())
}

/// Render the effective config as YAML with credentials masked.
pub async fn show(explicit: Option<&Path>) -> Result<String> {
    let (_, config) = load(explicit).await?;
    let (yaml, masked) = render_redacted(&config)?;
    if !masked.is_empty() {
        note_info(&format!("Masked: {}", masked.join(", ")));
    }
    Ok(yaml)
}

/// Redacted YAML plus the paths of the values that were masked.
fn render_redacted(config: &BugscopeConfig) -> Result<(String, Vec<String>)> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let yaml = serde_yaml::to_string(&redact(&value)).context("Failed to render config")?;
    Ok((yaml, collect_redacted_paths(&value)))
}

/// Write the starter config. Refuses to overwrite unless `force` is set.
pub async fn init(explicit: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = resolve_config_path(explicit);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite; a backup is kept)",
            path.display()
        );
    }
    write_yaml(CONFIG_TEMPLATE, &path).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn template_prepares_with_credentials() {
        let raw: serde_json::Value = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        let env: HashMap<String, String> = [
            ("GEMINI_API_KEY".to_string(), "AIza-test".to_string()),
            ("GOOGLE_VISION_API_KEY".to_string(), "AIza-ocr".to_string()),
        ]
        .into_iter()
        .collect();
        let config = bugscope_config::prepare_with(&raw, &env).unwrap();
        assert_eq!(config.limits.max_code_chars, 15_000);
        assert_eq!(config.ocr.retry.max_attempts, 3);
    }

    #[test]
    fn show_masks_credentials_and_names_them() {
        let mut config = BugscopeConfig::default();
        config.llm.api_key = Some("AIzaSyD-very-secret-value".to_string());
        let (yaml, masked) = render_redacted(&config).unwrap();
        assert!(!yaml.contains("very-secret"));
        assert!(yaml.contains("AIza***"));
        assert!(masked.contains(&"llm.apiKey".to_string()));
        assert!(!masked.contains(&"ocr.apiKey".to_string()));
    }
}
