//! Config validation: deep schema checks with user-friendly error messages.

use crate::schema::BugscopeConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All error messages joined on one line, for startup failures.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &BugscopeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_llm(config, &mut report);
    validate_ocr(config, &mut report);
    validate_limits(config, &mut report);
    validate_extraction(config, &mut report);
    validate_server(config, &mut report);
    report
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

/// The API credential is required up front; a missing key is not a per-request error.
fn validate_llm(config: &BugscopeConfig, report: &mut ValidationReport) {
    let llm = &config.llm;
    if llm.provider.requires_api_key() && is_blank(&llm.api_key) {
        report.error(
            "llm.apiKey",
            format!("API key is required for provider '{}'", llm.provider),
        );
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        report.error("llm.temperature", "temperature must be between 0.0 and 2.0");
    }
    if llm.max_output_tokens == 0 {
        report.error("llm.maxOutputTokens", "maxOutputTokens must be > 0");
    }
    if llm.timeout_secs == 0 {
        report.error("llm.timeoutSecs", "timeoutSecs must be > 0");
    }
    for (i, setting) in llm.safety.iter().enumerate() {
        if setting.category.trim().is_empty() || setting.threshold.trim().is_empty() {
            report.error(
                format!("llm.safety[{i}]"),
                "category and threshold cannot be empty",
            );
        }
    }
}

fn validate_ocr(config: &BugscopeConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    if !ocr.enabled {
        return;
    }
    if is_blank(&ocr.api_key) {
        report.error(
            "ocr.apiKey",
            "OCR credential is required when OCR is enabled (set ocr.enabled: false to skip)",
        );
    }
    if ocr.timeout_secs == 0 {
        report.error("ocr.timeoutSecs", "timeoutSecs must be > 0");
    }
    if ocr.retry.max_attempts == 0 {
        report.error("ocr.retry.maxAttempts", "maxAttempts must be >= 1");
    }
    if ocr.retry.backoff_factor < 1.0 {
        report.warn(
            "ocr.retry.backoffFactor",
            "backoffFactor below 1.0 makes delays shrink between attempts",
        );
    }
}

fn validate_limits(config: &BugscopeConfig, report: &mut ValidationReport) {
    let limits = &config.limits;
    if limits.max_code_chars == 0 {
        report.error("limits.maxCodeChars", "maxCodeChars must be > 0");
    }
    if limits.max_image_bytes == 0 {
        report.error("limits.maxImageBytes", "maxImageBytes must be > 0");
    }
    if limits.max_source_bytes == 0 {
        report.error("limits.maxSourceBytes", "maxSourceBytes must be > 0");
    }
    if limits.allowed_extensions.is_empty() {
        report.warn("limits.allowedExtensions", "No source extensions allowed; file uploads will be rejected");
    }
    for (i, ext) in limits.allowed_extensions.iter().enumerate() {
        if ext.starts_with('.') || ext.chars().any(|c| c.is_ascii_uppercase()) {
            report.error(
                format!("limits.allowedExtensions[{i}]"),
                format!("'{ext}' must be lowercase and without a leading dot"),
            );
        }
    }
    for (i, mime) in limits.allowed_image_types.iter().enumerate() {
        if !mime.starts_with("image/") {
            report.error(
                format!("limits.allowedImageTypes[{i}]"),
                format!("'{mime}' is not an image MIME type"),
            );
        }
    }
}

fn validate_extraction(config: &BugscopeConfig, report: &mut ValidationReport) {
    let fields = &config.extraction.fields;
    let aliases = [
        ("correctedCode", &fields.corrected_code),
        ("bugs", &fields.bugs),
        ("fixes", &fields.fixes),
        ("optimizations", &fields.optimizations),
        ("explanation", &fields.explanation),
    ];
    for (name, list) in aliases {
        if list.iter().all(|a| a.trim().is_empty()) {
            report.error(
                format!("extraction.fields.{name}"),
                "at least one key spelling is required",
            );
        }
    }
    if config.extraction.excerpt_chars == 0 {
        report.warn("extraction.excerptChars", "extraction errors will carry no reply excerpt");
    }
}

fn validate_server(config: &BugscopeConfig, report: &mut ValidationReport) {
    let port = config.server.port;
    if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BugscopeConfig {
        let mut cfg = BugscopeConfig::default();
        cfg.llm.api_key = Some("AIza-test".to_string());
        cfg.ocr.api_key = Some("AIza-vision".to_string());
        cfg
    }

    #[test]
    fn complete_config_is_valid() {
        let report = validate(&valid_config());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn missing_llm_key_is_error() {
        let mut cfg = valid_config();
        cfg.llm.api_key = None;
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "llm.apiKey");
    }

    #[test]
    fn ollama_needs_no_key() {
        let mut cfg = valid_config();
        cfg.llm.provider = crate::schema::ProviderKind::Ollama;
        cfg.llm.api_key = None;
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn missing_ocr_key_only_matters_when_enabled() {
        let mut cfg = valid_config();
        cfg.ocr.api_key = Some("   ".to_string());
        assert!(!validate(&cfg).is_valid());

        cfg.ocr.enabled = false;
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn rejects_non_image_mime() {
        let mut cfg = valid_config();
        cfg.limits.allowed_image_types.push("application/pdf".to_string());
        let report = validate(&cfg);
        assert!(report.error_summary().contains("allowedImageTypes"));
    }
}
