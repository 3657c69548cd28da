//! Config redaction: produce safe-to-share config snapshots by masking credentials.

use serde_json::Value;

/// Keys whose string values are credentials.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "accessToken",
    "access_token",
    "token",
    "secret",
    "password",
    "privateKey",
    "private_key",
    "credentials",
];

/// Redact a config JSON value, replacing credentials with a short hint + `***`.
///
/// The resulting value is safe to print from `bugscope config show` or log.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    let hint: String = if s.chars().count() > 8 {
        s.chars().take(4).collect()
    } else {
        String::new()
    };
    Value::String(format!("{hint}***"))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Collect all field paths that carry credentials (for diagnostics).
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_llm_and_ocr_keys() {
        let v = json!({
            "llm": { "apiKey": "AIzaSyD-very-secret-value" },
            "ocr": { "apiKey": "short" }
        });
        let redacted = redact(&v);
        assert_eq!(redacted["llm"]["apiKey"], "AIza***");
        assert_eq!(redacted["ocr"]["apiKey"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "llm": { "model": "gemini-2.0-flash" } });
        let redacted = redact(&v);
        assert_eq!(redacted["logging"]["level"], "debug");
        assert_eq!(redacted["llm"]["model"], "gemini-2.0-flash");
    }

    #[test]
    fn lists_credential_paths() {
        let v = json!({ "llm": { "apiKey": "x" }, "ocr": { "apiKey": "" } });
        assert_eq!(collect_redacted_paths(&v), vec!["llm.apiKey".to_string()]);
    }
}
