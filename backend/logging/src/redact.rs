//! Log Redaction Layer
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9\-_]{20,})|(AIza[0-9A-Za-z\-_]{30,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)")
        .unwrap()
});
static KEY_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    KEY_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_and_google_keys() {
        let raw = "auth Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 key AIzaSyA1234567890abcdefghijklmnopqrstu";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("AIzaSyA1234567890"));
    }

    #[test]
    fn redacts_key_query_parameter() {
        let url = "https://vision.googleapis.com/v1/images:annotate?key=abc123&alt=json";
        assert_eq!(
            redact_sensitive_data(url),
            "https://vision.googleapis.com/v1/images:annotate?key=[REDACTED_TOKEN]&alt=json"
        );
    }

    #[test]
    fn leaves_code_alone() {
        let code = "def add(a, b):\n    return a + b";
        assert_eq!(redact_sensitive_data(code), code);
    }
}
