//! Pre-parse cleanup of reply text.

use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*(\r?\n|$)").unwrap());
static CLOSE_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\r?\n|^)```[ \t]*$").unwrap());

/// Drop a leading fence line (```` ``` ```` or ```` ```json ````) and a trailing fence.
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = match OPEN_FENCE_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let text = match CLOSE_FENCE_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    text.trim()
}

/// Remove or escape control characters U+0000..U+001F.
///
/// Inside string literals a raw newline, tab or carriage return becomes its
/// escape sequence and anything else is dropped. Outside strings whitespace
/// is kept and other control characters are dropped.
pub fn sanitize_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if c < '\u{20}' {
            match (in_string, c) {
                (true, '\n') => out.push_str("\\n"),
                (true, '\t') => out.push_str("\\t"),
                (true, '\r') => out.push_str("\\r"),
                (false, '\n' | '\t' | '\r') => out.push(c),
                _ => {}
            }
            escaped = false;
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_fences("{}"), "{}");
    }

    #[test]
    fn escapes_newlines_inside_strings_only() {
        let raw = "{\n\"code\": \"a\nb\tc\"\n}";
        assert_eq!(sanitize_control_chars(raw), "{\n\"code\": \"a\\nb\\tc\"\n}");
    }

    #[test]
    fn drops_other_control_chars() {
        let raw = "{\u{0}\"a\": \"x\u{7}y\"}";
        assert_eq!(sanitize_control_chars(raw), "{\"a\": \"xy\"}");
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let raw = "\"say \\\"hi\n\\\"\"";
        assert_eq!(sanitize_control_chars(raw), "\"say \\\"hi\\n\\\"\"");
    }
}
