//! Terminal rendering of analysis and generation results.

use bugscope_assistant::GenerationOutcome;
use bugscope_core::AnalysisResult;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        eprintln!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        eprintln!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Result rendering
// ---------------------------------------------------------------------------

fn heading(out: &mut String, color: &str, title: &str) {
    out.push_str(&format!("{color}{BOLD}{title}{RESET}\n"));
}

fn bullet_section(out: &mut String, color: &str, title: &str, items: &[String]) {
    heading(out, color, title);
    if items.is_empty() {
        out.push_str(&format!("  {DIM}(none){RESET}\n"));
    }
    for item in items {
        out.push_str(&format!("  • {item}\n"));
    }
    out.push('\n');
}

/// Four labeled lists and the corrected code, or the error.
pub fn render_analysis(result: &AnalysisResult, language: &str) -> String {
    let mut out = String::new();
    if let Some(error) = &result.error {
        out.push_str(&format!("{RED}{BOLD}Analysis failed:{RESET} {error}\n"));
        return finish(out);
    }

    bullet_section(&mut out, RED, "Bugs", &result.bugs);
    bullet_section(&mut out, GREEN, "Fixes", &result.fixes);
    bullet_section(&mut out, BLUE, "Optimizations", &result.optimizations);
    bullet_section(&mut out, MAGENTA, "Explanation", &result.explanation);

    heading(&mut out, CYAN, &format!("Corrected code ({language})"));
    if result.corrected_code.is_empty() {
        out.push_str(&format!("  {DIM}(unchanged){RESET}\n"));
    } else {
        out.push_str(&format!("{DIM}```{RESET}\n{}\n{DIM}```{RESET}\n", result.corrected_code));
    }
    finish(out)
}

pub fn render_generation(outcome: &GenerationOutcome) -> String {
    let generated = &outcome.generated;
    let mut out = String::new();
    heading(&mut out, CYAN, &format!("Generated code ({})", outcome.file_name));
    out.push_str(&format!("{}\n\n", generated.code));
    bullet_section(&mut out, BLUE, "System Overview", &generated.overview);
    bullet_section(&mut out, GREEN, "Key Features", &generated.features);
    bullet_section(&mut out, MAGENTA, "Future Extensions", &generated.extensions);
    finish(out)
}

fn finish(out: String) -> String {
    if supports_color() {
        out
    } else {
        strip_ansi(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_lists_and_code() {
        let result = AnalysisResult {
            corrected_code: "print(1)".into(),
            bugs: vec!["missing paren".into()],
            fixes: vec![],
            optimizations: vec![],
            explanation: vec!["syntax".into()],
            error: None,
        };
        let plain = strip_ansi(&render_analysis(&result, "python"));
        assert!(plain.contains("Bugs\n  • missing paren\n"));
        assert!(plain.contains("Fixes\n  (none)\n"));
        assert!(plain.contains("Corrected code (python)\n```\nprint(1)\n```"));
    }

    #[test]
    fn renders_error_only() {
        let plain = strip_ansi(&render_analysis(&AnalysisResult::failed("boom"), "auto"));
        assert_eq!(plain, "Analysis failed: boom\n");
    }
}
