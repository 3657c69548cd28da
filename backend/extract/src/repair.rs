//! Best-effort fixes for almost-JSON replies.
//!
//! Each pass only rewrites text outside double-quoted string literals, so
//! code carried inside `corrected_code` is left alone.

/// Apply every repair in order: quotes, Python literals, trailing commas.
pub fn repair_json(text: &str) -> String {
    remove_trailing_commas(&replace_python_literals(&requote_single_quotes(text)))
}

/// Rewrite single-quoted strings as double-quoted ones.
///
/// Double quotes inside a single-quoted span are escaped and `\'` becomes a
/// bare apostrophe.
pub fn requote_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_double = false;
    let mut in_single = false;

    while let Some(c) = chars.next() {
        if in_double {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' => in_double = false,
                _ => {}
            }
        } else if in_single {
            match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                '\'' => {
                    out.push('"');
                    in_single = false;
                }
                _ => out.push(c),
            }
        } else {
            match c {
                '"' => {
                    in_double = true;
                    out.push(c);
                }
                '\'' => {
                    in_single = true;
                    out.push('"');
                }
                _ => out.push(c),
            }
        }
    }
    out
}

/// Replace bare `True`, `False` and `None` tokens with their JSON spellings.
pub fn replace_python_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
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
        } else if !prev.is_some_and(is_ident_char) {
            let literal = [("True", "true"), ("False", "false"), ("None", "null")]
                .into_iter()
                .find(|(py, _)| {
                    rest.starts_with(py)
                        && !rest[py.len()..].chars().next().is_some_and(is_ident_char)
                });
            if let Some((py, json)) = literal {
                out.push_str(json);
                rest = &rest[py.len()..];
                prev = py.chars().last();
                continue;
            }
        }
        out.push(c);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drop commas that directly precede `}` or `]`.
pub fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
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
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Every balanced `{...}` span in `text`, in order of their opening brace.
///
/// Brackets inside quoted strings (single or double) are ignored. Spans may
/// nest; an opening brace that never closes yields nothing.
pub fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(start, _)| balanced_from(text, start).map(|end| &text[start..end]))
}

fn balanced_from(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
