//! Relaxed parser for JavaScript object literals.
//!
//! Player setup calls pass plain object literals rather than JSON: keys are
//! often unquoted, strings may use single quotes, trailing commas and
//! comments appear. The literal is rewritten into strict JSON token by token
//! and then handed to `serde_json`.

use std::iter::Peekable;
use std::str::Chars;

use serde_json::Value;

/// Parses a JavaScript-style object literal into a JSON value.
///
/// Bare identifiers become strings except `true`, `false` and `null`.
///
/// # Errors
///
/// Returns the `serde_json` error when the rewritten text is still not JSON
/// (unbalanced braces, unterminated strings, function values, ...).
pub fn parse_object_literal(source: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&to_strict_json(source))
}

/// Returns the byte length of the object literal `source` starts with,
/// through its matching closing brace.
///
/// Braces inside strings and comments are not counted. `None` when `source`
/// does not start with `{` or the literal never closes.
pub(crate) fn literal_len(source: &str) -> Option<usize> {
    if !source.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut chars = source.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' | '\'' => {
                while let Some((_, c)) = chars.next() {
                    if c == '\\' {
                        chars.next();
                    } else if c == ch {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn to_strict_json(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\'' => push_string(&mut out, &mut chars, ch),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ',' if closes_after_whitespace(&chars) => {}
            c if c.is_ascii_digit() || c == '-' => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || matches!(next, '.' | '+' | '-') {
                        out.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            c if is_ident_start(c) => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if is_ident_continue(next) {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if matches!(ident.as_str(), "true" | "false" | "null") {
                    out.push_str(&ident);
                } else {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn push_string(out: &mut String, chars: &mut Peekable<Chars<'_>>, quote: char) {
    out.push('"');
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '"' if quote == '\'' => out.push_str("\\\""),
            c if c == quote => break,
            c => out.push(c),
        }
    }
    out.push('"');
}

fn closes_after_whitespace(chars: &Peekable<Chars<'_>>) -> bool {
    chars
        .clone()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c == '}' || c == ']')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
