use super::relaxed::{to_strict_json, LEFT_QUOTE, RIGHT_QUOTE};
use crate::error::ParseFailure;
use serde_json::Value;

/// Tolerant decode of model output into a JSON object.
///
/// 1. strip code fences and parse the whole text (strict, then relaxed)
/// 2. otherwise parse the first balanced `{...}` span the same way
/// 3. otherwise report a [`ParseFailure`]
pub fn parse(raw: &str) -> Result<Value, ParseFailure> {
    let stripped = strip_fences(raw);
    if stripped.is_empty() {
        return Err(ParseFailure::new("empty output"));
    }

    let first_err = match parse_object(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match extract_object_span(raw) {
        Some(span) => parse_object(span).map_err(|e| {
            tracing::debug!("Embedded JSON span did not parse: {}", e);
            ParseFailure::new(e)
        }),
        None => Err(ParseFailure::new(first_err)),
    }
}

fn parse_object(s: &str) -> Result<Value, String> {
    let value = match serde_json::from_str::<Value>(s) {
        Ok(v) => v,
        Err(strict_err) => serde_json::from_str::<Value>(&to_strict_json(s))
            .map_err(|_| strict_err.to_string())?,
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err("top-level value is not an object".to_string())
    }
}

/// Remove a surrounding markdown code fence (with optional language tag)
fn strip_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Find the first balanced JSON object in a string that may contain prose.
/// Braces inside string literals are ignored, using the same delimiters the
/// relaxed rewrite accepts: double, single and typographic double quotes.
fn extract_object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut closing: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if let Some(close) = closing {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == close {
                closing = None;
            }
            continue;
        }
        match c {
            '"' => closing = Some('"'),
            '\'' => closing = Some('\''),
            LEFT_QUOTE | RIGHT_QUOTE => closing = Some(RIGHT_QUOTE),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
