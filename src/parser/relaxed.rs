//! Rewrites the JSON dialect models tend to emit into strict JSON.
//!
//! Accepted deviations: `//` and `/* */` comments, single-quoted strings,
//! trailing commas, typographic double quotes used as delimiters, and raw
//! newlines/tabs inside string literals.

pub(super) const LEFT_QUOTE: char = '\u{201C}';
pub(super) const RIGHT_QUOTE: char = '\u{201D}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Double { smart: bool },
    Single,
}

pub fn to_strict_json(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut state = State::Code;

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    for next in chars.by_ref() {
                        if next == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                    out.push(' ');
                }
                '"' => {
                    out.push('"');
                    state = State::Double { smart: false };
                }
                LEFT_QUOTE | RIGHT_QUOTE => {
                    out.push('"');
                    state = State::Double { smart: true };
                }
                '\'' => {
                    out.push('"');
                    state = State::Single;
                }
                '}' | ']' => {
                    drop_trailing_comma(&mut out);
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::Double { smart } => match c {
                '\\' => {
                    out.push('\\');
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                '"' if !smart => {
                    out.push('"');
                    state = State::Code;
                }
                RIGHT_QUOTE if smart => {
                    out.push('"');
                    state = State::Code;
                }
                '"' => out.push_str("\\\""),
                _ => push_string_char(&mut out, c),
            },
            State::Single => match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push_str("\\\\"),
                },
                '\'' => {
                    out.push('"');
                    state = State::Code;
                }
                '"' => out.push_str("\\\""),
                _ => push_string_char(&mut out, c),
            },
        }
    }

    out
}

fn push_string_char(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => out.push(c),
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}
