//! Line unfolding and content line tokenizing (RFC 6350 §3.2-3.3).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::vcard::core::VCardParameter;

/// Unfolds a vCard document into logical lines.
///
/// A line break followed by a single space or tab is a continuation; the break
/// and that one whitespace character are removed. Bare LF is accepted as a line
/// break. Blank logical lines are dropped.
#[must_use]
pub fn unfold(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if matches!(chars.peek(), Some(' ' | '\t')) {
                    chars.next();
                } else if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// A tokenized content line before value interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name, uppercase.
    pub name: String,
    pub params: Vec<VCardParameter>,
    /// Raw value text after the first unquoted colon.
    pub value: String,
}

/// Tokenizes `[group.]name[;param]*:value`.
///
/// Parameters without `=` (vCard 2.1/3.0 bare types such as `TEL;HOME:`) are
/// read as `TYPE` values.
///
/// ## Errors
/// Returns an error if the colon separator is missing or the name is invalid.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon = find_unquoted(line, ':').ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MalformedLine,
            line_num,
            "missing ':' between name and value",
        )
    })?;

    let head = &line[..colon];
    let value = &line[colon + 1..];

    let mut segments = split_unquoted(head, ';').into_iter();
    let qualified = segments.next().unwrap_or_default();

    let (group, name) = match qualified.split_once('.') {
        Some((group, name)) if is_token(group) => (Some(group.to_string()), name),
        _ => (None, qualified),
    };

    if !is_token(name) {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("invalid property name: '{name}'"),
        ));
    }

    let params = segments
        .filter(|segment| !segment.is_empty())
        .map(parse_parameter)
        .collect();

    Ok(ContentLine {
        group,
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn parse_parameter(segment: &str) -> VCardParameter {
    let Some((name, raw_values)) = segment.split_once('=') else {
        return VCardParameter::type_value(segment);
    };

    let values = split_unquoted(raw_values, ',')
        .into_iter()
        .map(|v| decode_caret(v.trim_matches('"')))
        .collect();

    VCardParameter::multi(name.trim(), values)
}

/// Decodes RFC 6868 caret escapes (`^n`, `^'`, `^^`).
fn decode_caret(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n' | 'N') => {
                chars.next();
                out.push('\n');
            }
            Some('\'') => {
                chars.next();
                out.push('"');
            }
            Some('^') => {
                chars.next();
                out.push('^');
            }
            _ => out.push('^'),
        }
    }

    out
}

/// Finds the first `needle` outside double quotes.
fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    s.char_indices().find_map(|(i, c)| {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        (c == needle && !in_quotes).then_some(i)
    })
}

/// Splits on `separator` outside double quotes.
fn split_unquoted(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(pos) = find_unquoted(rest, separator) {
        parts.push(&rest[..pos]);
        rest = &rest[pos + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}
