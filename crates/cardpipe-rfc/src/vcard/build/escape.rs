//! Value and parameter escaping.

/// Escapes a text value or a structured-value component.
///
/// Backslash, comma, semicolon and newline are escaped; CR is dropped.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            ',' => out.push_str(r"\,"),
            ';' => out.push_str(r"\;"),
            '\n' => out.push_str(r"\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }

    out
}

/// Encodes a parameter value (RFC 6868), quoting it when it holds `:`, `;`
/// or `,`.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    let mut quote = false;

    for c in s.chars() {
        match c {
            '^' => encoded.push_str("^^"),
            '\n' => encoded.push_str("^n"),
            '"' => encoded.push_str("^'"),
            ':' | ';' | ',' => {
                quote = true;
                encoded.push(c);
            }
            c if c.is_control() => {}
            _ => encoded.push(c),
        }
    }

    if quote {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escapes() {
        assert_eq!(escape_text("a,b;c\\d\r\ne"), r"a\,b\;c\\d\ne");
    }

    #[test]
    fn param_caret_encoding() {
        assert_eq!(escape_param_value("plain"), "plain");
        assert_eq!(escape_param_value("a\"b^c\nd"), "a^'b^^c^nd");
        assert_eq!(escape_param_value("1 Main St; Suite 2"), "\"1 Main St; Suite 2\"");
    }
}
