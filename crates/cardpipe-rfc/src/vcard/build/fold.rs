//! Content line folding.

/// Maximum physical line length in octets, excluding CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line so no physical line exceeds 75 octets.
///
/// Continuation lines start with a single space, which counts toward their
/// length. Breaks never split a UTF-8 sequence.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / MAX_LINE_OCTETS + 1));
    let mut width = 0;

    for c in line.chars() {
        if width + c.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += c.len_utf8();
    }

    out
}
