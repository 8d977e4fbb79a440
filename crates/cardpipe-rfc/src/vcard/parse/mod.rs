//! vCard parsing (RFC 6350, RFC 2426).
//!
//! Two entry points share one parser:
//!
//! - [`parse`] stops at the first problem.
//! - [`decode`] recovers from bad lines and values and reports them as
//!   [`ParseWarning`]s.
//!
//! ```rust
//! use cardpipe_rfc::vcard::parse::{DecodeOptions, decode};
//!
//! let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Jo\r\nBDAY:soon\r\nEND:VCARD\r\n";
//! let decoded = decode(input, &DecodeOptions::default());
//!
//! assert_eq!(decoded.cards.len(), 1);
//! assert_eq!(decoded.warnings.len(), 1);
//! ```

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult, ParseWarning};
pub use lexer::{ContentLine, parse_content_line, unfold};
pub use parser::{DecodeOptions, Decoded, decode, parse};
pub use values::{
    parse_address, parse_date, parse_date_and_or_time, parse_gender, parse_organization,
    parse_structured_name, parse_time, parse_timestamp, parse_utc_offset, split_list,
    split_unescaped, unescape_text,
};
