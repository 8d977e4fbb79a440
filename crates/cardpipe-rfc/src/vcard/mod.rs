//! vCard implementation (RFC 6350, RFC 2426).
//!
//! ## Decoding
//!
//! ```rust
//! use cardpipe_rfc::vcard::{DecodeOptions, decode};
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:4.0\r\n\
//! FN:John Doe\r\n\
//! EMAIL:john@example.com\r\n\
//! END:VCARD\r\n";
//!
//! let decoded = decode(input, &DecodeOptions::default());
//! assert!(decoded.warnings.is_empty());
//! assert_eq!(decoded.cards[0].formatted_name(), Some("John Doe"));
//! ```
//!
//! ## Serializing
//!
//! ```rust
//! use cardpipe_rfc::vcard::{VCard, VCardProperty, serialize};
//!
//! let mut card = VCard::new();
//! card.add_property(VCardProperty::text("FN", "Jane Doe"));
//!
//! let output = serialize(&[card]);
//! assert!(output.contains("FN:Jane Doe"));
//! ```
//!
//! ## Submodules
//!
//! - [`core`] - Core types (`VCard`, `VCardProperty`, `VCardValue`, etc.)
//! - [`parse`] - Fail-fast and lenient decoding
//! - [`build`] - Serialization
//! - [`validate`] - Version conformance checks

pub mod build;
pub mod core;
pub mod parse;
pub mod validate;

#[cfg(test)]
mod tests;

pub use build::{BuildError, SerializeOptions, serialize, serialize_with};
pub use core::{
    Address, DateAndOrTime, Gender, Organization, Sex, StructuredName, VCard, VCardParameter,
    VCardProperty, VCardValue, VCardVersion,
};
pub use parse::{DecodeOptions, Decoded, ParseError, ParseResult, ParseWarning, decode, parse};
pub use validate::{ValidationIssue, validate};
