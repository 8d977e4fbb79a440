//! vCard serialization (RFC 6350, RFC 2426).
//!
//! ```rust
//! use cardpipe_rfc::vcard::{SerializeOptions, VCard, VCardProperty, VCardVersion, serialize_with};
//!
//! let mut card = VCard::new();
//! card.add_property(VCardProperty::text("FN", "John Doe"));
//! card.add_property(VCardProperty::text("KIND", "individual"));
//!
//! let options = SerializeOptions::default().with_version(VCardVersion::V3).strict(true);
//! assert!(serialize_with(&[card], &options).is_err());
//! ```
//!
//! Output uses CRLF line endings, folds at 75 octets, escapes text values and
//! caret-encodes parameter values. Properties are written in a canonical
//! order so equal cards serialize to equal bytes.

mod escape;
mod fold;
mod serializer;

pub use escape::{escape_param_value, escape_text};
pub use fold::fold_line;
pub use serializer::{BuildError, SerializeOptions, serialize, serialize_with};
