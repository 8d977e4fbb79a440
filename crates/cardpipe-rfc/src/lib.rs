//! vCard grammar support for cardpipe.
//!
//! Turns one well-formed vCard byte range into a property tree and back, and
//! validates a tree against a vCard version. Framing of multi-record streams
//! lives in `cardpipe-io`.

pub mod error;
pub mod vcard;
