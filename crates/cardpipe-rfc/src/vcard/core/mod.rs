//! vCard core types.
//!
//! - [`VCard`] - one card: a version and its properties in order
//! - [`VCardProperty`] - a property with group, parameters and value
//! - [`VCardParameter`] - a multi-valued property parameter
//! - [`VCardValue`] - the interpreted value
//!
//! Structured values ([`StructuredName`], [`Address`], [`Organization`],
//! [`Gender`]) and partial dates ([`DateAndOrTime`]) keep the component
//! layout of the wire format.

mod datetime;
mod parameter;
mod property;
mod structured;
mod value;
mod vcard;

pub use datetime::{DateAndOrTime, Timestamp, VCardDate, VCardTime, VCardUtcOffset};
pub use parameter::VCardParameter;
pub use property::{VCardProperty, names};
pub use structured::{Address, Gender, Organization, Sex, StructuredName, UnknownSex};
pub use value::VCardValue;
pub use vcard::{VCard, VCardVersion};
