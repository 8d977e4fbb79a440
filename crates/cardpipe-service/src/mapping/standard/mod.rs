//! Built-in mappings, registered in the order they apply.

mod dates;
mod identity;
mod media;
mod organization;
mod reachability;
mod text;

use cardpipe_rfc::vcard::{VCardParameter, VCardProperty, VCardValue, VCardVersion};

use super::registry::MappingRegistryBuilder;
use crate::contact::ContactField;
use crate::error::MappingError;

pub(super) fn register_all(builder: MappingRegistryBuilder) -> MappingRegistryBuilder {
    builder
        .register(identity::UidMapping)
        .register(identity::KindMapping)
        .register(identity::FormattedNameMapping)
        .register(identity::NameMapping)
        .register(text::TextListMapping::NICKNAME)
        .register(dates::DateMapping::BIRTHDAY)
        .register(dates::DateMapping::ANNIVERSARY)
        .register(identity::GenderMapping)
        .register(reachability::AddressMapping)
        .register(reachability::ContactPointMapping::PHONE)
        .register(reachability::ContactPointMapping::EMAIL)
        .register(reachability::ContactPointMapping::IMPP)
        .register(organization::OrganizationMapping)
        .register(text::TextMapping::TITLE)
        .register(text::TextMapping::ROLE)
        .register(text::TextListMapping::CATEGORIES)
        .register(text::TextMapping::NOTE)
        .register(reachability::ContactPointMapping::URL)
        .register(media::PhotoMapping)
        .register(media::ClassMapping)
        .register(dates::RevisionMapping)
}

fn value_kind(value: &VCardValue) -> &'static str {
    match value {
        VCardValue::Text(_) => "text",
        VCardValue::TextList(_) => "a text list",
        VCardValue::Uri(_) => "a URI",
        VCardValue::DateAndOrTime(_) => "a date",
        VCardValue::Timestamp(_) => "a timestamp",
        VCardValue::StructuredName(_) => "a structured name",
        VCardValue::Address(_) => "an address",
        VCardValue::Organization(_) => "an organization",
        VCardValue::Gender(_) => "a gender",
        VCardValue::Boolean(_) => "a boolean",
        VCardValue::Integer(_) => "an integer",
        VCardValue::Float(_) => "a float",
        VCardValue::UtcOffset(_) => "a UTC offset",
        VCardValue::Binary(_) => "binary data",
        VCardValue::Unknown(_) => "an uninterpretable value",
    }
}

fn unexpected(prop: &VCardProperty) -> MappingError {
    MappingError::UnexpectedValue {
        property: prop.name.clone(),
        found: value_kind(&prop.value),
    }
}

/// Text, URI or undecoded value of `prop`.
fn text_value(prop: &VCardProperty) -> Result<&str, MappingError> {
    prop.value.as_text_or_uri().ok_or_else(|| unexpected(prop))
}

/// TYPE values other than `pref`, and the preference.
fn point_attributes(prop: &VCardProperty) -> (Vec<String>, Option<u8>) {
    let types = prop.types().into_iter().filter(|t| t != "pref").collect();
    (types, prop.pref())
}

/// Writes TYPE values and preference. vCard 3.0 has no PREF parameter, so any
/// preference becomes `TYPE=pref`.
fn apply_point_attributes(
    prop: &mut VCardProperty,
    types: &[String],
    pref: Option<u8>,
    version: VCardVersion,
) {
    for type_value in types {
        prop.add_type(type_value.clone());
    }
    match (pref, version) {
        (Some(pref), VCardVersion::V4) => prop.add_param(VCardParameter::pref(pref)),
        (Some(_), VCardVersion::V3) => prop.add_type("pref"),
        (None, _) => {}
    }
}

/// Joins a multi-valued component into one domain string.
fn join_component(values: &[String], separator: &str) -> String {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Single-valued wire component, empty when the domain string is.
fn split_component(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn invalid(field: ContactField, message: impl Into<String>) -> MappingError {
    MappingError::Invalid {
        field,
        message: message.into(),
    }
}

const X_GENDER: &str = "X-GENDER";
const X_CLASS: &str = "X-CLASS";
const X_APPLE_OMIT_YEAR: &str = "X-APPLE-OMIT-YEAR";

