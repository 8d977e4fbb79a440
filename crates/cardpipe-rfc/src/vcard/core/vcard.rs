//! vCard container type.

use std::fmt;
use std::str::FromStr;

use super::property::VCardProperty;
use super::structured::{Address, Organization, StructuredName};
use super::value::VCardValue;
use crate::error::RfcError;

/// Properties defined by both RFC 2426 and RFC 6350 (plus RFC 2739 / RFC 4770
/// additions that apply to both).
const COMMON_PROPERTIES: &[&str] = &[
    "SOURCE", "FN", "N", "NICKNAME", "PHOTO", "BDAY", "ADR", "TEL", "EMAIL", "IMPP", "TZ", "GEO",
    "TITLE", "ROLE", "LOGO", "ORG", "CATEGORIES", "NOTE", "PRODID", "REV", "SOUND", "UID", "URL",
    "KEY", "FBURL", "CALADRURI", "CALURI",
];

/// Properties introduced by RFC 6350.
const V4_ONLY_PROPERTIES: &[&str] = &[
    "KIND",
    "XML",
    "ANNIVERSARY",
    "GENDER",
    "LANG",
    "MEMBER",
    "RELATED",
    "CLIENTPIDMAP",
];

/// Properties RFC 6350 dropped from RFC 2426.
const V3_ONLY_PROPERTIES: &[&str] = &[
    "NAME",
    "PROFILE",
    "LABEL",
    "MAILER",
    "AGENT",
    "SORT-STRING",
    "CLASS",
];

/// vCard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VCardVersion {
    /// vCard 3.0 (RFC 2426).
    V3,
    /// vCard 4.0 (RFC 6350).
    #[default]
    V4,
}

impl VCardVersion {
    /// Parses a `VERSION` value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "3.0" => Some(Self::V3),
            "4.0" => Some(Self::V4),
            _ => None,
        }
    }

    /// Returns the version string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "3.0",
            Self::V4 => "4.0",
        }
    }

    /// Returns whether `name` is a property this version defines.
    ///
    /// `X-` extension names are always accepted.
    #[must_use]
    pub fn defines(self, name: &str) -> bool {
        let upper = name.to_ascii_uppercase();
        if upper.starts_with("X-") || COMMON_PROPERTIES.contains(&upper.as_str()) {
            return true;
        }
        match self {
            Self::V3 => V3_ONLY_PROPERTIES.contains(&upper.as_str()),
            Self::V4 => V4_ONLY_PROPERTIES.contains(&upper.as_str()),
        }
    }

    /// Returns whether any supported version defines `name`.
    #[must_use]
    pub fn is_known_property(name: &str) -> bool {
        Self::V3.defines(name) || Self::V4.defines(name)
    }
}

impl FromStr for VCardVersion {
    type Err = RfcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RfcError::UnsupportedVersion(s.to_string()))
    }
}

impl fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete vCard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VCard {
    /// vCard version.
    pub version: VCardVersion,
    /// All properties in order of appearance. `VERSION` is held separately.
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    /// Creates a new, empty vCard 4.0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty vCard with the specified version.
    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Adds a property to the vCard.
    pub fn add_property(&mut self, prop: VCardProperty) {
        self.properties.push(prop);
    }

    /// Removes every property with the given name, returning how many were removed.
    pub fn remove_properties(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties
            .retain(|p| !p.name.eq_ignore_ascii_case(name));
        before - self.properties.len()
    }

    /// Keeps only the properties matching `keep`.
    pub fn retain_properties(&mut self, keep: impl FnMut(&VCardProperty) -> bool) {
        self.properties.retain(keep);
    }

    /// Returns all properties with the given name.
    pub fn properties_named(&self, name: &str) -> impl Iterator<Item = &VCardProperty> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first property with the given name.
    ///
    /// The result borrows only `self`, so `name` may be a temporary.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&VCardProperty> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns whether at least one property with the given name exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Returns the FN (formatted name) value.
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.get_property("FN")?.as_text()
    }

    /// Returns the N (structured name) value.
    #[must_use]
    pub fn name(&self) -> Option<&StructuredName> {
        self.get_property("N")?.value.as_structured_name()
    }

    /// Returns the UID value, whether it was written as text or URI.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match &self.get_property("UID")?.value {
            VCardValue::Text(s) | VCardValue::Uri(s) => Some(s),
            _ => None,
        }
    }

    /// Returns all EMAIL values.
    #[must_use]
    pub fn emails(&self) -> Vec<&str> {
        self.properties_named("EMAIL")
            .filter_map(VCardProperty::as_text)
            .collect()
    }

    /// Returns all ADR values.
    #[must_use]
    pub fn addresses(&self) -> Vec<&Address> {
        self.properties_named("ADR")
            .filter_map(|p| p.value.as_address())
            .collect()
    }

    /// Returns the ORG value.
    #[must_use]
    pub fn organization(&self) -> Option<&Organization> {
        self.get_property("ORG")?.value.as_organization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parse() {
        assert_eq!(VCardVersion::parse("3.0"), Some(VCardVersion::V3));
        assert_eq!(VCardVersion::parse(" 4.0 "), Some(VCardVersion::V4));
        assert_eq!(VCardVersion::parse("2.1"), None);
        assert_eq!(
            "2.1".parse::<VCardVersion>(),
            Err(RfcError::UnsupportedVersion("2.1".to_string()))
        );
    }

    #[test]
    fn version_property_tables() {
        assert!(VCardVersion::V4.defines("kind"));
        assert!(!VCardVersion::V3.defines("KIND"));
        assert!(VCardVersion::V3.defines("CLASS"));
        assert!(!VCardVersion::V4.defines("CLASS"));
        assert!(VCardVersion::V3.defines("X-ANNIVERSARY"));
        assert!(!VCardVersion::is_known_property("FOO"));
    }

    #[test]
    fn remove_properties_is_case_insensitive() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("EMAIL", "a@example.com"));
        card.add_property(VCardProperty::text("FN", "A"));
        card.add_property(VCardProperty::text("EMAIL", "b@example.com"));

        assert_eq!(card.remove_properties("email"), 2);
        assert_eq!(card.properties.len(), 1);
        assert_eq!(card.formatted_name(), Some("A"));
    }

    #[test]
    fn lookups_outlive_a_temporary_name() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("NOTE", "first"));
        card.add_property(VCardProperty::text("NOTE", "second"));

        let found = {
            let name = String::from("note");
            card.get_property(&name)
        };
        assert_eq!(found.and_then(VCardProperty::as_text), Some("first"));

        let notes: Vec<&VCardProperty> = {
            let name = "NOTE".to_string();
            card.properties_named(&name).collect()
        };
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn uid_accepts_uri_values() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::uri("UID", "urn:uuid:1234"));
        assert_eq!(card.uid(), Some("urn:uuid:1234"));
    }
}
