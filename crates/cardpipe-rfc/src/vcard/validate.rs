//! Version conformance checks for decoded cards.
//!
//! Validation never rejects a card. It reports what a strict consumer of the
//! given version would object to.

use std::collections::HashMap;
use std::fmt;

use super::core::{VCard, VCardProperty, VCardVersion, names};

/// Properties that may appear at most once.
const SINGLE_CARDINALITY: &[&str] = &[
    names::N,
    names::BDAY,
    names::ANNIVERSARY,
    names::GENDER,
    names::REV,
    names::PRODID,
    names::UID,
    names::KIND,
];

/// One conformance problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Offending property name.
    pub property: String,
    pub message: String,
    /// Stable identifier, e.g. `missing-required-property`.
    pub code: &'static str,
}

impl ValidationIssue {
    fn new(property: &str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            property: property.to_string(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.property, self.code, self.message)
    }
}

/// Checks `card` against `version`.
///
/// ## Summary
/// Reports missing required properties (FN, and N in 3.0), repeated
/// single-cardinality properties, properties the version does not define,
/// PREF values outside 1-100 and MEMBER on cards that are not groups.
#[must_use]
#[tracing::instrument(skip(card), fields(properties = card.properties.len()))]
pub fn validate(card: &VCard, version: VCardVersion) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !card.has_property(names::FN) {
        issues.push(ValidationIssue::new(
            names::FN,
            "missing-required-property",
            "FN is required",
        ));
    }
    if version == VCardVersion::V3 && !card.has_property(names::N) {
        issues.push(ValidationIssue::new(
            names::N,
            "missing-required-property",
            "N is required in vCard 3.0",
        ));
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for prop in &card.properties {
        *counts.entry(prop.name.as_str()).or_default() += 1;

        if !version.defines(&prop.name) {
            issues.push(ValidationIssue::new(
                &prop.name,
                "undefined-in-version",
                format!("{} is not defined in vCard {version}", prop.name),
            ));
        }

        if let Some(pref) = prop.get_param_value("PREF")
            && !pref.parse::<u8>().is_ok_and(|p| (1..=100).contains(&p))
        {
            issues.push(ValidationIssue::new(
                &prop.name,
                "pref-out-of-range",
                format!("PREF must be an integer from 1 to 100, got '{pref}'"),
            ));
        }
    }

    for name in SINGLE_CARDINALITY {
        if let Some(&count) = counts.get(name)
            && count > 1
        {
            issues.push(ValidationIssue::new(
                name,
                "cardinality",
                format!("{name} may appear at most once, found {count}"),
            ));
        }
    }

    let is_group = card
        .get_property(names::KIND)
        .and_then(VCardProperty::as_text)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("group"));
    if version == VCardVersion::V4 && card.has_property(names::MEMBER) && !is_group {
        issues.push(ValidationIssue::new(
            names::MEMBER,
            "member-without-group",
            "MEMBER requires KIND:group",
        ));
    }

    if !issues.is_empty() {
        tracing::debug!(count = issues.len(), "Validation issues found");
    }

    issues
}
