//! Compound values whose wire form is a `;`-separated component list.
//!
//! N and ADR components may each hold several `,`-separated values; ORG
//! components are single-valued. Missing trailing components read as empty.

use std::fmt;
use std::str::FromStr;

/// Takes up to `N` components, padding the rest with empty lists.
fn fixed<const N: usize>(components: impl IntoIterator<Item = Vec<String>>) -> [Vec<String>; N] {
    let mut components = components.into_iter();
    std::array::from_fn(|_| components.next().unwrap_or_default())
}

fn all_blank<'a>(components: impl IntoIterator<Item = &'a Vec<String>>) -> bool {
    components
        .into_iter()
        .flatten()
        .all(String::is_empty)
}

/// N: family; given; additional; honorific prefixes; honorific suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredName {
    pub family: Vec<String>,
    pub given: Vec<String>,
    pub additional: Vec<String>,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl StructuredName {
    pub const COMPONENTS: usize = 5;

    /// A name with one family and one given value.
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self::from_components([vec![family.into()], vec![given.into()]])
    }

    /// Builds from wire-order components. Extra components are ignored.
    #[must_use]
    pub fn from_components(components: impl IntoIterator<Item = Vec<String>>) -> Self {
        let [family, given, additional, prefixes, suffixes] =
            fixed::<{ Self::COMPONENTS }>(components);
        Self {
            family,
            given,
            additional,
            prefixes,
            suffixes,
        }
    }

    #[must_use]
    pub fn components(&self) -> [&Vec<String>; Self::COMPONENTS] {
        [
            &self.family,
            &self.given,
            &self.additional,
            &self.prefixes,
            &self.suffixes,
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        all_blank(self.components())
    }
}

/// ADR: PO box; extended; street; locality; region; postal code; country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub po_box: Vec<String>,
    pub extended: Vec<String>,
    pub street: Vec<String>,
    pub locality: Vec<String>,
    pub region: Vec<String>,
    pub postal_code: Vec<String>,
    pub country: Vec<String>,
}

impl Address {
    pub const COMPONENTS: usize = 7;

    /// Builds from wire-order components. Extra components are ignored.
    #[must_use]
    pub fn from_components(components: impl IntoIterator<Item = Vec<String>>) -> Self {
        let [po_box, extended, street, locality, region, postal_code, country] =
            fixed::<{ Self::COMPONENTS }>(components);
        Self {
            po_box,
            extended,
            street,
            locality,
            region,
            postal_code,
            country,
        }
    }

    #[must_use]
    pub fn components(&self) -> [&Vec<String>; Self::COMPONENTS] {
        [
            &self.po_box,
            &self.extended,
            &self.street,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        all_blank(self.components())
    }
}

/// ORG: the organization name, then units from broadest to narrowest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn with_units(name: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// The first component is the name; an empty list gives an empty name.
    #[must_use]
    pub fn from_components(components: impl IntoIterator<Item = String>) -> Self {
        let mut components = components.into_iter();
        Self {
            name: components.next().unwrap_or_default(),
            units: components.collect(),
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.units.iter().map(String::as_str))
    }
}

/// GENDER: an optional sex letter and an optional free-text identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gender {
    pub sex: Option<Sex>,
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Other,
    None,
    Unknown,
}

impl Sex {
    pub const ALL: [Self; 5] = [Self::Male, Self::Female, Self::Other, Self::None, Self::Unknown];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
            Self::None => "N",
            Self::Unknown => "U",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The component is not one of M, F, O, N, U.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sex component '{0}'")]
pub struct UnknownSex(pub String);

impl FromStr for Sex {
    type Err = UnknownSex;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sex| sex.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSex(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn short_component_lists_are_padded() {
        let name = StructuredName::from_components([strings(&["Doe"]), strings(&["John", "J"])]);
        assert_eq!(name.given, strings(&["John", "J"]));
        assert!(name.suffixes.is_empty());

        let addr = Address::from_components(vec![Vec::new(); 9]);
        assert!(addr.is_empty());
    }

    #[test]
    fn blank_values_count_as_empty() {
        let name = StructuredName::from_components([vec![String::new()]]);
        assert!(name.is_empty());
        assert!(!StructuredName::simple("Doe", "John").is_empty());
    }

    #[test]
    fn address_components_follow_wire_order() {
        let addr = Address {
            street: strings(&["123 Main St"]),
            country: strings(&["USA"]),
            ..Address::default()
        };
        let components = addr.components();
        assert_eq!(components[2], &strings(&["123 Main St"]));
        assert_eq!(components[6], &strings(&["USA"]));
        assert_eq!(Address::from_components(components.map(Clone::clone)), addr);
    }

    #[test]
    fn organization_components_start_with_name() {
        let org = Organization::from_components(strings(&["Acme", "R&D", "Tools"]));
        assert_eq!(org.components().collect::<Vec<_>>(), ["Acme", "R&D", "Tools"]);
        assert_eq!(Organization::from_components(Vec::new()).name, "");
    }

    #[test]
    fn sex_letters() {
        assert_eq!("m".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!(Sex::Unknown.to_string(), "U");
        assert!("X".parse::<Sex>().is_err());
        assert!("MF".parse::<Sex>().is_err());
    }
}
