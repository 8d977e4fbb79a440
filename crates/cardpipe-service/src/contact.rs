//! Domain contact model.
//!
//! A [`Contact`] is what the mapping registry reads from and writes to. It is
//! independent of the vCard wire model: multi-valued name and address
//! components are flattened to strings, and dates keep only their calendar
//! parts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    /// Local identity. Never written to a card unless a UID is generated from it.
    pub id: Uuid,
    pub uid: Option<String>,
    pub kind: ContactKind,
    /// Member references of a group contact.
    pub members: Vec<String>,
    pub display_name: Option<String>,
    pub name: Option<PersonName>,
    pub nicknames: Vec<String>,
    pub birthday: Option<PartialDate>,
    pub anniversary: Option<PartialDate>,
    pub gender: Option<ContactGender>,
    pub addresses: Vec<PostalAddress>,
    pub phones: Vec<ContactPoint>,
    pub emails: Vec<ContactPoint>,
    pub instant_messaging: Vec<ContactPoint>,
    pub urls: Vec<ContactPoint>,
    pub organization: Option<String>,
    pub departments: Vec<String>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub categories: Vec<String>,
    pub note: Option<String>,
    pub photo: Option<Photo>,
    /// Marked private or confidential.
    pub private: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for Contact {
    fn default() -> Self {
        Self::new()
    }
}

impl Contact {
    /// Creates an empty contact with a fresh time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            uid: None,
            kind: ContactKind::Individual,
            members: Vec::new(),
            display_name: None,
            name: None,
            nicknames: Vec::new(),
            birthday: None,
            anniversary: None,
            gender: None,
            addresses: Vec::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            instant_messaging: Vec::new(),
            urls: Vec::new(),
            organization: None,
            departments: Vec::new(),
            title: None,
            role: None,
            categories: Vec::new(),
            note: None,
            photo: None,
            private: false,
            last_modified: None,
        }
    }

    /// `urn:uuid:` form of the local id, used when a UID has to be generated.
    #[must_use]
    pub fn generated_uid(&self) -> String {
        self.id.urn().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    #[default]
    Individual,
    Group,
    Org,
    Location,
}

impl ContactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
            Self::Org => "org",
            Self::Location => "location",
        }
    }

    /// Parses a KIND value, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(Self::Individual),
            "group" => Some(Self::Group),
            "org" | "organization" => Some(Self::Org),
            "location" => Some(Self::Location),
            _ => None,
        }
    }
}

/// Name components. Multi-valued wire components are joined with commas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonName {
    pub family: String,
    pub given: String,
    pub additional: String,
    pub prefixes: String,
    pub suffixes: String,
}

impl PersonName {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.family,
            &self.given,
            &self.additional,
            &self.prefixes,
            &self.suffixes,
        ]
        .iter()
        .all(|part| part.is_empty())
    }
}

/// Calendar date with any of its parts missing, e.g. a birthday without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialDate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl PartialDate {
    #[must_use]
    pub const fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    #[must_use]
    pub const fn month_day(month: u32, day: u32) -> Self {
        Self {
            year: None,
            month: Some(month),
            day: Some(day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderSex {
    Male,
    Female,
    Other,
    None,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactGender {
    pub sex: Option<GenderSex>,
    pub identity: Option<String>,
}

/// A postal address. Multi-valued wire components are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    pub types: Vec<String>,
    pub pref: Option<u8>,
    pub po_box: String,
    pub extended: String,
    pub street: String,
    pub locality: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    /// Formatted delivery label.
    pub label: Option<String>,
}

/// A typed, optionally preferred value: phone number, email, messenger handle
/// or URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPoint {
    pub value: String,
    /// Lowercase TYPE values.
    pub types: Vec<String>,
    /// 1-100, lower is preferred.
    pub pref: Option<u8>,
}

impl ContactPoint {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_value: impl Into<String>) -> Self {
        self.types.push(type_value.into());
        self
    }

    #[must_use]
    pub fn with_pref(mut self, pref: u8) -> Self {
        self.pref = Some(pref);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Photo {
    Uri(String),
    Inline {
        media_type: Option<String>,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// Addressable fields of a [`Contact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Uid,
    Kind,
    Members,
    DisplayName,
    Name,
    Nicknames,
    Birthday,
    Anniversary,
    Gender,
    Addresses,
    Phones,
    Emails,
    InstantMessaging,
    Urls,
    Organization,
    Departments,
    Title,
    Role,
    Categories,
    Note,
    Photo,
    Private,
    LastModified,
}

impl ContactField {
    pub const ALL: &'static [Self] = &[
        Self::Uid,
        Self::Kind,
        Self::Members,
        Self::DisplayName,
        Self::Name,
        Self::Nicknames,
        Self::Birthday,
        Self::Anniversary,
        Self::Gender,
        Self::Addresses,
        Self::Phones,
        Self::Emails,
        Self::InstantMessaging,
        Self::Urls,
        Self::Organization,
        Self::Departments,
        Self::Title,
        Self::Role,
        Self::Categories,
        Self::Note,
        Self::Photo,
        Self::Private,
        Self::LastModified,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Kind => "kind",
            Self::Members => "members",
            Self::DisplayName => "display_name",
            Self::Name => "name",
            Self::Nicknames => "nicknames",
            Self::Birthday => "birthday",
            Self::Anniversary => "anniversary",
            Self::Gender => "gender",
            Self::Addresses => "addresses",
            Self::Phones => "phones",
            Self::Emails => "emails",
            Self::InstantMessaging => "instant_messaging",
            Self::Urls => "urls",
            Self::Organization => "organization",
            Self::Departments => "departments",
            Self::Title => "title",
            Self::Role => "role",
            Self::Categories => "categories",
            Self::Note => "note",
            Self::Photo => "photo",
            Self::Private => "private",
            Self::LastModified => "last_modified",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown contact field '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_ids_are_time_ordered() {
        let first = Contact::new();
        let second = Contact::new();
        assert_eq!(first.id.get_version_num(), 7);
        assert!(first.id <= second.id);
        assert!(first.generated_uid().starts_with("urn:uuid:"));
    }

    #[test]
    fn inline_photo_serializes_as_base64() {
        let mut contact = Contact::with_id(Uuid::nil());
        contact.photo = Some(Photo::Inline {
            media_type: Some("image/png".to_string()),
            data: b"png".to_vec(),
        });

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["photo"]["inline"]["data"], "cG5n");

        let back: Contact = serde_json::from_value(json).unwrap();
        assert_eq!(back, contact);
    }

    #[test]
    fn missing_json_fields_take_defaults() {
        let contact: Contact =
            serde_json::from_str(r#"{"id":"00000000-0000-0000-0000-000000000000","display_name":"Ada"}"#)
                .unwrap();
        assert_eq!(contact.display_name.as_deref(), Some("Ada"));
        assert_eq!(contact.kind, ContactKind::Individual);
        assert!(contact.emails.is_empty());
    }

    #[test]
    fn field_names_parse_back() {
        for field in ContactField::ALL {
            assert_eq!(field.as_str().parse::<ContactField>(), Ok(*field));
        }
        assert!("shoe_size".parse::<ContactField>().is_err());
    }
}
