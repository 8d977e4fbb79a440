use super::datetime::{DateAndOrTime, Timestamp, VCardUtcOffset};
use super::structured::{Address, Gender, Organization, StructuredName};

/// A property value, interpreted from the property name and its VALUE or
/// ENCODING parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum VCardValue {
    Text(String),
    /// NICKNAME, CATEGORIES.
    TextList(Vec<String>),
    Uri(String),
    /// Possibly truncated or year-less.
    DateAndOrTime(DateAndOrTime),
    /// REV.
    Timestamp(Timestamp),
    StructuredName(StructuredName),
    Address(Address),
    Organization(Organization),
    Gender(Gender),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    UtcOffset(VCardUtcOffset),
    /// Decoded `ENCODING=b` payload.
    Binary(Vec<u8>),
    /// Left uninterpreted; the wire text is kept as is.
    Unknown(String),
}

macro_rules! value_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[must_use]
        pub fn $name(&self) -> Option<&$ty> {
            match self {
                Self::$variant(inner) => Some(inner),
                _ => None,
            }
        }
    };
}

impl VCardValue {
    value_accessor!(as_structured_name, StructuredName, StructuredName);
    value_accessor!(as_address, Address, Address);
    value_accessor!(as_organization, Organization, Organization);
    value_accessor!(as_date_and_or_time, DateAndOrTime, DateAndOrTime);

    /// Text, or an uninterpreted value read as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text_or_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(s) => Some(s),
            other => other.as_text(),
        }
    }

    /// List items. A single text value is a one-item list.
    #[must_use]
    pub fn as_text_list(&self) -> Vec<&str> {
        match self {
            Self::TextList(items) => items.iter().map(String::as_str).collect(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for VCardValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

value_from! {
    String => Text,
    StructuredName => StructuredName,
    Address => Address,
    Organization => Organization,
    Gender => Gender,
    DateAndOrTime => DateAndOrTime,
    Timestamp => Timestamp,
}

impl From<&str> for VCardValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
