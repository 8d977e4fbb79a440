//! vCard serialization.

use std::fmt::Write as _;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::escape::{escape_param_value, escape_text};
use super::fold::fold_line;
use crate::vcard::core::{
    DateAndOrTime, VCard, VCardDate, VCardProperty, VCardTime, VCardUtcOffset, VCardValue,
    VCardVersion,
};

/// A card that cannot be written under strict serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("invalid property name '{name}'")]
    InvalidPropertyName { name: String },

    #[error("property '{name}' is not defined in vCard {version}")]
    UnsupportedInVersion {
        name: String,
        version: VCardVersion,
    },
}

/// Options for [`serialize_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Overrides each card's own version when set.
    pub version: Option<VCardVersion>,
    /// Reject invalid names and properties the target version does not define.
    pub strict: bool,
}

impl SerializeOptions {
    #[must_use]
    pub fn with_version(mut self, version: VCardVersion) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Serializes cards leniently, each under its own version.
#[must_use]
pub fn serialize(cards: &[VCard]) -> String {
    let mut output = String::new();
    for card in cards {
        write_card(card, card.version, &mut output);
    }
    output
}

/// Serializes cards with explicit options.
///
/// ## Summary
/// All cards are checked before any output is produced, so a failure never
/// leaves partial text behind.
///
/// ## Errors
/// In strict mode, returns the first invalid property name or property the
/// target version does not define.
#[tracing::instrument(skip(cards), fields(count = cards.len()))]
pub fn serialize_with(cards: &[VCard], options: &SerializeOptions) -> Result<String, BuildError> {
    if options.strict {
        for card in cards {
            check_strict(card, options.version.unwrap_or(card.version))?;
        }
    }

    let mut output = String::new();
    for card in cards {
        write_card(card, options.version.unwrap_or(card.version), &mut output);
    }

    tracing::trace!(bytes = output.len(), "Serialized vCards");
    Ok(output)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn check_strict(card: &VCard, version: VCardVersion) -> Result<(), BuildError> {
    for prop in &card.properties {
        if !is_token(&prop.name) || prop.group.as_deref().is_some_and(|g| !is_token(g)) {
            return Err(BuildError::InvalidPropertyName {
                name: prop.name.clone(),
            });
        }
        if !version.defines(&prop.name) {
            return Err(BuildError::UnsupportedInVersion {
                name: prop.name.clone(),
                version,
            });
        }
    }
    Ok(())
}

fn write_card(card: &VCard, version: VCardVersion, output: &mut String) {
    output.push_str("BEGIN:VCARD\r\n");
    output.push_str("VERSION:");
    output.push_str(version.as_str());
    output.push_str("\r\n");

    let mut ordered: Vec<&VCardProperty> = card
        .properties
        .iter()
        .filter(|p| p.name != "VERSION")
        .collect();
    // Stable: equal keys keep their insertion order.
    ordered.sort_by_key(|p| (rank(&p.name), p.group.is_some()));

    for prop in ordered {
        output.push_str(&fold_line(&content_line(prop, version)));
        output.push_str("\r\n");
    }

    output.push_str("END:VCARD\r\n");
}

/// Canonical position of a property; extensions go last.
fn rank(name: &str) -> u8 {
    const ORDER: &[&str] = &[
        "KIND", "SOURCE", "FN", "N", "NICKNAME", "PHOTO", "BDAY", "ANNIVERSARY", "GENDER", "ADR",
        "LABEL", "TEL", "EMAIL", "IMPP", "LANG", "TZ", "GEO", "TITLE", "ROLE", "LOGO", "ORG",
        "MEMBER", "RELATED", "CATEGORIES", "NOTE", "SOUND", "UID", "URL", "KEY", "CLASS",
        "FBURL", "CALADRURI", "CALURI", "PRODID", "REV",
    ];
    ORDER
        .iter()
        .position(|known| *known == name)
        .and_then(|pos| u8::try_from(pos).ok())
        .unwrap_or(u8::MAX)
}

fn content_line(prop: &VCardProperty, version: VCardVersion) -> String {
    let mut line = String::new();

    if let Some(group) = &prop.group {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(&prop.name);

    for param in &prop.params {
        line.push(';');
        line.push_str(&param.name);
        if !param.values.is_empty() {
            line.push('=');
            let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
            line.push_str(&values.join(","));
        }
    }

    if matches!(prop.value, VCardValue::Binary(_))
        && version == VCardVersion::V3
        && prop.get_param("ENCODING").is_none()
    {
        line.push_str(";ENCODING=b");
    }

    line.push(':');
    write_value(&prop.value, &mut line);
    line
}

fn join_escaped(items: &[String], separator: char) -> String {
    let escaped: Vec<String> = items.iter().map(|s| escape_text(s)).collect();
    escaped.join(&separator.to_string())
}

fn write_components<const N: usize>(components: [&Vec<String>; N], out: &mut String) {
    let parts = components.map(|values| join_escaped(values, ','));
    out.push_str(&parts.join(";"));
}

fn write_value(value: &VCardValue, out: &mut String) {
    match value {
        VCardValue::Text(s) => out.push_str(&escape_text(s)),
        VCardValue::TextList(items) => out.push_str(&join_escaped(items, ',')),
        VCardValue::Uri(s) | VCardValue::Unknown(s) => out.push_str(s),
        VCardValue::StructuredName(n) => write_components(n.components(), out),
        VCardValue::Address(a) => write_components(a.components(), out),
        VCardValue::Organization(org) => {
            let parts: Vec<String> = org.components().map(escape_text).collect();
            out.push_str(&parts.join(";"));
        }
        VCardValue::Gender(g) => {
            if let Some(sex) = g.sex {
                out.push_str(sex.as_str());
            }
            if let Some(identity) = &g.identity {
                out.push(';');
                out.push_str(&escape_text(identity));
            }
        }
        VCardValue::DateAndOrTime(d) => write_date_and_or_time(d, out),
        VCardValue::Timestamp(ts) => {
            write!(out, "{}", ts.datetime.format("%Y%m%dT%H%M%SZ")).ok();
        }
        VCardValue::Boolean(b) => out.push_str(if *b { "TRUE" } else { "FALSE" }),
        VCardValue::Integer(i) => {
            write!(out, "{i}").ok();
        }
        VCardValue::Float(f) => {
            write!(out, "{f}").ok();
        }
        VCardValue::UtcOffset(offset) => write_offset(*offset, out),
        VCardValue::Binary(bytes) => out.push_str(&BASE64.encode(bytes)),
    }
}

fn write_date_and_or_time(value: &DateAndOrTime, out: &mut String) {
    match value {
        DateAndOrTime::Date(date) => write_date(date, out),
        DateAndOrTime::DateTime { date, time, offset } => {
            write_date(date, out);
            out.push('T');
            write_time(time, *offset, out);
        }
        DateAndOrTime::Time { time, offset } => {
            out.push('T');
            write_time(time, *offset, out);
        }
        DateAndOrTime::Text(text) => out.push_str(&escape_text(text)),
    }
}

fn write_date(date: &VCardDate, out: &mut String) {
    match date {
        VCardDate::Full(d) => write!(out, "{}", d.format("%Y%m%d")),
        VCardDate::YearMonth { year, month } => write!(out, "{year:04}-{month:02}"),
        VCardDate::Year(year) => write!(out, "{year:04}"),
        VCardDate::MonthDay { month, day } => write!(out, "--{month:02}{day:02}"),
        VCardDate::Day(day) => write!(out, "---{day:02}"),
    }
    .ok();
}

fn write_time(time: &VCardTime, offset: Option<VCardUtcOffset>, out: &mut String) {
    match time {
        VCardTime::Full(t) => write!(out, "{}", t.format("%H%M%S")),
        VCardTime::HourMinute { hour, minute } => write!(out, "{hour:02}{minute:02}"),
        VCardTime::Hour(hour) => write!(out, "{hour:02}"),
    }
    .ok();
    if let Some(offset) = offset {
        write_offset(offset, out);
    }
}

fn write_offset(offset: VCardUtcOffset, out: &mut String) {
    if offset == VCardUtcOffset::UTC {
        out.push('Z');
        return;
    }
    let sign = if offset.hours < 0 { '-' } else { '+' };
    write!(
        out,
        "{sign}{:02}{:02}",
        offset.hours.unsigned_abs(),
        offset.minutes
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::vcard::core::{Address, Organization, StructuredName, VCardParameter};

    fn card_with(props: Vec<VCardProperty>) -> VCard {
        let mut card = VCard::new();
        for prop in props {
            card.add_property(prop);
        }
        card
    }

    #[test]
    fn version_first_and_crlf() {
        let output = serialize(&[card_with(vec![VCardProperty::text("FN", "Jane")])]);
        assert_eq!(output, "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Jane\r\nEND:VCARD\r\n");
    }

    #[test]
    fn canonical_order_is_stable() {
        let card = card_with(vec![
            VCardProperty::text("X-CUSTOM", "x"),
            VCardProperty::text("EMAIL", "b@example.com"),
            VCardProperty::text("FN", "Jane"),
            VCardProperty::text("EMAIL", "a@example.com"),
        ]);
        let output = serialize(&[card]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[2..6],
            [
                "FN:Jane",
                "EMAIL:b@example.com",
                "EMAIL:a@example.com",
                "X-CUSTOM:x"
            ]
        );
    }

    #[test]
    fn structured_values() {
        let card = card_with(vec![
            VCardProperty::new("N", StructuredName::simple("Doe", "John")),
            VCardProperty::new(
                "ADR",
                Address {
                    street: vec!["1 Main St; Apt 2".to_string()],
                    ..Address::default()
                },
            ),
            VCardProperty::new(
                "ORG",
                Organization::with_units("Acme, Inc.", vec!["R&D".to_string()]),
            ),
        ]);
        let output = serialize(&[card]);
        assert!(output.contains("N:Doe;John;;;\r\n"));
        assert!(output.contains("ADR:;;1 Main St\\; Apt 2;;;;\r\n"));
        assert!(output.contains("ORG:Acme\\, Inc.;R&D\r\n"));
    }

    #[test]
    fn dates_and_binary() {
        let bday = DateAndOrTime::Date(VCardDate::MonthDay { month: 4, day: 15 });
        let anniversary =
            DateAndOrTime::Date(VCardDate::Full(NaiveDate::from_ymd_opt(2010, 6, 1).unwrap()));
        let mut card = card_with(vec![
            VCardProperty::new("BDAY", bday),
            VCardProperty::new("X-ANNIVERSARY", anniversary),
            VCardProperty::new("PHOTO", VCardValue::Binary(b"hello".to_vec()))
                .with_param(VCardParameter::type_value("JPEG")),
        ]);
        card.version = VCardVersion::V3;

        let output = serialize(&[card]);
        assert!(output.contains("BDAY:--0415\r\n"));
        assert!(output.contains("X-ANNIVERSARY:20100601\r\n"));
        assert!(output.contains("PHOTO;TYPE=JPEG;ENCODING=b:aGVsbG8=\r\n"));
    }

    #[test]
    fn strict_rejects_property_outside_version() {
        let card = card_with(vec![
            VCardProperty::text("FN", "Jane"),
            VCardProperty::text("CLASS", "PRIVATE"),
        ]);

        assert!(serialize_with(std::slice::from_ref(&card), &SerializeOptions::default()).is_ok());

        let err = serialize_with(&[card], &SerializeOptions::default().strict(true)).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedInVersion {
                name: "CLASS".to_string(),
                version: VCardVersion::V4
            }
        );
    }

    #[test]
    fn strict_rejects_invalid_name() {
        let mut prop = VCardProperty::text("FN", "Jane");
        prop.name = "BAD NAME".to_string();
        let err = serialize_with(&[card_with(vec![prop])], &SerializeOptions::default().strict(true))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidPropertyName { .. }));
    }

    #[test]
    fn version_override() {
        let output = serialize_with(
            &[card_with(vec![VCardProperty::text("FN", "Jane")])],
            &SerializeOptions::default().with_version(VCardVersion::V3),
        )
        .unwrap();
        assert!(output.contains("VERSION:3.0\r\n"));
    }
}
