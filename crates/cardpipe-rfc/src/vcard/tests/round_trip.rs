//! Decode, serialize and decode again.

use super::fixtures::{VCARD_AUTHOR, VCARD_GROUP, VCARD_LONG_NOTE, VCARD_V3_APPLE};
use crate::vcard::{DecodeOptions, VCard, VCardProperty, decode, parse, serialize};

fn parse_one(input: &str) -> VCard {
    let mut cards = parse(input).unwrap();
    assert_eq!(cards.len(), 1, "expected one card in:\n{input}");
    cards.remove(0)
}

/// Values must survive a second pass; property order may change.
fn assert_round_trip(input: &str) {
    let first = parse_one(input);
    let serialized = serialize(std::slice::from_ref(&first));
    let second = parse_one(&serialized);

    assert_eq!(first.version, second.version);
    assert_eq!(first.properties.len(), second.properties.len());

    for prop in &first.properties {
        let matched = second
            .properties_named(&prop.name)
            .any(|other| other.value == prop.value && other.group == prop.group);
        assert!(matched, "{} lost its value:\n{serialized}", prop.name);
    }
}

#[test_log::test]
fn round_trip_author() {
    assert_round_trip(VCARD_AUTHOR);
}

#[test_log::test]
fn round_trip_v3_apple() {
    assert_round_trip(VCARD_V3_APPLE);
}

#[test_log::test]
fn round_trip_group() {
    assert_round_trip(VCARD_GROUP);
}

#[test_log::test]
fn round_trip_long_note() {
    assert_round_trip(VCARD_LONG_NOTE);

    let card = parse_one(VCARD_LONG_NOTE);
    let serialized = serialize(&[card]);
    assert!(serialized.split("\r\n").all(|line| line.len() <= 75));
}

#[test_log::test]
fn escaped_note_is_unescaped() {
    let card = parse_one(VCARD_V3_APPLE);
    assert_eq!(
        card.get_property("NOTE").and_then(VCardProperty::as_text),
        Some("Met at the conference, Tuesday\nSecond line")
    );
}

#[test_log::test]
fn v3_pref_type_is_preference() {
    let card = parse_one(VCARD_V3_APPLE);
    assert_eq!(card.get_property("EMAIL").and_then(VCardProperty::pref), Some(1));
}

#[test_log::test]
fn decode_is_clean_on_valid_fixtures() {
    for input in [VCARD_AUTHOR, VCARD_V3_APPLE, VCARD_GROUP, VCARD_LONG_NOTE] {
        let decoded = decode(input, &DecodeOptions::default());
        assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
    }
}
