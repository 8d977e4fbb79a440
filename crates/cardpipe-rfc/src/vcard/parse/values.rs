//! vCard value interpreters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{ParseError, ParseResult};
use crate::vcard::core::{
    Address, DateAndOrTime, Gender, Organization, Sex, StructuredName, Timestamp, VCardDate,
    VCardTime, VCardUtcOffset,
};

/// Unescapes a text value (`\n`, `\N`, `\,`, `\;`, `\\`).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\' | ':')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Splits on `separator` when it is not escaped with a backslash.
///
/// Escapes are left in place so each part can be unescaped afterwards.
#[must_use]
pub fn split_unescaped(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }

    parts.push(&s[start..]);
    parts
}

/// Splits a comma-separated list and unescapes each item.
///
/// An empty input yields an empty list.
#[must_use]
pub fn split_list(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    split_unescaped(s, ',')
        .into_iter()
        .map(unescape_text)
        .collect()
}

fn components(value: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    split_unescaped(value, ';').into_iter().map(split_list)
}

/// Interprets an N value: `family;given;additional;prefixes;suffixes`.
#[must_use]
pub fn parse_structured_name(value: &str) -> StructuredName {
    StructuredName::from_components(components(value))
}

/// Interprets an ADR value of seven `;`-separated components.
#[must_use]
pub fn parse_address(value: &str) -> Address {
    Address::from_components(components(value))
}

/// Interprets an ORG value: name followed by units.
#[must_use]
pub fn parse_organization(value: &str) -> Organization {
    Organization::from_components(split_unescaped(value, ';').into_iter().map(unescape_text))
}

/// Interprets a GENDER value: `sex[;identity]`.
///
/// ## Errors
/// Returns an error if the sex component is not one of M, F, O, N, U.
pub fn parse_gender(value: &str, line: usize) -> ParseResult<Gender> {
    let (sex, identity) = match value.split_once(';') {
        Some((sex, identity)) => (sex, Some(unescape_text(identity))),
        None => (value, None),
    };

    let sex = match sex.trim() {
        "" => None,
        letter => Some(
            letter
                .parse::<Sex>()
                .map_err(|err| ParseError::invalid_value(line, err.to_string()))?,
        ),
    };

    Ok(Gender {
        sex,
        identity: identity.filter(|i| !i.is_empty()),
    })
}

/// Interprets a date, time, or date-time, accepting both basic (`19960415`)
/// and extended (`1996-04-15`) forms as well as truncated dates.
///
/// ## Errors
/// Returns an error if no supported form matches.
pub fn parse_date_and_or_time(raw: &str, line: usize) -> ParseResult<DateAndOrTime> {
    let raw = raw.trim();

    if let Some(time) = raw.strip_prefix('T') {
        let (time, offset) = parse_time(time, line)?;
        return Ok(DateAndOrTime::Time { time, offset });
    }

    match raw.split_once('T') {
        Some((date, time)) => {
            let date = parse_date(date, line)?;
            let (time, offset) = parse_time(time, line)?;
            Ok(DateAndOrTime::DateTime { date, time, offset })
        }
        None => Ok(DateAndOrTime::Date(parse_date(raw, line)?)),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn number<T: std::str::FromStr>(s: &str, line: usize, raw: &str) -> ParseResult<T> {
    if !all_digits(s) {
        return Err(ParseError::invalid_date(line, raw));
    }
    s.parse().map_err(|_err| ParseError::invalid_date(line, raw))
}

/// Interprets a full or truncated date.
///
/// ## Errors
/// Returns an error if the text is not a supported date form.
pub fn parse_date(raw: &str, line: usize) -> ParseResult<VCardDate> {
    if let Some(day) = raw.strip_prefix("---") {
        return Ok(VCardDate::Day(number(day, line, raw)?));
    }

    if let Some(month_day) = raw.strip_prefix("--") {
        let compact = month_day.replace('-', "");
        if compact.len() != 4 || !all_digits(&compact) {
            return Err(ParseError::invalid_date(line, raw));
        }
        let month = number(&compact[..2], line, raw)?;
        let day = number(&compact[2..], line, raw)?;
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(ParseError::invalid_date(line, raw));
        }
        return Ok(VCardDate::MonthDay { month, day });
    }

    match raw.len() {
        4 => Ok(VCardDate::Year(number(raw, line, raw)?)),
        7 if raw.as_bytes()[4] == b'-' => Ok(VCardDate::YearMonth {
            year: number(&raw[..4], line, raw)?,
            month: number(&raw[5..], line, raw)?,
        }),
        8 | 10 => {
            let compact = raw.replace('-', "");
            NaiveDate::parse_from_str(&compact, "%Y%m%d")
                .map(VCardDate::Full)
                .map_err(|_err| ParseError::invalid_date(line, raw))
        }
        _ => Err(ParseError::invalid_date(line, raw)),
    }
}

/// Interprets a time with an optional UTC offset suffix.
///
/// ## Errors
/// Returns an error if the text is not a supported time form.
pub fn parse_time(raw: &str, line: usize) -> ParseResult<(VCardTime, Option<VCardUtcOffset>)> {
    let (clock, offset) = if let Some(clock) = raw.strip_suffix(['Z', 'z']) {
        (clock, Some(VCardUtcOffset::UTC))
    } else if let Some(pos) = raw.rfind(['+', '-']).filter(|pos| *pos > 0) {
        (&raw[..pos], Some(parse_utc_offset(&raw[pos..], line)?))
    } else {
        (raw, None)
    };

    let compact = clock.replace(':', "");
    // Fractional seconds are dropped.
    let compact = compact.split([',', '.']).next().unwrap_or_default();
    if !all_digits(compact) {
        return Err(ParseError::invalid_date(line, raw));
    }

    let time = match compact.len() {
        2 => VCardTime::Hour(number(compact, line, raw)?),
        4 => VCardTime::HourMinute {
            hour: number(&compact[..2], line, raw)?,
            minute: number(&compact[2..], line, raw)?,
        },
        6 => NaiveTime::parse_from_str(compact, "%H%M%S")
            .map(VCardTime::Full)
            .map_err(|_err| ParseError::invalid_date(line, raw))?,
        _ => return Err(ParseError::invalid_date(line, raw)),
    };

    Ok((time, offset))
}

/// Interprets `Z`, `+HH`, `+HHMM` or `+HH:MM`.
///
/// ## Errors
/// Returns an error if the offset is malformed or out of range.
pub fn parse_utc_offset(raw: &str, line: usize) -> ParseResult<VCardUtcOffset> {
    if raw.eq_ignore_ascii_case("Z") {
        return Ok(VCardUtcOffset::UTC);
    }

    let (negative, digits) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (false, rest),
        Some(("-", rest)) => (true, rest),
        _ => return Err(ParseError::invalid_date(line, raw)),
    };
    let digits = digits.replace(':', "");
    if !all_digits(&digits) {
        return Err(ParseError::invalid_date(line, raw));
    }

    let (hours, minutes): (i8, u8) = match digits.len() {
        2 => (number(&digits, line, raw)?, 0),
        4 => (number(&digits[..2], line, raw)?, number(&digits[2..], line, raw)?),
        _ => return Err(ParseError::invalid_date(line, raw)),
    };

    if hours > 14 || minutes > 59 {
        return Err(ParseError::invalid_date(line, raw));
    }

    Ok(VCardUtcOffset::new(if negative { -hours } else { hours }, minutes))
}

/// Interprets a REV timestamp; a bare date means midnight UTC.
///
/// ## Errors
/// Returns an error if the text is not a supported timestamp form.
pub fn parse_timestamp(raw: &str, line: usize) -> ParseResult<Timestamp> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | ':'))
        .collect();
    let compact = compact.trim_end_matches(['Z', 'z']);

    let naive = if compact.contains('T') {
        let without_fraction = compact.split(['.', ',']).next().unwrap_or_default();
        NaiveDateTime::parse_from_str(without_fraction, "%Y%m%dT%H%M%S")
    } else {
        NaiveDate::parse_from_str(compact, "%Y%m%d").map(|d| d.and_time(NaiveTime::MIN))
    }
    .map_err(|_err| ParseError::invalid_date(line, raw))?;

    Ok(Timestamp::new(naive.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_known_sequences() {
        assert_eq!(unescape_text(r"a\,b\;c\\d\ne"), "a,b;c\\d\ne");
        assert_eq!(unescape_text(r"keep\x"), r"keep\x");
    }

    #[test]
    fn split_respects_escapes() {
        assert_eq!(split_unescaped(r"a\;b;c", ';'), vec![r"a\;b", "c"]);
        assert_eq!(split_unescaped(r"a\\;b", ';'), vec![r"a\\", "b"]);
    }

    #[test]
    fn structured_name_components() {
        let name = parse_structured_name("Public;John;Quinlan;Mr.;Esq.,Jr.");
        assert_eq!(name.family, vec!["Public"]);
        assert_eq!(name.additional, vec!["Quinlan"]);
        assert_eq!(name.suffixes, vec!["Esq.", "Jr."]);
    }

    #[test]
    fn address_with_missing_trailing_components() {
        let addr = parse_address(";;123 Main St;Anytown");
        assert_eq!(addr.street, vec!["123 Main St"]);
        assert_eq!(addr.locality, vec!["Anytown"]);
        assert!(addr.country.is_empty());
    }

    #[test]
    fn organization_units() {
        let org = parse_organization(r"Acme\, Inc.;Engineering;Backend");
        assert_eq!(org.name, "Acme, Inc.");
        assert_eq!(org.units, vec!["Engineering", "Backend"]);
    }

    #[test]
    fn gender_forms() {
        assert_eq!(parse_gender("F", 1).unwrap().sex, Some(Sex::Female));
        let identity = parse_gender(";it's complicated", 1).unwrap();
        assert_eq!(identity.sex, None);
        assert_eq!(identity.identity.as_deref(), Some("it's complicated"));
        assert!(parse_gender("Q", 1).is_err());
    }

    #[test]
    fn dates_in_every_supported_form() {
        assert_eq!(
            parse_date("19960415", 1).unwrap(),
            VCardDate::Full(NaiveDate::from_ymd_opt(1996, 4, 15).unwrap())
        );
        assert_eq!(
            parse_date("1996-04-15", 1).unwrap(),
            VCardDate::Full(NaiveDate::from_ymd_opt(1996, 4, 15).unwrap())
        );
        assert_eq!(
            parse_date("--0203", 1).unwrap(),
            VCardDate::MonthDay { month: 2, day: 3 }
        );
        assert_eq!(parse_date("---07", 1).unwrap(), VCardDate::Day(7));
        assert_eq!(
            parse_date("1996-04", 1).unwrap(),
            VCardDate::YearMonth {
                year: 1996,
                month: 4
            }
        );
        assert_eq!(parse_date("1996", 1).unwrap(), VCardDate::Year(1996));
        assert!(parse_date("19961345", 1).is_err());
        assert!(parse_date("--1340", 1).is_err());
    }

    #[test]
    fn date_time_with_offset() {
        let value = parse_date_and_or_time("19531015T231000-0500", 2).unwrap();
        let DateAndOrTime::DateTime { time, offset, .. } = value else {
            panic!("expected date-time");
        };
        assert_eq!(
            time,
            VCardTime::Full(NaiveTime::from_hms_opt(23, 10, 0).unwrap())
        );
        assert_eq!(offset, Some(VCardUtcOffset::new(-5, 0)));
    }

    #[test]
    fn time_only() {
        let value = parse_date_and_or_time("T1022Z", 1).unwrap();
        assert_eq!(
            value,
            DateAndOrTime::Time {
                time: VCardTime::HourMinute {
                    hour: 10,
                    minute: 22
                },
                offset: Some(VCardUtcOffset::UTC),
            }
        );
    }

    #[test]
    fn timestamps() {
        let basic = parse_timestamp("19951031T222710Z", 1).unwrap();
        let extended = parse_timestamp("1995-10-31T22:27:10Z", 1).unwrap();
        assert_eq!(basic, extended);
        assert_eq!(
            parse_timestamp("20240101", 1).unwrap().datetime.to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
        assert!(parse_timestamp("yesterday", 1).is_err());
    }
}
