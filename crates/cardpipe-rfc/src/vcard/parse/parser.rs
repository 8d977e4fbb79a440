//! vCard document parser.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::error::{ParseError, ParseErrorKind, ParseResult, ParseWarning};
use super::lexer::{ContentLine, parse_content_line, unfold};
use super::values::{
    parse_address, parse_date_and_or_time, parse_gender, parse_organization,
    parse_structured_name, parse_timestamp, parse_utc_offset, split_list, unescape_text,
};
use crate::vcard::core::{
    DateAndOrTime, VCard, VCardParameter, VCardProperty, VCardValue, VCardVersion,
};

/// Properties whose default value type is URI.
const URI_PROPERTIES: &[&str] = &[
    "SOURCE",
    "PHOTO",
    "LOGO",
    "SOUND",
    "URL",
    "IMPP",
    "MEMBER",
    "RELATED",
    "FBURL",
    "CALADRURI",
    "CALURI",
    "X-ADDRESSBOOKSERVER-MEMBER",
];

/// Properties holding a date and/or time.
const DATE_PROPERTIES: &[&str] = &["BDAY", "ANNIVERSARY", "X-ANNIVERSARY", "DEATHDATE"];

/// Options for the lenient decoder.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Version assumed when a card has no (or an unsupported) `VERSION`.
    pub default_version: VCardVersion,
    /// Report properties no supported version defines (`X-` names excluded).
    pub report_unknown_properties: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            default_version: VCardVersion::V4,
            report_unknown_properties: false,
        }
    }
}

impl DecodeOptions {
    #[must_use]
    pub fn with_default_version(mut self, version: VCardVersion) -> Self {
        self.default_version = version;
        self
    }

    #[must_use]
    pub fn with_unknown_property_reports(mut self, report: bool) -> Self {
        self.report_unknown_properties = report;
        self
    }
}

/// Output of the lenient decoder.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub cards: Vec<VCard>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses a vCard document into one or more vCards.
///
/// ## Summary
/// Fail-fast: the first malformed line, invalid value or unclosed card aborts
/// the parse.
///
/// ## Errors
/// Returns a parse error describing the first problem found.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<Vec<VCard>> {
    tracing::debug!("Parsing vCard document");

    let options = DecodeOptions::default();
    let mut parser = Parser::new(unfold(input), &options, None);
    let cards = parser.parse_document()?;

    tracing::debug!(count = cards.len(), "Parsed vCards");

    Ok(cards)
}

/// Decodes a vCard document, collecting recoverable problems as warnings.
///
/// ## Summary
/// Malformed lines are skipped, unsupported versions fall back to
/// `options.default_version`, values that do not match their type are kept as
/// [`VCardValue::Unknown`], nested components are skipped and an unclosed
/// final card is kept. Each of these yields a [`ParseWarning`].
#[must_use]
#[tracing::instrument(skip(input, options), fields(input_len = input.len()))]
pub fn decode(input: &str, options: &DecodeOptions) -> Decoded {
    let mut parser = Parser::new(unfold(input), options, Some(Vec::new()));

    let cards = match parser.parse_document() {
        Ok(cards) => cards,
        Err(err) => {
            // Recovery mode never propagates; keep whatever was collected.
            tracing::error!(%err, "Lenient decoder returned an error");
            Vec::new()
        }
    };
    let warnings = parser.warnings.unwrap_or_default();

    tracing::debug!(
        count = cards.len(),
        warnings = warnings.len(),
        "Decoded vCards"
    );

    Decoded { cards, warnings }
}

struct Parser<'a> {
    lines: std::iter::Enumerate<std::vec::IntoIter<String>>,
    options: &'a DecodeOptions,
    /// `None` in fail-fast mode.
    warnings: Option<Vec<ParseWarning>>,
}

impl<'a> Parser<'a> {
    fn new(
        lines: Vec<String>,
        options: &'a DecodeOptions,
        warnings: Option<Vec<ParseWarning>>,
    ) -> Self {
        Self {
            lines: lines.into_iter().enumerate(),
            options,
            warnings,
        }
    }

    fn next_line(&mut self) -> Option<(usize, String)> {
        self.lines.next().map(|(index, line)| (index + 1, line))
    }

    /// Records `err` as a warning, or returns it in fail-fast mode.
    fn recover(&mut self, err: ParseError, property: Option<&str>) -> ParseResult<()> {
        let Some(warnings) = self.warnings.as_mut() else {
            return Err(err);
        };

        tracing::debug!(%err, "Recovered from parse error");
        warnings.push(match property {
            Some(property) => ParseWarning::for_property(err, property),
            None => ParseWarning::from(err),
        });
        Ok(())
    }

    fn parse_document(&mut self) -> ParseResult<Vec<VCard>> {
        let mut cards = Vec::new();

        while let Some((line_num, line)) = self.next_line() {
            if line.trim().eq_ignore_ascii_case("BEGIN:VCARD") {
                if let Some(card) = self.parse_vcard(line_num)? {
                    cards.push(card);
                }
            } else {
                tracing::trace!(line = line_num, "Skipping content outside vCard");
            }
        }

        Ok(cards)
    }

    fn parse_vcard(&mut self, start_line: usize) -> ParseResult<Option<VCard>> {
        let mut card = VCard::with_version(self.options.default_version);

        while let Some((line_num, line)) = self.next_line() {
            let trimmed = line.trim();

            if trimmed.eq_ignore_ascii_case("END:VCARD") {
                return Ok(Some(card));
            }

            if trimmed
                .get(..6)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("BEGIN:"))
            {
                self.skip_nested(line_num, &trimmed[6..])?;
                continue;
            }

            let content_line = match parse_content_line(&line, line_num) {
                Ok(content_line) => content_line,
                Err(err) => {
                    self.recover(err, None)?;
                    continue;
                }
            };

            if content_line.name == "VERSION" {
                match VCardVersion::parse(&content_line.value) {
                    Some(version) => card.version = version,
                    None => self.recover(
                        ParseError::new(
                            ParseErrorKind::UnsupportedVersion,
                            line_num,
                            format!(
                                "unsupported vCard version '{}', assuming {}",
                                content_line.value, self.options.default_version
                            ),
                        ),
                        Some("VERSION"),
                    )?,
                }
                continue;
            }

            let property = self.convert_to_property(content_line, line_num)?;
            card.add_property(property);
        }

        self.recover(
            ParseError::new(
                ParseErrorKind::UnexpectedEof,
                start_line,
                "vCard not closed with END:VCARD",
            ),
            None,
        )?;
        Ok(Some(card))
    }

    /// Skips a nested component up to its matching `END:`.
    fn skip_nested(&mut self, line_num: usize, component: &str) -> ParseResult<()> {
        self.recover(
            ParseError::new(
                ParseErrorKind::NestedComponent,
                line_num,
                format!("nested component '{component}' skipped"),
            ),
            None,
        )?;

        let mut depth = 1_usize;
        while depth > 0 {
            let Some((_, line)) = self.next_line() else {
                break;
            };
            let upper = line.trim().to_ascii_uppercase();
            if upper.starts_with("BEGIN:") {
                depth += 1;
            } else if upper.starts_with("END:") {
                depth -= 1;
            }
        }

        Ok(())
    }

    fn convert_to_property(
        &mut self,
        line: ContentLine,
        line_num: usize,
    ) -> ParseResult<VCardProperty> {
        if self.options.report_unknown_properties && !VCardVersion::is_known_property(&line.name)
        {
            self.recover(
                ParseError::new(
                    ParseErrorKind::UnknownProperty,
                    line_num,
                    format!("property '{}' is not defined by vCard 3.0 or 4.0", line.name),
                ),
                Some(&line.name),
            )?;
        }

        let value = match interpret_value(&line.name, &line.value, &line.params, line_num) {
            Ok(value) => value,
            Err(err) => {
                self.recover(err, Some(&line.name))?;
                VCardValue::Unknown(line.value.clone())
            }
        };

        Ok(VCardProperty {
            group: line.group,
            name: line.name,
            params: line.params,
            value,
            raw_value: line.value,
        })
    }
}

fn param_value<'p>(params: &'p [VCardParameter], name: &str) -> Option<&'p str> {
    params
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .and_then(VCardParameter::value)
}

/// Interprets a raw value from the property name and its VALUE / ENCODING
/// parameters.
fn interpret_value(
    name: &str,
    raw: &str,
    params: &[VCardParameter],
    line_num: usize,
) -> ParseResult<VCardValue> {
    if let Some(encoding) = param_value(params, "ENCODING")
        && (encoding.eq_ignore_ascii_case("b") || encoding.eq_ignore_ascii_case("base64"))
    {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        return BASE64
            .decode(compact)
            .map(VCardValue::Binary)
            .map_err(|err| ParseError::invalid_value(line_num, format!("bad base64: {err}")));
    }

    let is_date_property = DATE_PROPERTIES.contains(&name);

    if let Some(value_type) = param_value(params, "VALUE") {
        match value_type.to_ascii_lowercase().as_str() {
            "uri" | "url" => return Ok(VCardValue::Uri(raw.trim().to_string())),
            "text" if is_date_property => {
                return Ok(VCardValue::DateAndOrTime(DateAndOrTime::Text(
                    unescape_text(raw),
                )));
            }
            "date" | "time" | "date-time" | "date-and-or-time" => {
                return parse_date_and_or_time(raw, line_num).map(VCardValue::DateAndOrTime);
            }
            "timestamp" => return parse_timestamp(raw, line_num).map(VCardValue::Timestamp),
            "boolean" => {
                return match raw.trim().to_ascii_uppercase().as_str() {
                    "TRUE" => Ok(VCardValue::Boolean(true)),
                    "FALSE" => Ok(VCardValue::Boolean(false)),
                    other => Err(ParseError::invalid_value(
                        line_num,
                        format!("'{other}' is not a boolean"),
                    )),
                };
            }
            "integer" => {
                return raw.trim().parse().map(VCardValue::Integer).map_err(|err| {
                    ParseError::invalid_value(line_num, format!("'{raw}' is not an integer: {err}"))
                });
            }
            "float" => {
                return raw.trim().parse().map(VCardValue::Float).map_err(|err| {
                    ParseError::invalid_value(line_num, format!("'{raw}' is not a float: {err}"))
                });
            }
            "utc-offset" => return parse_utc_offset(raw.trim(), line_num).map(VCardValue::UtcOffset),
            _ => {}
        }
    }

    let value = match name {
        "N" => VCardValue::StructuredName(parse_structured_name(raw)),
        "ADR" => VCardValue::Address(parse_address(raw)),
        "ORG" => VCardValue::Organization(parse_organization(raw)),
        "GENDER" => VCardValue::Gender(parse_gender(raw, line_num)?),
        "REV" => VCardValue::Timestamp(parse_timestamp(raw, line_num)?),
        "NICKNAME" | "CATEGORIES" => VCardValue::TextList(split_list(raw)),
        _ if is_date_property => VCardValue::DateAndOrTime(parse_date_and_or_time(raw, line_num)?),
        _ if URI_PROPERTIES.contains(&name) => VCardValue::Uri(raw.trim().to_string()),
        _ => VCardValue::Text(unescape_text(raw)),
    };

    Ok(value)
}
