use cardpipe_rfc::vcard::core::{DateAndOrTime, Timestamp, VCardDate, names};
use cardpipe_rfc::vcard::{VCard, VCardParameter, VCardProperty, VCardValue};
use chrono::NaiveDate;

use super::{X_APPLE_OMIT_YEAR, invalid, unexpected};
use crate::contact::{Contact, ContactField, PartialDate};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

/// Placeholder year vCard 3.0 clients write for dates without a year.
const OMITTED_YEAR: i32 = 1604;

/// BDAY or ANNIVERSARY.
///
/// vCard 3.0 cannot express a date without a year, so those are written with
/// a placeholder year flagged by `X-APPLE-OMIT-YEAR` and read back without it.
/// ANNIVERSARY does not exist in 3.0 and is written as `X-ANNIVERSARY`.
pub struct DateMapping {
    v4_property: &'static str,
    v3_property: &'static str,
    properties: &'static [&'static str],
    field: ContactField,
    fields: &'static [ContactField],
    get: fn(&Contact) -> Option<PartialDate>,
    set: fn(&mut Contact, Option<PartialDate>),
}

impl DateMapping {
    pub const BIRTHDAY: Self = Self {
        v4_property: names::BDAY,
        v3_property: names::BDAY,
        properties: &[names::BDAY],
        field: ContactField::Birthday,
        fields: &[ContactField::Birthday],
        get: |c| c.birthday,
        set: |c, v| c.birthday = v,
    };

    pub const ANNIVERSARY: Self = Self {
        v4_property: names::ANNIVERSARY,
        v3_property: names::X_ANNIVERSARY,
        properties: &[names::ANNIVERSARY, names::X_ANNIVERSARY],
        field: ContactField::Anniversary,
        fields: &[ContactField::Anniversary],
        get: |c| c.anniversary,
        set: |c, v| c.anniversary = v,
    };

    fn read(&self, prop: &VCardProperty) -> Result<PartialDate, MappingError> {
        let value = prop.value.as_date_and_or_time().ok_or_else(|| unexpected(prop))?;
        let date = match value {
            DateAndOrTime::Text(text) => {
                return Err(invalid(self.field, format!("free-form date '{text}'")));
            }
            DateAndOrTime::Time { .. } => {
                return Err(invalid(self.field, "time without a date"));
            }
            DateAndOrTime::Date(date) | DateAndOrTime::DateTime { date, .. } => date,
        };

        let mut partial = PartialDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        };
        let omitted = prop
            .get_param_value(X_APPLE_OMIT_YEAR)
            .and_then(|year| year.trim().parse::<i32>().ok());
        if omitted.is_some() && omitted == partial.year {
            partial.year = None;
        }
        Ok(partial)
    }

    fn write(&self, date: PartialDate, v3: bool) -> Result<VCardProperty, MappingError> {
        let unrepresentable = |reason: &str| MappingError::Unrepresentable {
            field: self.field,
            target: if v3 { "3.0" } else { "4.0" },
            reason: reason.to_string(),
        };
        let calendar = |year: i32, month: u32, day: u32| {
            NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| invalid(self.field, format!("no such date {year:04}-{month:02}-{day:02}")))
        };

        let mut omit_year = false;
        let value = match (date.year, date.month, date.day) {
            (Some(year), Some(month), Some(day)) => VCardDate::Full(calendar(year, month, day)?),
            (None, Some(month), Some(day)) if v3 => {
                omit_year = true;
                VCardDate::Full(calendar(OMITTED_YEAR, month, day)?)
            }
            (None, Some(month), Some(day)) => {
                // Leap year, so February 29 passes.
                calendar(2000, month, day)?;
                VCardDate::MonthDay { month, day }
            }
            (Some(_), Some(_), None) | (Some(_), None, None) | (None, None, Some(_)) if v3 => {
                return Err(unrepresentable("partial dates need a month and day"));
            }
            (Some(year), Some(month), None) if (1..=12).contains(&month) => {
                VCardDate::YearMonth { year, month }
            }
            (Some(year), None, None) => VCardDate::Year(year),
            (None, None, Some(day)) if (1..=31).contains(&day) => VCardDate::Day(day),
            _ => return Err(invalid(self.field, "incomplete date")),
        };

        let name = if v3 { self.v3_property } else { self.v4_property };
        let mut prop = VCardProperty::new(name, VCardValue::DateAndOrTime(DateAndOrTime::Date(value)));
        if omit_year {
            prop.add_param(VCardParameter::new(X_APPLE_OMIT_YEAR, OMITTED_YEAR.to_string()));
        }
        Ok(prop)
    }
}

impl FieldMapping for DateMapping {
    fn name(&self) -> &'static str {
        self.v4_property
    }

    fn property_names(&self) -> &'static [&'static str] {
        self.properties
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        self.fields
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let prop = card
            .get_property(self.v4_property)
            .or_else(|| card.get_property(self.v3_property));
        let value = match prop {
            Some(prop) => Some(self.read(prop)?),
            None => None,
        };
        (self.set)(contact, value);
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if let Some(date) = (self.get)(contact) {
            card.add_property(self.write(date, ctx.is_v3())?);
        }
        Ok(())
    }
}

/// REV.
pub struct RevisionMapping;

impl FieldMapping for RevisionMapping {
    fn name(&self) -> &'static str {
        names::REV
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::REV]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::LastModified]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        contact.last_modified = match card.get_property(names::REV) {
            Some(prop) => match &prop.value {
                VCardValue::Timestamp(ts) => Some(ts.datetime),
                _ => return Err(unexpected(prop)),
            },
            None => None,
        };
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if let Some(modified) = contact.last_modified {
            card.add_property(VCardProperty::new(
                names::REV,
                VCardValue::Timestamp(Timestamp::new(modified)),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_less_birthday_uses_placeholder_in_v3() {
        let prop = DateMapping::BIRTHDAY
            .write(PartialDate::month_day(2, 29), true)
            .unwrap();
        assert_eq!(prop.get_param_value(X_APPLE_OMIT_YEAR), Some("1604"));
        assert_eq!(
            DateMapping::BIRTHDAY.read(&prop).unwrap(),
            PartialDate::month_day(2, 29)
        );
    }

    #[test]
    fn year_less_birthday_is_truncated_in_v4() {
        let prop = DateMapping::BIRTHDAY
            .write(PartialDate::month_day(4, 12), false)
            .unwrap();
        assert_eq!(
            prop.value,
            VCardValue::DateAndOrTime(DateAndOrTime::Date(VCardDate::MonthDay {
                month: 4,
                day: 12
            }))
        );
    }

    #[test]
    fn year_only_is_unrepresentable_in_v3() {
        let date = PartialDate {
            year: Some(1990),
            ..PartialDate::default()
        };
        assert!(matches!(
            DateMapping::BIRTHDAY.write(date, true),
            Err(MappingError::Unrepresentable { target: "3.0", .. })
        ));
        assert!(DateMapping::BIRTHDAY.write(date, false).is_ok());
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(DateMapping::BIRTHDAY.write(PartialDate::ymd(2023, 2, 30), false).is_err());
        assert!(DateMapping::BIRTHDAY.write(PartialDate::month_day(13, 1), false).is_err());
    }

    #[test]
    fn anniversary_falls_back_to_apple_name() {
        let prop = DateMapping::ANNIVERSARY
            .write(PartialDate::ymd(2010, 6, 1), true)
            .unwrap();
        assert_eq!(prop.name, names::X_ANNIVERSARY);
    }
}
