use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{VCard, VCardProperty, VCardValue};

use super::{non_empty, text_value, unexpected};
use crate::contact::{Contact, ContactField};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

/// A single free-text property stored in an optional string field.
pub struct TextMapping {
    properties: &'static [&'static str],
    fields: &'static [ContactField],
    get: fn(&Contact) -> Option<&String>,
    set: fn(&mut Contact, Option<String>),
}

impl TextMapping {
    pub const TITLE: Self = Self {
        properties: &[names::TITLE],
        fields: &[ContactField::Title],
        get: |c| c.title.as_ref(),
        set: |c, v| c.title = v,
    };

    pub const ROLE: Self = Self {
        properties: &[names::ROLE],
        fields: &[ContactField::Role],
        get: |c| c.role.as_ref(),
        set: |c, v| c.role = v,
    };

    pub const NOTE: Self = Self {
        properties: &[names::NOTE],
        fields: &[ContactField::Note],
        get: |c| c.note.as_ref(),
        set: |c, v| c.note = v,
    };

    fn property(&self) -> &'static str {
        self.properties[0]
    }
}

impl FieldMapping for TextMapping {
    fn name(&self) -> &'static str {
        self.property()
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
        let value = match card.get_property(self.property()) {
            Some(prop) => non_empty(text_value(prop)?),
            None => None,
        };
        (self.set)(contact, value);
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if let Some(value) = (self.get)(contact) {
            card.add_property(VCardProperty::text(self.property(), value.clone()));
        }
        Ok(())
    }
}

/// Comma-separated text list, gathered across repeated properties.
pub struct TextListMapping {
    properties: &'static [&'static str],
    fields: &'static [ContactField],
    get: fn(&Contact) -> &Vec<String>,
    set: fn(&mut Contact) -> &mut Vec<String>,
}

impl TextListMapping {
    pub const NICKNAME: Self = Self {
        properties: &[names::NICKNAME],
        fields: &[ContactField::Nicknames],
        get: |c| &c.nicknames,
        set: |c| &mut c.nicknames,
    };

    pub const CATEGORIES: Self = Self {
        properties: &[names::CATEGORIES],
        fields: &[ContactField::Categories],
        get: |c| &c.categories,
        set: |c| &mut c.categories,
    };

    fn property(&self) -> &'static str {
        self.properties[0]
    }
}

impl FieldMapping for TextListMapping {
    fn name(&self) -> &'static str {
        self.property()
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
        let mut items = Vec::new();
        for prop in card.properties_named(self.property()) {
            match &prop.value {
                VCardValue::TextList(values) => {
                    items.extend(values.iter().filter(|v| !v.is_empty()).cloned());
                }
                VCardValue::Text(value) | VCardValue::Unknown(value) if !value.is_empty() => {
                    items.push(value.clone());
                }
                VCardValue::Text(_) | VCardValue::Unknown(_) => {}
                _ => return Err(unexpected(prop)),
            }
        }
        *(self.set)(contact) = items;
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let items = (self.get)(contact);
        if !items.is_empty() {
            card.add_property(VCardProperty::new(
                self.property(),
                VCardValue::TextList(items.clone()),
            ));
        }
        Ok(())
    }
}
