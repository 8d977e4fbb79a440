use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{Gender, Sex, StructuredName, VCard, VCardProperty, VCardValue};

use super::{X_GENDER, invalid, join_component, non_empty, split_component, text_value, unexpected};
use crate::contact::{Contact, ContactField, ContactGender, ContactKind, GenderSex, PersonName};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

/// UID. Kept on the contact when the card has none, unless one is generated.
pub struct UidMapping;

impl FieldMapping for UidMapping {
    fn name(&self) -> &'static str {
        names::UID
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::UID]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Uid]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        match card.get_property(names::UID) {
            Some(prop) => contact.uid = Some(text_value(prop)?.to_string()),
            None if ctx.params.generate_uid && contact.uid.is_none() => {
                contact.uid = Some(contact.generated_uid());
            }
            None => {}
        }
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let uid = contact
            .uid
            .clone()
            .or_else(|| ctx.params.generate_uid.then(|| contact.generated_uid()));
        if let Some(uid) = uid {
            card.add_property(VCardProperty::text(names::UID, uid));
        }
        Ok(())
    }
}

/// KIND and MEMBER; vCard 3.0 uses the address book server extensions.
pub struct KindMapping;

impl FieldMapping for KindMapping {
    fn name(&self) -> &'static str {
        names::KIND
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[
            names::KIND,
            names::MEMBER,
            names::X_ABS_KIND,
            names::X_ABS_MEMBER,
        ]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Kind, ContactField::Members]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let mut members = Vec::new();
        for prop in card
            .properties_named(names::MEMBER)
            .chain(card.properties_named(names::X_ABS_MEMBER))
        {
            match prop.value.as_text_or_uri() {
                Some(member) => members.push(member.to_string()),
                None => ctx.warn(unexpected(prop)),
            }
        }
        contact.members = members;

        let kind = card
            .get_property(names::KIND)
            .or_else(|| card.get_property(names::X_ABS_KIND));
        contact.kind = match kind {
            Some(prop) => {
                let value = text_value(prop)?;
                ContactKind::parse(value)
                    .ok_or_else(|| invalid(ContactField::Kind, format!("unknown kind '{value}'")))?
            }
            None => ContactKind::Individual,
        };
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let (kind_name, member_name) = if ctx.is_v3() {
            (names::X_ABS_KIND, names::X_ABS_MEMBER)
        } else {
            (names::KIND, names::MEMBER)
        };

        if contact.kind != ContactKind::Individual {
            card.add_property(VCardProperty::text(kind_name, contact.kind.as_str()));
        }
        for member in &contact.members {
            card.add_property(VCardProperty::uri(member_name, member));
        }
        Ok(())
    }
}

/// FN. Always written, empty when the contact has no display name.
pub struct FormattedNameMapping;

impl FieldMapping for FormattedNameMapping {
    fn name(&self) -> &'static str {
        names::FN
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::FN]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::DisplayName]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        contact.display_name = match card.get_property(names::FN) {
            Some(prop) => non_empty(text_value(prop)?),
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
        let display_name = contact.display_name.clone().unwrap_or_default();
        card.add_property(VCardProperty::text(names::FN, display_name));
        Ok(())
    }
}

/// N. vCard 3.0 requires it, so an empty one is written there when unset.
pub struct NameMapping;

impl FieldMapping for NameMapping {
    fn name(&self) -> &'static str {
        names::N
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::N]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Name]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let Some(prop) = card.get_property(names::N) else {
            contact.name = None;
            return Ok(());
        };
        let n = prop.value.as_structured_name().ok_or_else(|| unexpected(prop))?;

        let name = PersonName {
            family: join_component(&n.family, ","),
            given: join_component(&n.given, ","),
            additional: join_component(&n.additional, ","),
            prefixes: join_component(&n.prefixes, ","),
            suffixes: join_component(&n.suffixes, ","),
        };
        contact.name = (!name.is_empty()).then_some(name);
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let value = match &contact.name {
            Some(name) => StructuredName {
                family: split_component(&name.family),
                given: split_component(&name.given),
                additional: split_component(&name.additional),
                prefixes: split_component(&name.prefixes),
                suffixes: split_component(&name.suffixes),
            },
            None if ctx.is_v3() => StructuredName::default(),
            None => return Ok(()),
        };
        card.add_property(VCardProperty::new(names::N, VCardValue::StructuredName(value)));
        Ok(())
    }
}

/// GENDER in vCard 4.0, `X-GENDER` words in 3.0.
pub struct GenderMapping;

impl GenderMapping {
    fn from_word(word: &str) -> ContactGender {
        let sex = match word.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(GenderSex::Male),
            "f" | "female" => Some(GenderSex::Female),
            "o" | "other" => Some(GenderSex::Other),
            "n" | "none" => Some(GenderSex::None),
            "u" | "unknown" => Some(GenderSex::Unknown),
            _ => None,
        };
        ContactGender {
            identity: sex.is_none().then(|| word.to_string()),
            sex,
        }
    }

    const fn word(sex: GenderSex) -> &'static str {
        match sex {
            GenderSex::Male => "Male",
            GenderSex::Female => "Female",
            GenderSex::Other => "Other",
            GenderSex::None => "None",
            GenderSex::Unknown => "Unknown",
        }
    }
}

const fn sex_to_domain(sex: Sex) -> GenderSex {
    match sex {
        Sex::Male => GenderSex::Male,
        Sex::Female => GenderSex::Female,
        Sex::Other => GenderSex::Other,
        Sex::None => GenderSex::None,
        Sex::Unknown => GenderSex::Unknown,
    }
}

const fn sex_to_wire(sex: GenderSex) -> Sex {
    match sex {
        GenderSex::Male => Sex::Male,
        GenderSex::Female => Sex::Female,
        GenderSex::Other => Sex::Other,
        GenderSex::None => Sex::None,
        GenderSex::Unknown => Sex::Unknown,
    }
}

impl FieldMapping for GenderMapping {
    fn name(&self) -> &'static str {
        names::GENDER
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::GENDER, X_GENDER]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Gender]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        contact.gender = if let Some(prop) = card.get_property(names::GENDER) {
            match &prop.value {
                VCardValue::Gender(gender) => Some(ContactGender {
                    sex: gender.sex.map(sex_to_domain),
                    identity: gender.identity.clone(),
                }),
                _ => return Err(unexpected(prop)),
            }
        } else if let Some(prop) = card.get_property(X_GENDER) {
            let word = text_value(prop)?;
            (!word.trim().is_empty()).then(|| Self::from_word(word))
        } else {
            None
        };
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let Some(gender) = &contact.gender else {
            return Ok(());
        };

        if ctx.is_v3() {
            let word = gender
                .sex
                .map(Self::word)
                .map(str::to_string)
                .or_else(|| gender.identity.clone());
            if let Some(word) = word {
                card.add_property(VCardProperty::text(X_GENDER, word));
            }
            return Ok(());
        }

        let value = Gender {
            sex: gender.sex.map(sex_to_wire),
            identity: gender.identity.clone(),
        };
        card.add_property(VCardProperty::new(names::GENDER, VCardValue::Gender(value)));
        Ok(())
    }
}
