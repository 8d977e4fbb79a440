use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{Address, VCard, VCardParameter, VCardProperty, VCardValue};

use super::{
    apply_point_attributes, join_component, point_attributes, split_component, unexpected,
};
use crate::contact::{Contact, ContactField, ContactPoint, PostalAddress};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

const LABEL: &str = "LABEL";

/// ADR.
pub struct AddressMapping;

impl FieldMapping for AddressMapping {
    fn name(&self) -> &'static str {
        names::ADR
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::ADR]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Addresses]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let mut addresses = Vec::new();
        for prop in card.properties_named(names::ADR) {
            let Some(adr) = prop.value.as_address() else {
                ctx.warn(unexpected(prop));
                continue;
            };
            let (types, pref) = point_attributes(prop);
            addresses.push(PostalAddress {
                types,
                pref,
                po_box: join_component(&adr.po_box, ", "),
                extended: join_component(&adr.extended, ", "),
                street: join_component(&adr.street, ", "),
                locality: join_component(&adr.locality, ", "),
                region: join_component(&adr.region, ", "),
                postal_code: join_component(&adr.postal_code, ", "),
                country: join_component(&adr.country, ", "),
                label: prop.get_param_value(LABEL).map(ToOwned::to_owned),
            });
        }
        contact.addresses = addresses;
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        for address in &contact.addresses {
            let value = Address {
                po_box: split_component(&address.po_box),
                extended: split_component(&address.extended),
                street: split_component(&address.street),
                locality: split_component(&address.locality),
                region: split_component(&address.region),
                postal_code: split_component(&address.postal_code),
                country: split_component(&address.country),
            };
            let mut prop = VCardProperty::new(names::ADR, VCardValue::Address(value));
            apply_point_attributes(&mut prop, &address.types, address.pref, ctx.version);
            // LABEL is a separate, unlinked property in 3.0.
            if let Some(label) = &address.label
                && !ctx.is_v3()
            {
                prop.add_param(VCardParameter::new(LABEL, label.clone()));
            }
            card.add_property(prop);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Phone,
    Email,
    Messaging,
    Url,
}

/// TEL, EMAIL, IMPP and URL: repeated values with TYPE and preference.
pub struct ContactPointMapping {
    kind: PointKind,
    properties: &'static [&'static str],
    fields: &'static [ContactField],
    get: fn(&Contact) -> &Vec<ContactPoint>,
    set: fn(&mut Contact) -> &mut Vec<ContactPoint>,
}

impl ContactPointMapping {
    pub const PHONE: Self = Self {
        kind: PointKind::Phone,
        properties: &[names::TEL],
        fields: &[ContactField::Phones],
        get: |c| &c.phones,
        set: |c| &mut c.phones,
    };

    pub const EMAIL: Self = Self {
        kind: PointKind::Email,
        properties: &[names::EMAIL],
        fields: &[ContactField::Emails],
        get: |c| &c.emails,
        set: |c| &mut c.emails,
    };

    pub const IMPP: Self = Self {
        kind: PointKind::Messaging,
        properties: &[names::IMPP],
        fields: &[ContactField::InstantMessaging],
        get: |c| &c.instant_messaging,
        set: |c| &mut c.instant_messaging,
    };

    pub const URL: Self = Self {
        kind: PointKind::Url,
        properties: &[names::URL],
        fields: &[ContactField::Urls],
        get: |c| &c.urls,
        set: |c| &mut c.urls,
    };

    fn property(&self) -> &'static str {
        self.properties[0]
    }

    fn read(&self, prop: &VCardProperty) -> Option<ContactPoint> {
        let raw = prop.value.as_text_or_uri()?;
        let value = match self.kind {
            PointKind::Phone => strip_tel_scheme(raw),
            _ => raw,
        };
        let (mut types, pref) = point_attributes(prop);
        if self.kind == PointKind::Email {
            types.retain(|t| t != "internet");
        }
        Some(ContactPoint {
            value: value.to_string(),
            types,
            pref,
        })
    }

    fn write(&self, point: &ContactPoint, ctx: &MappingContext<'_>) -> VCardProperty {
        let mut prop = match self.kind {
            PointKind::Phone | PointKind::Email => {
                VCardProperty::text(self.property(), point.value.clone())
            }
            PointKind::Messaging | PointKind::Url => {
                VCardProperty::uri(self.property(), point.value.clone())
            }
        };
        if self.kind == PointKind::Email && ctx.is_v3() {
            prop.add_type("internet");
        }
        apply_point_attributes(&mut prop, &point.types, point.pref, ctx.version);
        prop
    }
}

fn strip_tel_scheme(value: &str) -> &str {
    match value.get(..4) {
        Some(scheme) if scheme.eq_ignore_ascii_case("tel:") => &value[4..],
        _ => value,
    }
}

impl FieldMapping for ContactPointMapping {
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
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let mut points = Vec::new();
        for prop in card.properties_named(self.property()) {
            match self.read(prop) {
                Some(point) => points.push(point),
                None => ctx.warn(unexpected(prop)),
            }
        }
        *(self.set)(contact) = points;
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        for point in (self.get)(contact) {
            card.add_property(self.write(point, ctx));
        }
        Ok(())
    }
}
