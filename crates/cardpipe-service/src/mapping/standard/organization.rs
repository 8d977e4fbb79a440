use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{Organization, VCard, VCardProperty, VCardValue};

use super::{non_empty, unexpected};
use crate::contact::{Contact, ContactField};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

/// ORG: organization name followed by department units.
pub struct OrganizationMapping;

impl FieldMapping for OrganizationMapping {
    fn name(&self) -> &'static str {
        names::ORG
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::ORG]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Organization, ContactField::Departments]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let Some(prop) = card.get_property(names::ORG) else {
            contact.organization = None;
            contact.departments.clear();
            return Ok(());
        };
        let org = prop.value.as_organization().ok_or_else(|| unexpected(prop))?;

        contact.organization = non_empty(&org.name);
        contact.departments = org.units.iter().filter(|u| !u.is_empty()).cloned().collect();
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if contact.organization.is_none() && contact.departments.is_empty() {
            return Ok(());
        }
        let value = Organization::with_units(
            contact.organization.clone().unwrap_or_default(),
            contact.departments.clone(),
        );
        card.add_property(VCardProperty::new(names::ORG, VCardValue::Organization(value)));
        Ok(())
    }
}
