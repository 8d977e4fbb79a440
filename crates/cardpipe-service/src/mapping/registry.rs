use std::collections::BTreeSet;

use cardpipe_rfc::vcard::VCard;

use super::{FieldMapping, MappingContext, standard};
use crate::contact::{Contact, ContactField};
use crate::parameters::ConversionParameters;
use crate::warning::Warning;

/// Ordered set of field mappings.
///
/// Registration order is application order. When two mappings own the same
/// property or field, the later one wins.
pub struct MappingRegistry {
    mappings: Vec<Box<dyn FieldMapping>>,
}

impl std::fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.mappings.iter().map(|m| m.name()))
            .finish()
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl MappingRegistry {
    /// Registry with every built-in mapping.
    #[must_use]
    pub fn standard() -> Self {
        standard::register_all(Self::builder()).build()
    }

    #[must_use]
    pub fn builder() -> MappingRegistryBuilder {
        MappingRegistryBuilder {
            mappings: Vec::new(),
        }
    }

    pub fn mappings(&self) -> impl Iterator<Item = &dyn FieldMapping> {
        self.mappings.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn selected<'a>(
        &'a self,
        params: &'a ConversionParameters,
    ) -> impl Iterator<Item = &'a dyn FieldMapping> + 'a {
        self.mappings().filter(move |m| m.is_selected(params))
    }

    /// ## Summary
    /// Converts a card into a contact.
    ///
    /// Starts from `target` when given (an existing contact being updated)
    /// and otherwise from a fresh contact. Every selected mapping runs even if
    /// an earlier one failed; each failure becomes one `ConversionFailed`
    /// warning naming the mapping.
    #[tracing::instrument(skip_all, fields(uid = card.uid(), version = %card.version))]
    pub fn import_into(
        &self,
        card: &VCard,
        target: Option<Contact>,
        params: &ConversionParameters,
    ) -> (Contact, Vec<Warning>) {
        let mut contact = target.unwrap_or_default();
        let mut ctx = MappingContext::new(card.version, params);
        let mut failures = Vec::new();

        for mapping in self.selected(params) {
            ctx.enter(mapping.name());
            if let Err(err) = mapping.import(card, &mut contact, &mut ctx) {
                tracing::warn!(mapping = mapping.name(), error = %err, "Field import failed");
                failures.push(Warning::conversion_failed(mapping.name(), err));
            }
        }

        let mut warnings = ctx.into_warnings();
        warnings.extend(failures);
        (contact, warnings)
    }

    /// ## Summary
    /// Converts a contact into a card of `params.version`.
    ///
    /// With a template and `params.merge_template`, the template's properties
    /// outside the allow-list are dropped, each selected mapping replaces the
    /// properties it owns, and everything else in the template is kept.
    /// Without one, the card starts empty.
    #[tracing::instrument(skip_all, fields(id = %contact.id, version = %params.version))]
    pub fn export_from(
        &self,
        contact: &Contact,
        template: Option<&VCard>,
        params: &ConversionParameters,
    ) -> (VCard, Vec<Warning>) {
        let mut card = match template {
            Some(template) if params.merge_template => {
                let mut card = template.clone();
                card.version = params.version;
                card.retain_properties(|p| params.allows(&p.name));
                card
            }
            _ => VCard::with_version(params.version),
        };

        let mut ctx = MappingContext::new(params.version, params);
        let mut failures = Vec::new();

        for mapping in self.selected(params) {
            for name in mapping.property_names() {
                card.remove_properties(name);
            }
            ctx.enter(mapping.name());
            if let Err(err) = mapping.export(contact, &mut card, &mut ctx) {
                tracing::warn!(mapping = mapping.name(), error = %err, "Field export failed");
                failures.push(Warning::conversion_failed(mapping.name(), err));
            }
        }

        let mut warnings = ctx.into_warnings();
        warnings.extend(failures);
        (card, warnings)
    }

    /// Contact fields written by the mappings that own any of `names`.
    pub fn domain_fields_for<I, S>(&self, names: I) -> BTreeSet<ContactField>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_ascii_uppercase())
            .collect();

        self.mappings()
            .filter(|m| m.property_names().iter().any(|p| names.iter().any(|n| n == p)))
            .flat_map(|m| m.domain_fields().iter().copied())
            .collect()
    }

    /// Property names owned by the mappings that write any of `fields`.
    pub fn property_names_for(
        &self,
        fields: impl IntoIterator<Item = ContactField>,
    ) -> BTreeSet<&'static str> {
        let fields: Vec<ContactField> = fields.into_iter().collect();

        self.mappings()
            .filter(|m| m.domain_fields().iter().any(|f| fields.contains(f)))
            .flat_map(|m| m.property_names().iter().copied())
            .collect()
    }
}

/// Collects mappings for a [`MappingRegistry`].
pub struct MappingRegistryBuilder {
    mappings: Vec<Box<dyn FieldMapping>>,
}

impl MappingRegistryBuilder {
    #[must_use]
    pub fn register(mut self, mapping: impl FieldMapping + 'static) -> Self {
        self.mappings.push(Box::new(mapping));
        self
    }

    #[must_use]
    pub fn build(self) -> MappingRegistry {
        tracing::debug!(count = self.mappings.len(), "Built mapping registry");
        MappingRegistry {
            mappings: self.mappings,
        }
    }
}
