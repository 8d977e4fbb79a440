//! Batch vCard export.

use std::sync::Arc;

use cardpipe_core::constants::PRODID;
use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{SerializeOptions, VCard, VCardProperty, serialize_with};

use crate::contact::Contact;
use crate::error::ExportError;
use crate::mapping::MappingRegistry;
use crate::parameters::ConversionParameters;
use crate::warning::Warning;

/// A contact to export, optionally merged onto a template card.
#[derive(Debug, Clone, Copy)]
pub struct ExportItem<'a> {
    pub contact: &'a Contact,
    pub template: Option<&'a VCard>,
}

impl<'a> From<&'a Contact> for ExportItem<'a> {
    fn from(contact: &'a Contact) -> Self {
        Self {
            contact,
            template: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExportOutput {
    /// Serialized cards, CRLF line endings.
    pub bytes: Vec<u8>,
    /// Mapping warnings across all cards, in card order.
    pub warnings: Vec<Warning>,
    pub count: usize,
}

/// Builds cards from contacts and serializes them together.
#[derive(Debug, Clone)]
pub struct ExportAssembler {
    registry: Arc<MappingRegistry>,
    params: ConversionParameters,
}

impl ExportAssembler {
    #[must_use]
    pub fn new(registry: Arc<MappingRegistry>, params: ConversionParameters) -> Self {
        Self { registry, params }
    }

    /// ## Summary
    /// Maps every item to a card of the configured version, stamps it with
    /// `PRODID` and serializes the batch.
    ///
    /// ## Errors
    /// Returns an error in strict mode when a card holds a property the target
    /// version does not define or a malformed property name. Nothing is
    /// written in that case.
    #[tracing::instrument(skip_all, fields(version = %self.params.version, strict = self.params.strict))]
    pub fn export<'a, I>(&self, items: I) -> Result<ExportOutput, ExportError>
    where
        I: IntoIterator,
        I::Item: Into<ExportItem<'a>>,
    {
        let mut cards = Vec::new();
        let mut warnings = Vec::new();

        for item in items {
            let item = item.into();
            let (mut card, card_warnings) =
                self.registry
                    .export_from(item.contact, item.template, &self.params);
            card.remove_properties(names::PRODID);
            card.add_property(VCardProperty::text(names::PRODID, PRODID));
            warnings.extend(card_warnings);
            cards.push(card);
        }

        let options = SerializeOptions::default()
            .with_version(self.params.version)
            .strict(self.params.strict);
        let text = serialize_with(&cards, &options)?;

        tracing::debug!(count = cards.len(), bytes = text.len(), "Exported contacts");
        Ok(ExportOutput {
            bytes: text.into_bytes(),
            warnings,
            count: cards.len(),
        })
    }
}
