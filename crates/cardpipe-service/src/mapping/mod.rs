//! Field mappings between [`Contact`] fields and vCard properties.
//!
//! Each [`FieldMapping`] owns a set of property names and a set of contact
//! fields and converts between them in both directions. The
//! [`MappingRegistry`] runs mappings in registration order and turns their
//! failures into warnings.

mod registry;
mod standard;


use cardpipe_rfc::vcard::{VCard, VCardVersion};

pub use registry::{MappingRegistry, MappingRegistryBuilder};

use crate::contact::{Contact, ContactField};
use crate::error::MappingError;
use crate::parameters::ConversionParameters;
use crate::warning::Warning;

/// Converts one group of contact fields to and from vCard properties.
///
/// ## Summary
/// `import` reads the properties named by `property_names` from a card and
/// writes `domain_fields` on the contact. `export` does the reverse; the
/// registry removes every owned property from the card before calling it.
///
/// Problems with a single value should be reported through
/// [`MappingContext::warn`] so the remaining values still convert. Returning
/// an error abandons the whole mapping for this record.
pub trait FieldMapping: Send + Sync {
    /// Name used as the subject of this mapping's warnings.
    fn name(&self) -> &'static str;

    /// Properties this mapping reads and writes, uppercase.
    fn property_names(&self) -> &'static [&'static str];

    fn domain_fields(&self) -> &'static [ContactField];

    /// ## Errors
    /// Returns an error if the owned properties cannot be converted.
    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError>;

    /// ## Errors
    /// Returns an error if the owned fields cannot be written in `ctx.version`.
    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError>;

    /// Whether the allow-list in `params` selects this mapping.
    fn is_selected(&self, params: &ConversionParameters) -> bool {
        params.fields.is_none() || self.property_names().iter().any(|name| params.allows(name))
    }
}

/// State shared with mappings while one record converts.
pub struct MappingContext<'a> {
    /// Version of the card being read, or the export target version.
    pub version: VCardVersion,
    pub params: &'a ConversionParameters,
    subject: &'static str,
    warnings: Vec<Warning>,
}

impl<'a> MappingContext<'a> {
    #[must_use]
    pub fn new(version: VCardVersion, params: &'a ConversionParameters) -> Self {
        Self {
            version,
            params,
            subject: "",
            warnings: Vec::new(),
        }
    }

    /// Records a non-fatal problem against the running mapping.
    pub fn warn(&mut self, cause: impl std::fmt::Display) {
        tracing::debug!(mapping = self.subject, %cause, "Mapping skipped a value");
        self.warnings.push(Warning::conversion_failed(self.subject, cause));
    }

    #[must_use]
    pub fn is_v3(&self) -> bool {
        self.version == VCardVersion::V3
    }

    fn enter(&mut self, subject: &'static str) {
        self.subject = subject;
    }

    fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
