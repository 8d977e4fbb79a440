use std::io::Read;
use std::sync::Arc;

use cardpipe_rfc::vcard::{SerializeOptions, VCard, serialize_with, validate};

use super::original::RetainedOriginal;
use super::source::{CardSource, DecodedRecord, FramedCardSource};
use crate::contact::Contact;
use crate::error::ImportError;
use crate::mapping::MappingRegistry;
use crate::parameters::ConversionParameters;
use crate::warning::Warning;

/// Finds an existing contact to update, by UID.
pub type MergeLookup = Box<dyn FnMut(&str) -> Option<Contact> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    /// Nothing pulled yet.
    Idle,
    Decoding,
    Mapping,
    /// The last pull produced a contact.
    Ready,
    /// End of input reached.
    Exhausted,
    /// A stream failure ended the import.
    Failed,
    Closed,
}

impl ImportState {
    /// Whether no further contacts can be pulled.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Closed)
    }
}

/// One imported record.
#[derive(Debug)]
pub struct ImportedContact {
    pub contact: Contact,
    /// Decoder, mapping and validation warnings, in that order.
    pub warnings: Vec<Warning>,
    /// Present when originals are retained and the card re-serialized cleanly.
    pub original: Option<RetainedOriginal>,
    pub uid_hint: Option<String>,
}

/// Lazily converts a card stream into contacts.
///
/// ## Summary
/// Each call to `next` decodes, maps, validates and optionally retains one
/// record. A stream failure is returned once as `Err` and ends iteration.
/// [`ImportIterator::close`] releases the stream early; dropping the iterator
/// does the same.
pub struct ImportIterator<S: CardSource> {
    source: Option<S>,
    registry: Arc<MappingRegistry>,
    params: ConversionParameters,
    merge_lookup: Option<MergeLookup>,
    state: ImportState,
    imported: u64,
}

impl<R: Read> ImportIterator<FramedCardSource<R>> {
    /// Imports from a byte stream.
    #[must_use]
    pub fn from_reader(reader: R, registry: Arc<MappingRegistry>, params: ConversionParameters) -> Self {
        let source = FramedCardSource::new(reader, &params);
        Self::new(source, registry, params)
    }
}

impl<S: CardSource> ImportIterator<S> {
    #[must_use]
    pub fn new(source: S, registry: Arc<MappingRegistry>, params: ConversionParameters) -> Self {
        Self {
            source: Some(source),
            registry,
            params,
            merge_lookup: None,
            state: ImportState::Idle,
            imported: 0,
        }
    }

    /// Maps each card onto the contact `lookup` returns for its UID, instead
    /// of a fresh one.
    #[must_use]
    pub fn with_merge_lookup(
        mut self,
        lookup: impl FnMut(&str) -> Option<Contact> + Send + 'static,
    ) -> Self {
        self.merge_lookup = Some(Box::new(lookup));
        self
    }

    #[must_use]
    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Contacts produced so far.
    #[must_use]
    pub fn imported(&self) -> u64 {
        self.imported
    }

    #[must_use]
    pub fn params(&self) -> &ConversionParameters {
        &self.params
    }

    /// The underlying source, until it is released.
    #[must_use]
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Releases the stream. Later pulls return `None`; repeated calls do nothing.
    pub fn close(&mut self) {
        if self.state == ImportState::Closed {
            return;
        }
        self.release();
        tracing::debug!(imported = self.imported, "Import closed");
        self.state = ImportState::Closed;
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(record = self.imported + 1))]
    fn pull(&mut self) -> Result<Option<ImportedContact>, ImportError> {
        self.state = ImportState::Decoding;
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        let Some(DecodedRecord {
            card,
            mut warnings,
            uid_hint,
        }) = source.next_card()?
        else {
            return Ok(None);
        };

        self.state = ImportState::Mapping;
        let target = match (self.merge_lookup.as_mut(), card.uid().or(uid_hint.as_deref())) {
            (Some(lookup), Some(uid)) => lookup(uid),
            _ => None,
        };
        if target.is_some() {
            tracing::debug!(uid = card.uid(), "Merging into existing contact");
        }

        let (contact, mapping_warnings) = self.registry.import_into(&card, target, &self.params);
        warnings.extend(mapping_warnings);

        if !self.params.skip_validation {
            warnings.extend(validate(&card, card.version).iter().map(Warning::validation));
        }

        let original = if self.params.retain_original {
            self.retain(&card, &mut warnings)?
        } else {
            None
        };

        self.imported += 1;
        Ok(Some(ImportedContact {
            contact,
            warnings,
            original,
            uid_hint,
        }))
    }

    fn retain(
        &self,
        card: &VCard,
        warnings: &mut Vec<Warning>,
    ) -> Result<Option<RetainedOriginal>, ImportError> {
        let options = SerializeOptions::default().strict(true);
        match serialize_with(std::slice::from_ref(card), &options) {
            Ok(serialized) => RetainedOriginal::store(&serialized, self.params.spill_threshold)
                .map(Some)
                .map_err(ImportError::RetentionIo),
            Err(err) => {
                tracing::warn!(error = %err, "Original record not retained");
                warnings.push(Warning::original_not_stored(&err));
                Ok(None)
            }
        }
    }
}

impl<S: CardSource> Iterator for ImportIterator<S> {
    type Item = Result<ImportedContact, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }

        match self.pull() {
            Ok(Some(imported)) => {
                self.state = ImportState::Ready;
                Some(Ok(imported))
            }
            Ok(None) => {
                self.state = ImportState::Exhausted;
                self.release();
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "Import stopped");
                self.state = ImportState::Failed;
                self.release();
                Some(Err(err))
            }
        }
    }
}

impl<S: CardSource> Drop for ImportIterator<S> {
    fn drop(&mut self) {
        self.close();
    }
}
