use std::io::Read;

use cardpipe_io::{BoundedReader, RecordFramer, TextEncoding};
use cardpipe_rfc::vcard::{DecodeOptions, VCard, decode};

use crate::error::ImportError;
use crate::parameters::ConversionParameters;
use crate::warning::Warning;

/// One decoded record with the diagnostics produced while decoding it.
#[derive(Debug)]
pub struct DecodedRecord {
    pub card: VCard,
    pub warnings: Vec<Warning>,
    /// First top-level UID seen by the framer, before decoding.
    pub uid_hint: Option<String>,
}

/// Produces decoded cards one at a time.
pub trait CardSource {
    /// Returns the next record, or `None` at the end of input.
    ///
    /// ## Errors
    /// Returns an error when the underlying stream fails; no further records
    /// follow it.
    fn next_card(&mut self) -> Result<Option<DecodedRecord>, ImportError>;

    /// Releases the underlying stream. Must be safe to call more than once.
    fn close(&mut self) {}
}

/// [`CardSource`] over a byte stream: bounded read, record framing and
/// lenient decoding.
pub struct FramedCardSource<R> {
    framer: Option<RecordFramer<BoundedReader<R>>>,
    decode_options: DecodeOptions,
}

impl<R: Read> FramedCardSource<R> {
    #[must_use]
    pub fn new(reader: R, params: &ConversionParameters) -> Self {
        let bounded = BoundedReader::new(reader, params.max_size);
        Self {
            framer: Some(RecordFramer::new(bounded, params.framer_options())),
            decode_options: DecodeOptions::default()
                .with_default_version(params.version)
                .with_unknown_property_reports(params.strict),
        }
    }

    /// Bytes read from the stream so far.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.framer
            .as_ref()
            .map_or(0, |framer| framer.get_ref().consumed())
    }

    /// Records left open at the end of input.
    #[must_use]
    pub fn discarded_partial_records(&self) -> u64 {
        self.framer
            .as_ref()
            .map_or(0, RecordFramer::discarded_partial_records)
    }
}

impl<R: Read> CardSource for FramedCardSource<R> {
    fn next_card(&mut self) -> Result<Option<DecodedRecord>, ImportError> {
        let Some(framer) = self.framer.as_mut() else {
            return Ok(None);
        };

        let Some(raw) = framer.next() else {
            return match framer.take_failure() {
                Some(failure) => Err(failure.into()),
                None => Ok(None),
            };
        };

        let uid_hint = raw.uid_hint().map(ToOwned::to_owned);
        let text = raw.into_text().map_err(ImportError::FramingIo)?;

        let mut warnings = Vec::new();
        if text.encoding == TextEncoding::Latin1 {
            warnings.push(Warning::latin1_fallback());
        }

        let mut decoded = decode(&text.text, &self.decode_options);
        warnings.extend(decoded.warnings.iter().map(Warning::parser));

        if decoded.cards.len() > 1 {
            tracing::warn!(count = decoded.cards.len(), "Record decoded into several cards; keeping the first");
        }
        let card = if decoded.cards.is_empty() {
            VCard::with_version(self.decode_options.default_version)
        } else {
            decoded.cards.swap_remove(0)
        };

        Ok(Some(DecodedRecord {
            card,
            warnings,
            uid_hint,
        }))
    }

    fn close(&mut self) {
        if let Some(framer) = self.framer.take() {
            tracing::debug!(
                records = framer.records_emitted(),
                bytes = framer.get_ref().consumed(),
                "Closed import stream"
            );
        }
    }
}
