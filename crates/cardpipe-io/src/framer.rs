//! Splits a byte stream into raw `BEGIN`/`END` records.

use std::io::{self, BufRead, BufReader, Read, Write};

use cardpipe_core::constants::{
    DEFAULT_FLUSH_THRESHOLD_BYTES, DEFAULT_SPILL_THRESHOLD_BYTES, VCARD_COMPONENT,
};

use crate::bounded::SizeExceeded;
use crate::sink::{RecordBody, SpillSink};

/// Framing configuration.
#[derive(Debug, Clone)]
pub struct FramerOptions {
    /// Component whose `BEGIN:` line opens a record.
    pub component: String,
    /// Line buffer size that triggers a flush into the spill sink.
    pub flush_threshold: usize,
    /// Bytes a record may hold in memory before spilling to disk.
    pub spill_threshold: usize,
}

impl Default for FramerOptions {
    fn default() -> Self {
        Self {
            component: VCARD_COMPONENT.to_string(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD_BYTES,
            spill_threshold: DEFAULT_SPILL_THRESHOLD_BYTES,
        }
    }
}

impl FramerOptions {
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    #[must_use]
    pub fn with_flush_threshold(mut self, bytes: usize) -> Self {
        self.flush_threshold = bytes;
        self
    }

    #[must_use]
    pub fn with_spill_threshold(mut self, bytes: usize) -> Self {
        self.spill_threshold = bytes;
        self
    }
}

/// Stream failure that ended framing.
#[derive(Debug, thiserror::Error)]
pub enum FramingFailure {
    #[error(transparent)]
    SizeExceeded(#[from] SizeExceeded),

    #[error("failed to read record stream: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for FramingFailure {
    fn from(err: io::Error) -> Self {
        match SizeExceeded::from_io(&err) {
            Some(exceeded) => Self::SizeExceeded(exceeded),
            None => Self::Io(err),
        }
    }
}

/// How [`RawRecord::into_text`] decoded the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// Body was not valid UTF-8 and was read as ISO-8859-1.
    Latin1,
}

/// Decoded record text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// One complete component, from its `BEGIN:` line through the matching `END:`.
#[derive(Debug)]
pub struct RawRecord {
    body: RecordBody,
    uid_hint: Option<String>,
}

impl RawRecord {
    /// Value of the first top-level `UID:` line, trimmed.
    #[must_use]
    pub fn uid_hint(&self) -> Option<&str> {
        self.uid_hint.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (RecordBody, Option<String>) {
        (self.body, self.uid_hint)
    }

    /// ## Errors
    /// Returns an error if a spilled body cannot be read back.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        self.body.into_bytes()
    }

    /// Reads the body as text, falling back to ISO-8859-1 when it is not
    /// valid UTF-8.
    ///
    /// ## Errors
    /// Returns an error if a spilled body cannot be read back.
    pub fn into_text(self) -> io::Result<RecordText> {
        let bytes = self.body.into_bytes()?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => RecordText {
                text,
                encoding: TextEncoding::Utf8,
            },
            Err(err) => RecordText {
                text: err.as_bytes().iter().copied().map(char::from).collect(),
                encoding: TextEncoding::Latin1,
            },
        })
    }
}

/// Record under construction.
struct Pending {
    lines: Vec<u8>,
    sink: SpillSink,
    uid_hint: Option<String>,
    depth: usize,
}

/// Yields one [`RawRecord`] per top-level component in a byte stream.
///
/// ## Summary
/// Lines outside a component are ignored. Inside one, every `BEGIN:` line
/// deepens nesting and every `END:` line closes a level, so nested components
/// stay inside their parent record. Accumulated lines flush into a
/// [`SpillSink`] once they pass `flush_threshold`.
///
/// A read error ends iteration; [`RecordFramer::take_failure`] returns it. A
/// component still open at end of input is dropped and counted.
pub struct RecordFramer<R> {
    reader: BufReader<R>,
    options: FramerOptions,
    begin_marker: String,
    line: Vec<u8>,
    failure: Option<FramingFailure>,
    finished: bool,
    emitted: u64,
    discarded_partial: u64,
}

impl<R: Read> RecordFramer<R> {
    #[must_use]
    pub fn new(reader: R, options: FramerOptions) -> Self {
        let begin_marker = format!("BEGIN:{}", options.component);
        Self {
            reader: BufReader::new(reader),
            options,
            begin_marker,
            line: Vec::new(),
            failure: None,
            finished: false,
            emitted: 0,
            discarded_partial: 0,
        }
    }

    /// Takes the failure that ended framing, if any.
    pub fn take_failure(&mut self) -> Option<FramingFailure> {
        self.failure.take()
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Records completed so far.
    #[must_use]
    pub fn records_emitted(&self) -> u64 {
        self.emitted
    }

    /// Components left open at end of input.
    #[must_use]
    pub fn discarded_partial_records(&self) -> u64 {
        self.discarded_partial
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    fn read_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        if !self.line.ends_with(b"\n") {
            self.line.push(b'\n');
        }
        Ok(true)
    }

    fn next_record(&mut self) -> Result<Option<RawRecord>, FramingFailure> {
        let mut pending: Option<Pending> = None;

        while self.read_line()? {
            let trimmed = self.line.trim_ascii();

            let Some(record) = pending.as_mut() else {
                if trimmed.eq_ignore_ascii_case(self.begin_marker.as_bytes()) {
                    let mut record = Pending {
                        lines: Vec::new(),
                        sink: SpillSink::new(self.options.spill_threshold),
                        uid_hint: None,
                        depth: 1,
                    };
                    record.lines.extend_from_slice(&self.line);
                    pending = Some(record);
                } else if !trimmed.is_empty() {
                    tracing::trace!(bytes = self.line.len(), "Skipping line outside record");
                }
                continue;
            };

            if starts_with_ignore_case(trimmed, b"BEGIN:") {
                record.depth += 1;
            } else if starts_with_ignore_case(trimmed, b"END:") {
                record.depth = record.depth.saturating_sub(1);
            } else if record.depth == 1
                && record.uid_hint.is_none()
                && starts_with_ignore_case(trimmed, b"UID:")
            {
                let uid = String::from_utf8_lossy(&trimmed[4..]).trim().to_string();
                record.uid_hint = Some(uid);
            }

            record.lines.extend_from_slice(&self.line);
            if record.lines.len() > self.options.flush_threshold {
                record.sink.write_all(&record.lines)?;
                record.lines.clear();
            }

            if record.depth == 0 {
                let Some(mut record) = pending.take() else {
                    break;
                };
                record.sink.write_all(&record.lines)?;
                let body = record.sink.finish()?;
                return Ok(Some(RawRecord {
                    body,
                    uid_hint: record.uid_hint,
                }));
            }
        }

        if let Some(record) = pending {
            self.discarded_partial += 1;
            tracing::warn!(
                component = %self.options.component,
                bytes = record.sink.len() + record.lines.len() as u64,
                depth = record.depth,
                "Discarding record left open at end of input"
            );
        }

        Ok(None)
    }
}

fn starts_with_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

impl<R: Read> Iterator for RecordFramer<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => {
                self.emitted += 1;
                tracing::trace!(
                    index = self.emitted,
                    bytes = record.len(),
                    uid = record.uid_hint(),
                    "Framed record"
                );
                Some(record)
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(failure) => {
                tracing::error!(%failure, "Record framing stopped");
                self.failure = Some(failure);
                self.finished = true;
                None
            }
        }
    }
}
