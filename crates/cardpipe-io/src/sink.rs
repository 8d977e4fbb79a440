//! Append-only byte sink that spills to a temporary file.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Collects bytes in memory until `threshold` is passed, then moves them to an
/// anonymous temporary file and keeps appending there.
///
/// The temporary file is unlinked on creation and released on drop.
#[derive(Debug)]
pub struct SpillSink {
    threshold: usize,
    storage: Storage,
}

#[derive(Debug)]
enum Storage {
    Memory(Vec<u8>),
    File { file: File, len: u64 },
}

impl SpillSink {
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            storage: Storage::Memory(Vec::new()),
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        match &self.storage {
            Storage::Memory(bytes) => bytes.len() as u64,
            Storage::File { len, .. } => *len,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the contents moved to a temporary file.
    #[must_use]
    pub fn is_spilled(&self) -> bool {
        matches!(self.storage, Storage::File { .. })
    }

    /// Closes the sink and returns its contents.
    ///
    /// ## Errors
    /// Returns an error if the temporary file cannot be flushed or rewound.
    pub fn finish(self) -> io::Result<RecordBody> {
        match self.storage {
            Storage::Memory(bytes) => Ok(RecordBody::Memory(bytes)),
            Storage::File { mut file, len } => {
                file.flush()?;
                file.seek(SeekFrom::Start(0))?;
                Ok(RecordBody::File { file, len })
            }
        }
    }

    fn spill(&mut self, pending: &[u8]) -> io::Result<()> {
        let Storage::Memory(bytes) = &self.storage else {
            return Ok(());
        };

        let mut file = tempfile::tempfile()?;
        file.write_all(bytes)?;
        file.write_all(pending)?;
        let len = (bytes.len() + pending.len()) as u64;

        tracing::debug!(bytes = len, threshold = self.threshold, "Spilled buffer to temporary file");
        self.storage = Storage::File { file, len };
        Ok(())
    }
}

impl Write for SpillSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Storage::Memory(bytes) = &self.storage
            && bytes.len() + buf.len() > self.threshold
        {
            self.spill(buf)?;
            return Ok(buf.len());
        }

        match &mut self.storage {
            Storage::Memory(bytes) => bytes.extend_from_slice(buf),
            Storage::File { file, len } => {
                file.write_all(buf)?;
                *len += buf.len() as u64;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.storage {
            Storage::Memory(_) => Ok(()),
            Storage::File { file, .. } => file.flush(),
        }
    }
}

/// Finished contents of a [`SpillSink`].
#[derive(Debug)]
pub enum RecordBody {
    Memory(Vec<u8>),
    /// Rewound temporary file holding `len` bytes.
    File { file: File, len: u64 },
}

impl RecordBody {
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::Memory(bytes) => bytes.len() as u64,
            Self::File { len, .. } => *len,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the whole body into memory.
    ///
    /// ## Errors
    /// Returns an error if the temporary file cannot be read.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Memory(bytes) => Ok(bytes),
            Self::File { mut file, len } => {
                let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    /// Returns a reader over the body without loading a spilled file.
    #[must_use]
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        match self {
            Self::Memory(bytes) => Box::new(Cursor::new(bytes)),
            Self::File { file, .. } => Box::new(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_writes_stay_in_memory() {
        let mut sink = SpillSink::new(16);
        sink.write_all(b"hello").unwrap();
        sink.write_all(b" world").unwrap();

        assert!(!sink.is_spilled());
        assert_eq!(sink.len(), 11);
        assert_eq!(sink.finish().unwrap().into_bytes().unwrap(), b"hello world");
    }

    #[test]
    fn passing_threshold_spills_and_keeps_order() {
        let mut sink = SpillSink::new(8);
        sink.write_all(b"0123456").unwrap();
        assert!(!sink.is_spilled());

        sink.write_all(b"789").unwrap();
        assert!(sink.is_spilled());
        sink.write_all(b"abc").unwrap();

        let body = sink.finish().unwrap();
        assert!(matches!(body, RecordBody::File { len: 13, .. }));
        assert_eq!(body.into_bytes().unwrap(), b"0123456789abc");
    }

    #[test]
    fn spilled_body_streams() {
        let mut sink = SpillSink::new(0);
        sink.write_all(b"streamed").unwrap();

        let mut text = String::new();
        sink.finish()
            .unwrap()
            .into_reader()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "streamed");
    }
}
