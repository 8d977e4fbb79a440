use std::io::{self, Write};

use cardpipe_io::{RecordBody, SpillSink};
use sha2::{Digest, Sha256};

/// ## Summary
/// Generates a strong `ETag` from canonical bytes.
///
/// The result is the quoted hex SHA-256 digest.
#[must_use]
pub fn generate_etag(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("\"{}\"", hex::encode(digest))
}

/// Re-serialized copy of an imported card.
#[derive(Debug)]
pub struct RetainedOriginal {
    body: RecordBody,
    etag: String,
}

impl RetainedOriginal {
    /// Stores `serialized` in a spill sink, moving it to disk past `spill_threshold` bytes.
    ///
    /// ## Errors
    /// Returns an error if the temporary file cannot be written.
    pub fn store(serialized: &str, spill_threshold: usize) -> io::Result<Self> {
        let mut sink = SpillSink::new(spill_threshold);
        sink.write_all(serialized.as_bytes())?;
        Ok(Self {
            body: sink.finish()?,
            etag: generate_etag(serialized.as_bytes()),
        })
    }

    /// Quoted hex SHA-256 of the stored bytes.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Whether the copy lives in a temporary file.
    #[must_use]
    pub fn is_spilled(&self) -> bool {
        matches!(self.body, RecordBody::File { .. })
    }

    /// ## Errors
    /// Returns an error if a spilled copy cannot be read back.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        self.body.into_bytes()
    }
}
