//! Size-capped byte source.

use std::io::{self, Read};

/// Maximum number of bytes a [`BoundedReader`] may deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeLimit {
    #[default]
    Unbounded,
    Bytes(u64),
}

impl SizeLimit {
    /// Interprets a configured value; zero and negative values mean unbounded.
    #[must_use]
    pub fn from_configured(value: i64) -> Self {
        u64::try_from(value)
            .ok()
            .filter(|bytes| *bytes > 0)
            .map_or(Self::Unbounded, Self::Bytes)
    }

    #[must_use]
    pub const fn bytes(self) -> Option<u64> {
        match self {
            Self::Unbounded => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

impl From<Option<u64>> for SizeLimit {
    fn from(limit: Option<u64>) -> Self {
        limit
            .filter(|bytes| *bytes > 0)
            .map_or(Self::Unbounded, Self::Bytes)
    }
}

/// The stream delivered more bytes than allowed.
///
/// Travels inside an [`io::Error`] of kind [`io::ErrorKind::FileTooLarge`] so
/// it passes through `Read` adapters; recover it with [`SizeExceeded::from_io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("input exceeds the maximum size of {limit} bytes")]
pub struct SizeExceeded {
    pub limit: u64,
    /// Bytes delivered when the limit tripped (at least `limit + 1`).
    pub consumed: u64,
}

impl SizeExceeded {
    /// Wraps this error for the `Read` interface.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::FileTooLarge, self)
    }

    /// Extracts a `SizeExceeded` carried by `err`, if any.
    #[must_use]
    pub fn from_io(err: &io::Error) -> Option<Self> {
        err.get_ref()?.downcast_ref::<Self>().copied()
    }
}

/// Wraps a reader and fails once more than `limit` bytes have been read.
///
/// The byte count is cumulative and only grows. Reads are clamped to the
/// bytes left under the limit, so everything up to byte `limit` is delivered.
/// Only a read made at the limit that finds byte `limit + 1` fails, and a
/// stream of exactly `limit` bytes reads to completion. Once tripped, every
/// later read fails.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    limit: SizeLimit,
    consumed: u64,
    exceeded: bool,
}

impl<R: Read> BoundedReader<R> {
    #[must_use]
    pub fn new(inner: R, limit: impl Into<SizeLimit>) -> Self {
        Self {
            inner,
            limit: limit.into(),
            consumed: 0,
            exceeded: false,
        }
    }

    #[must_use]
    pub fn unbounded(inner: R) -> Self {
        Self::new(inner, SizeLimit::Unbounded)
    }

    /// Discards up to `n` bytes. Skipped bytes count against the limit.
    ///
    /// ## Errors
    /// Returns the inner reader's error, or `SizeExceeded` as an `io::Error`.
    pub fn skip(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut self.by_ref().take(n), &mut io::sink())
    }

    /// Bytes delivered so far.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    #[must_use]
    pub fn limit(&self) -> SizeLimit {
        self.limit
    }

    /// Whether the limit has tripped.
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn exceeded_error(&self, limit: u64) -> io::Error {
        SizeExceeded {
            limit,
            consumed: self.consumed,
        }
        .into_io()
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let SizeLimit::Bytes(limit) = self.limit else {
            let n = self.inner.read(buf)?;
            self.consumed += n as u64;
            return Ok(n);
        };

        if self.exceeded {
            return Err(self.exceeded_error(limit));
        }

        let remaining = limit - self.consumed;
        if remaining > 0 {
            // Never read past the limit, so a read that reaches it still
            // delivers everything below it.
            let window = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
            let n = self.inner.read(&mut buf[..window])?;
            self.consumed += n as u64;
            return Ok(n);
        }

        // At the limit: one more byte means the stream is too large.
        let mut extra = [0_u8; 1];
        if buf.is_empty() || self.inner.read(&mut extra)? == 0 {
            return Ok(0);
        }
        self.consumed += 1;
        self.exceeded = true;
        tracing::warn!(limit, consumed = self.consumed, "Input size limit exceeded");
        Err(self.exceeded_error(limit))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, Cursor};

    use super::*;

    fn read_all<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out)?;
        Ok(out)
    }

    #[test]
    fn landing_exactly_on_the_limit_succeeds() {
        let mut reader = BoundedReader::new(Cursor::new(vec![7_u8; 10]), Some(10));
        assert_eq!(read_all(&mut reader).unwrap().len(), 10);
        assert_eq!(reader.consumed(), 10);
        assert!(!reader.is_exceeded());
    }

    #[test]
    fn eleventh_byte_fails() {
        let mut reader = BoundedReader::new(Cursor::new(vec![7_u8; 11]), Some(10));
        let mut buf = [0_u8; 5];

        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        let err = reader.read(&mut buf).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::FileTooLarge);
        assert_eq!(
            SizeExceeded::from_io(&err),
            Some(SizeExceeded {
                limit: 10,
                consumed: 11
            })
        );
    }

    #[test]
    fn straddling_read_delivers_bytes_below_the_limit() {
        let mut reader = BoundedReader::new(Cursor::new(vec![7_u8; 64]), Some(10));
        let mut buf = [0_u8; 64];

        assert_eq!(reader.read(&mut buf).unwrap(), 10);
        assert!(!reader.is_exceeded());

        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(SizeExceeded::from_io(&err).map(|e| e.consumed), Some(11));
    }

    #[test]
    fn buffered_reader_sees_everything_below_the_limit() {
        let reader = BoundedReader::new(Cursor::new(b"line one\nline two\n".to_vec()), Some(12));
        let mut lines = io::BufReader::new(reader).lines();

        assert_eq!(lines.next().unwrap().unwrap(), "line one");
        let err = lines.next().unwrap().unwrap_err();
        assert!(SizeExceeded::from_io(&err).is_some());
    }

    #[test]
    fn exceeded_is_terminal() {
        let mut reader = BoundedReader::new(Cursor::new(vec![0_u8; 32]), Some(4));
        let mut buf = [0_u8; 8];

        while reader.read(&mut buf).is_ok() {}
        let consumed = reader.consumed();

        for _ in 0..3 {
            let err = reader.read(&mut buf).unwrap_err();
            assert!(SizeExceeded::from_io(&err).is_some());
        }
        assert_eq!(reader.consumed(), consumed);
    }

    #[test]
    fn skip_counts_against_limit() {
        let mut reader = BoundedReader::new(Cursor::new(vec![0_u8; 20]), Some(10));
        assert_eq!(reader.skip(8).unwrap(), 8);
        assert_eq!(reader.consumed(), 8);

        let err = reader.skip(8).unwrap_err();
        assert!(SizeExceeded::from_io(&err).is_some());
    }

    #[test]
    fn unbounded_counts_without_failing() {
        let mut reader = BoundedReader::unbounded(Cursor::new(vec![1_u8; 1000]));
        assert_eq!(read_all(&mut reader).unwrap().len(), 1000);
        assert_eq!(reader.consumed(), 1000);
    }

    #[test]
    fn configured_limits() {
        assert_eq!(SizeLimit::from_configured(0), SizeLimit::Unbounded);
        assert_eq!(SizeLimit::from_configured(-5), SizeLimit::Unbounded);
        assert_eq!(SizeLimit::from_configured(42), SizeLimit::Bytes(42));
    }

    #[test]
    fn zero_byte_limit_means_unbounded() {
        assert_eq!(SizeLimit::from(Some(0)), SizeLimit::Unbounded);
        assert_eq!(SizeLimit::from(None), SizeLimit::Unbounded);
        assert_eq!(SizeLimit::from(Some(3)), SizeLimit::Bytes(3));

        let mut reader = BoundedReader::new(Cursor::new(vec![1_u8; 100]), Some(0));
        assert_eq!(read_all(&mut reader).unwrap().len(), 100);
    }

    #[test]
    fn plain_io_errors_are_not_size_errors() {
        let err = io::Error::other("disk on fire");
        assert_eq!(SizeExceeded::from_io(&err), None);
    }
}
