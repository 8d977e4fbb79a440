//! Byte-level plumbing for streaming vCard import.
//!
//! - [`BoundedReader`] caps how many bytes a stream may deliver.
//! - [`SpillSink`] buffers a record in memory and moves it to a temporary
//!   file once it grows past a threshold.
//! - [`RecordFramer`] splits a stream into one raw record per `BEGIN`/`END`
//!   component.

pub mod bounded;
pub mod framer;
pub mod sink;

#[cfg(test)]
mod framer_tests;

pub use bounded::{BoundedReader, SizeExceeded, SizeLimit};
pub use framer::{FramerOptions, FramingFailure, RawRecord, RecordFramer, RecordText, TextEncoding};
pub use sink::{RecordBody, SpillSink};
