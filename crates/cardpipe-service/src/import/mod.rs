//! Pull-based vCard import.
//!
//! ## Summary
//! [`ImportIterator`] yields one [`ImportedContact`] per framed record. Each
//! pull moves through [`ImportState::Decoding`] and [`ImportState::Mapping`]
//! to [`ImportState::Ready`]; the end of input leaves it
//! [`ImportState::Exhausted`], a stream failure [`ImportState::Failed`].
//! Record-level problems never stop the import; they travel as warnings on
//! the record they concern.

mod iterator;
mod original;
mod source;

#[cfg(test)]
mod iterator_tests;

pub use iterator::{ImportIterator, ImportState, ImportedContact, MergeLookup};
pub use original::{RetainedOriginal, generate_etag};
pub use source::{CardSource, DecodedRecord, FramedCardSource};
