//! vCard import and export pipeline.
//!
//! ## Import
//!
//! [`import::ImportIterator`] pulls one [`contact::Contact`] at a time out of
//! a byte stream. Each pull frames one record, decodes it, maps it through the
//! [`mapping::MappingRegistry`] and validates it. Problems with a single record
//! become [`warning::Warning`]s on that record; only stream failures end the
//! import.
//!
//! ## Export
//!
//! [`export::ExportAssembler`] maps contacts back into cards, optionally on top
//! of template cards, and serializes them in one pass.

pub mod contact;
pub mod error;
pub mod export;
pub mod import;
pub mod mapping;
pub mod parameters;
pub mod warning;

pub use contact::{Contact, ContactField};
pub use error::{ExportError, ImportError, MappingError};
pub use export::{ExportAssembler, ExportItem, ExportOutput};
pub use import::{CardSource, FramedCardSource, ImportIterator, ImportState, ImportedContact};
pub use mapping::{FieldMapping, MappingContext, MappingRegistry};
pub use parameters::ConversionParameters;
pub use warning::{Warning, WarningKind};
