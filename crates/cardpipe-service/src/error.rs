use std::io;

use cardpipe_io::{FramingFailure, SizeExceeded};
use cardpipe_rfc::vcard::BuildError;
use thiserror::Error;

use crate::contact::ContactField;

/// A field mapping could not convert its data. Reported as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{property} holds {found}, which this field cannot use")]
    UnexpectedValue {
        property: String,
        found: &'static str,
    },

    #[error("{field} cannot be written in vCard {target}: {reason}")]
    Unrepresentable {
        field: ContactField,
        target: &'static str,
        reason: String,
    },

    #[error("invalid {field}: {message}")]
    Invalid { field: ContactField, message: String },
}

/// Fatal import failure. The iterator stops after returning one.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    SizeExceeded(#[from] SizeExceeded),

    #[error("failed to read import stream: {0}")]
    FramingIo(#[source] io::Error),

    #[error("failed to store original record: {0}")]
    RetentionIo(#[source] io::Error),
}

impl From<FramingFailure> for ImportError {
    fn from(failure: FramingFailure) -> Self {
        match failure {
            FramingFailure::SizeExceeded(exceeded) => Self::SizeExceeded(exceeded),
            FramingFailure::Io(err) => Self::FramingIo(err),
        }
    }
}

/// Fatal export failure; no output is produced.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Build(#[from] BuildError),
}
