use thiserror::Error;

/// Errors outside the parser and serializer, which carry their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RfcError {
    #[error("Unsupported vCard version: {0}")]
    UnsupportedVersion(String),
}
