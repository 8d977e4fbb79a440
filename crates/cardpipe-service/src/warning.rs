//! Non-fatal diagnostics attached to one imported or exported record.

use std::fmt;

use cardpipe_rfc::vcard::{ParseWarning, ValidationIssue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A field mapping failed; the field was left as it was.
    ConversionFailed,
    /// The decoder skipped or kept uninterpreted part of the record.
    Parser,
    /// The decoded card does not conform to its version.
    Validation,
    /// The original record could not be retained.
    OriginalNotStored,
}

/// A non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Mapping name or property the warning concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Warning {
    #[must_use]
    pub fn conversion_failed(subject: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self {
            kind: WarningKind::ConversionFailed,
            subject: Some(subject.into()),
            message: cause.to_string(),
            code: None,
        }
    }

    #[must_use]
    pub fn parser(warning: &ParseWarning) -> Self {
        Self {
            kind: WarningKind::Parser,
            subject: warning.property.clone(),
            message: format!("line {}: {}", warning.line, warning.message),
            code: Some(warning.kind.code().to_string()),
        }
    }

    #[must_use]
    pub fn validation(issue: &ValidationIssue) -> Self {
        Self {
            kind: WarningKind::Validation,
            subject: Some(issue.property.clone()),
            message: issue.message.clone(),
            code: Some(issue.code.to_string()),
        }
    }

    #[must_use]
    pub fn original_not_stored(cause: impl fmt::Display) -> Self {
        Self {
            kind: WarningKind::OriginalNotStored,
            subject: None,
            message: cause.to_string(),
            code: None,
        }
    }

    /// Record bytes were not UTF-8 and were read as ISO-8859-1.
    #[must_use]
    pub fn latin1_fallback() -> Self {
        Self {
            kind: WarningKind::Parser,
            subject: None,
            message: "record is not valid UTF-8; decoded as ISO-8859-1".to_string(),
            code: Some("non-utf8-input".to_string()),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            WarningKind::ConversionFailed => "conversion failed",
            WarningKind::Parser => "parser",
            WarningKind::Validation => "validation",
            WarningKind::OriginalNotStored => "original not stored",
        };
        match &self.subject {
            Some(subject) => write!(f, "{kind} ({subject}): {}", self.message),
            None => write!(f, "{kind}: {}", self.message),
        }
    }
}
