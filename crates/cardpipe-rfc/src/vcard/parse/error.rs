use std::fmt;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A problem at one logical (unfolded, 1-based) line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_value(line: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidValue, line, message)
    }

    #[must_use]
    pub fn invalid_date(line: usize, raw: &str) -> Self {
        Self::new(
            ParseErrorKind::InvalidDateTime,
            line,
            format!("cannot interpret '{raw}' as a date or time"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input ended inside a vCard.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Not `[group.]name[;params]:value`.
    #[error("malformed content line")]
    MalformedLine,
    #[error("invalid property name")]
    InvalidPropertyName,
    /// The value does not match its declared or implied type.
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid date/time")]
    InvalidDateTime,
    /// VERSION other than 3.0 or 4.0.
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("nested component")]
    NestedComponent,
    /// Neither defined by a supported version nor an `X-` extension.
    #[error("unknown property")]
    UnknownProperty,
}

impl ParseErrorKind {
    /// Stable kebab-case identifier, carried into warning codes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected-eof",
            Self::MalformedLine => "malformed-line",
            Self::InvalidPropertyName => "invalid-property-name",
            Self::InvalidValue => "invalid-value",
            Self::InvalidDateTime => "invalid-date-time",
            Self::UnsupportedVersion => "unsupported-version",
            Self::NestedComponent => "nested-component",
            Self::UnknownProperty => "unknown-property",
        }
    }
}

/// Something the lenient decoder recovered from by skipping the line or
/// keeping its value uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub property: Option<String>,
    pub message: String,
}

impl ParseWarning {
    #[must_use]
    pub fn for_property(error: ParseError, property: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            ..Self::from(error)
        }
    }
}

impl From<ParseError> for ParseWarning {
    fn from(ParseError { kind, line, message }: ParseError) -> Self {
        Self {
            kind,
            line,
            property: None,
            message,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(property) = &self.property {
            write!(f, " ({property})")?;
        }
        write!(f, ": {}: {}", self.kind, self.message)
    }
}
