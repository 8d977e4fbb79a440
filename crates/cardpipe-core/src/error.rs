use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration value for `{key}`: {message}")]
    InvalidConfiguration { key: &'static str, message: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
