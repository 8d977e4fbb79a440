use thiserror::Error;

/// Command-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ImportError(#[from] cardpipe_service::error::ImportError),

    #[error(transparent)]
    ExportError(#[from] cardpipe_service::error::ExportError),

    #[error(transparent)]
    CoreError(#[from] cardpipe_core::error::CoreError),

    #[error("Invalid contact JSON on line {line}: {source}")]
    ContactJson {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
