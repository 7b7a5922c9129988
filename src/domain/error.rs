use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// File extension is not one of the accepted tabular formats.
    #[error("{0}")]
    UnsupportedFormat(String),

    /// File exists but its content cannot be read as a table.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A static resource required at startup is absent.
    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    #[error("Invalid knowledge base corpus: {0}")]
    InvalidCorpus(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error was caused by what the user sent rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::UnsupportedFormat(_) | AppError::ParseError(_) | AppError::ValidationError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
