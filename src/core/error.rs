use thiserror::Error;

/// Centralized error types for the application
///
/// All errors are converted to this enum for consistent handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// Only `Precondition` ever escapes a batch run; every per-item error is
/// caught at the fetcher boundary and recorded in the item's outcome.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input (URL, size cap, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/transport failure during a direct document fetch
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Failure inside the media-extraction routine (yt-dlp)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid batch request; rejects the whole run before scheduling
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper conversion so strategy code can bail with a plain message
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Transfer(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Transfer(err.to_string())
    }
}
