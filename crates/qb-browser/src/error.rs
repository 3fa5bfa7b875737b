//! Error types for qb-browser

use thiserror::Error;

/// qb-browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    #[error("Browser connection failed: {0}")]
    Connection(String),

    #[error("Tab error: {0}")]
    TabError(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),
}

impl From<BrowserError> for qb_core::Error {
    fn from(err: BrowserError) -> Self {
        qb_core::Error::Extraction(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;
