//! Error types for qb-core

use thiserror::Error;

/// Main error type for qb-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Answer provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for qb-core
pub type Result<T> = std::result::Result<T, Error>;
