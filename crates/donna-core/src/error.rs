use thiserror::Error;

/// Top-level error type for Donna.
#[derive(Debug, Error)]
pub enum DonnaError {
    /// Error from the intent or phrasing oracle.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Task store error.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
