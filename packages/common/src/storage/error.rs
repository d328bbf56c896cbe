use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The blob name is not a valid flat filename.
    #[error("invalid blob name: {0}")]
    InvalidName(String),
    /// The blob exceeds the configured size limit.
    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
