use std::io;

/// Errors from blob storage and image transformation.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The key cannot be mapped onto the backend.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// I/O error in a file-backed store.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Blob options could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend cannot be reached or refused the request.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    /// The bytes are not an image the transformer understands.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("blob store lock poisoned")]
    LockPoisoned,
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
