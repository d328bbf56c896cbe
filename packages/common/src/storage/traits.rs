use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Name-addressed blob storage for uploaded images.
///
/// Blobs are addressed by a generated filename, not by content: storing the
/// same bytes twice yields two independent blobs. This matches the catalog's
/// ownership rule, where each stored image belongs to at most one record and
/// is deleted together with it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a freshly generated, collision-resistant name.
    ///
    /// `declared_name` is only consulted for its extension; the returned
    /// name is what callers must persist as the blob reference.
    async fn store(&self, data: &[u8], declared_name: &str) -> Result<String, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete a blob by name.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn open(&self, name: &str) -> Result<BoxReader, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, name: &str) -> Result<u64, StorageError>;
}
