use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::traits::{BlobStore, BoxReader};

/// Longest accepted file extension for a generated blob name.
const MAX_EXTENSION_LEN: usize = 8;

/// Filesystem-backed, name-addressed blob store.
///
/// All blobs live flat in `{base_path}`; writes go through a temp file in
/// `{base_path}/.tmp` and are renamed into place so a partially written
/// file is never visible under its final name.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `base_path`.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Generate a fresh blob name: UUIDv7 plus the sanitized extension of
    /// the declared upload filename.
    fn generate_name(declared_name: &str) -> String {
        let id = uuid::Uuid::now_v7();
        match sanitized_extension(declared_name) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }

    fn blob_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_blob_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn store(&self, data: &[u8], declared_name: &str) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let name = Self::generate_name(declared_name);
        let blob_path = self.blob_path(&name)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(name)
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(name)?;
        Ok(fs::try_exists(&blob_path).await?)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(name)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, name: &str) -> Result<BoxReader, StorageError> {
        let blob_path = self.blob_path(name)?;
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &str) -> Result<u64, StorageError> {
        let blob_path = self.blob_path(name)?;
        match fs::metadata(&blob_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject any blob name that could escape the uploads directory.
fn validate_blob_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("empty name".into()));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    if name.starts_with('.') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Lowercased alphanumeric extension of a declared filename, if usable.
fn sanitized_extension(declared_name: &str) -> Option<String> {
    let (_, ext) = declared_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}
