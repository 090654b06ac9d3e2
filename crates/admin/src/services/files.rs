//! Uploaded file storage.
//!
//! Product images and user avatars are written below the media root and
//! referenced by their public path (`/media/<folder>/<file>`), which is what
//! the database stores.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;

/// Public URL prefix under which the media root is served.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Accepted file extensions.
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Errors from storing or removing uploaded files.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file extension is not an accepted image format.
    #[error("unsupported file format '{0}'. Supported: png, jpg, jpeg, webp, gif")]
    UnsupportedFormat(String),

    /// The file exceeds the configured size limit.
    #[error("file too large ({size} bytes). Maximum size is {max} bytes")]
    TooLarge {
        /// Size of the rejected upload.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// The upload carried no bytes.
    #[error("file is empty")]
    Empty,

    /// The stored path does not point inside the media root.
    #[error("invalid media path: {0}")]
    InvalidPath(String),

    /// Filesystem error.
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Target folder below the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    /// Product images.
    Products,
    /// User avatars.
    Avatars,
}

impl MediaFolder {
    /// Directory name below the media root.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Avatars => "avatar",
        }
    }
}

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, used only for its extension.
    pub file_name: String,
    /// File contents.
    pub bytes: Bytes,
}

/// Storage backend for uploaded files.
pub trait FileStorage: Send + Sync {
    /// Store a file and return its public path.
    fn upload(
        &self,
        folder: MediaFolder,
        file: &UploadedFile,
    ) -> impl Future<Output = Result<String, FileError>> + Send;

    /// Remove a previously stored file by its public path.
    ///
    /// Removing a file that no longer exists is not an error.
    fn delete(&self, public_path: &str) -> impl Future<Output = Result<(), FileError>> + Send;
}

/// File storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalFileStorage {
    /// Create a storage rooted at the configured media directory.
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.dir.clone(),
            max_bytes: config.max_upload_bytes,
        }
    }

    /// The directory served under [`MEDIA_URL_PREFIX`].
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a public path back to a location below the root.
    fn resolve(&self, public_path: &str) -> Result<PathBuf, FileError> {
        let relative = public_path
            .strip_prefix(MEDIA_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| FileError::InvalidPath(public_path.to_owned()))?;

        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(FileError::InvalidPath(public_path.to_owned()));
        }

        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalFileStorage {
    async fn upload(&self, folder: MediaFolder, file: &UploadedFile) -> Result<String, FileError> {
        let ext = validate_upload(file, self.max_bytes)?;

        let dir = self.root.join(folder.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(dir.join(&name), &file.bytes).await?;

        tracing::debug!(folder = folder.as_str(), file = %name, size = file.bytes.len(), "Stored upload");
        Ok(format!("{MEDIA_URL_PREFIX}/{}/{name}", folder.as_str()))
    }

    async fn delete(&self, public_path: &str) -> Result<(), FileError> {
        let path = self.resolve(public_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %public_path, "Stored file already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Check size and extension, returning the normalized extension.
fn validate_upload(file: &UploadedFile, max_bytes: usize) -> Result<String, FileError> {
    if file.bytes.is_empty() {
        return Err(FileError::Empty);
    }
    if file.bytes.len() > max_bytes {
        return Err(FileError::TooLarge {
            size: file.bytes.len(),
            max: max_bytes,
        });
    }

    let ext = Path::new(&file.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(FileError::UnsupportedFormat(ext));
    }
    Ok(ext)
}

/// Store every file, returning their public paths in order.
///
/// If one upload fails, the files stored before it are removed again.
///
/// # Errors
///
/// Returns the `FileError` of the first upload that failed.
pub async fn store_uploads<S: FileStorage>(
    storage: &S,
    folder: MediaFolder,
    files: &[UploadedFile],
) -> Result<Vec<String>, FileError> {
    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        match storage.upload(folder, file).await {
            Ok(path) => paths.push(path),
            Err(e) => {
                discard_uploads(storage, &paths).await;
                return Err(e);
            }
        }
    }
    Ok(paths)
}

/// Remove files uploaded during a request that failed afterwards.
pub async fn discard_uploads<S: FileStorage>(storage: &S, paths: &[String]) {
    for path in paths {
        if let Err(e) = storage.delete(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove orphaned upload");
        }
    }
}
