use super::path::{mask_matches, PathParts};
use super::types::{AccessMode, ContentEncoding, DirHandle, FileHandle};
use crate::error::StorageError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

/// Directory and file operations used to persist photos.
///
/// Every operation completes with an explicit result. Multi-step operations
/// are not rolled back when a later step fails.
#[derive(Debug, Clone, Default)]
pub struct StorageHelper;

impl StorageHelper {
    pub fn new() -> Self {
        Self
    }

    /// Split a path string into directory and file name
    pub fn path_parts(&self, path: &str) -> PathParts {
        PathParts::new(path)
    }

    /// Open a directory with the given access mode
    pub async fn open_dir(
        &self,
        path: impl AsRef<Path>,
        mode: AccessMode,
    ) -> Result<DirHandle, StorageError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        if !metadata.is_dir() {
            return Err(StorageError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        if mode.is_writable() && metadata.permissions().readonly() {
            return Err(StorageError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }

        debug!("Opened directory {} ({})", path.display(), mode.as_str());
        Ok(DirHandle::new(path.to_path_buf(), mode))
    }

    /// Create a new empty file inside an opened directory
    pub async fn create_file(
        &self,
        dir: &DirHandle,
        file_name: &str,
    ) -> Result<FileHandle, StorageError> {
        dir.ensure_writable()?;

        if file_name.is_empty() || file_name.contains('/') {
            return Err(StorageError::InvalidName {
                name: file_name.to_string(),
            });
        }

        let path = dir.path().join(file_name);
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                error!("Failed to create {}: {}", path.display(), e);
                StorageError::from_io(&path, e)
            })?;

        debug!("Created file {}", path.display());
        FileHandle::resolve(&path).await
    }

    /// Replace the content of an existing file
    pub async fn write_file(
        &self,
        handle: &FileHandle,
        content: &str,
        encoding: ContentEncoding,
    ) -> Result<FileHandle, StorageError> {
        let bytes: Cow<'_, [u8]> = match encoding {
            ContentEncoding::Text => Cow::Borrowed(content.as_bytes()),
            ContentEncoding::Base64 => Cow::Owned(STANDARD.decode(content).map_err(|e| {
                StorageError::InvalidEncoding {
                    details: e.to_string(),
                }
            })?),
        };

        let mut stream = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&handle.path)
            .await
            .map_err(|e| StorageError::from_io(&handle.path, e))?;

        // A failure past this point can leave the file truncated
        stream
            .write_all(&bytes)
            .await
            .map_err(|e| StorageError::from_io(&handle.path, e))?;
        stream
            .flush()
            .await
            .map_err(|e| StorageError::from_io(&handle.path, e))?;

        debug!("Wrote {} bytes to {}", bytes.len(), handle.path.display());
        FileHandle::resolve(&handle.path).await
    }

    /// Resolve a named entry inside an opened directory
    pub async fn resolve(
        &self,
        dir: &DirHandle,
        file_name: &str,
    ) -> Result<FileHandle, StorageError> {
        if file_name.is_empty() {
            return Err(StorageError::NotFound {
                path: dir.path().to_path_buf(),
            });
        }
        FileHandle::resolve(&dir.path().join(file_name)).await
    }

    /// List the entries of an opened directory whose names match `mask`
    pub async fn list_files(
        &self,
        dir: &DirHandle,
        mask: Option<&str>,
    ) -> Result<Vec<FileHandle>, StorageError> {
        let mut entries = fs::read_dir(dir.path())
            .await
            .map_err(|e| StorageError::from_io(dir.path(), e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(dir.path(), e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(mask) = mask {
                if !mask_matches(mask, &name) {
                    continue;
                }
            }

            match FileHandle::resolve(&entry.path()).await {
                Ok(handle) => files.push(handle),
                // Entry vanished between listing and lookup
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Open `path` read-only and list the entries matching `mask`
    pub async fn dir(
        &self,
        path: impl AsRef<Path>,
        mask: Option<&str>,
    ) -> Result<Vec<FileHandle>, StorageError> {
        let dir = self.open_dir(path, AccessMode::Read).await.map_err(|e| {
            error!("Failed to open directory for listing: {}", e);
            e
        })?;
        self.list_files(&dir, mask).await
    }

    /// Write `content` to a new file at `path`: open the parent directory,
    /// create the file, then write it.
    pub async fn save_file_content(
        &self,
        path: &str,
        content: &str,
        encoding: ContentEncoding,
    ) -> Result<FileHandle, StorageError> {
        let parts = self.path_parts(path);

        if content.is_empty() {
            warn!("Refusing to save empty content to {}", path);
            return Err(StorageError::EmptyContent {
                path: PathBuf::from(path),
            });
        }

        let dir = self.open_dir(&parts.dir_name, AccessMode::ReadWrite).await?;
        let handle = self.create_file(&dir, &parts.file_name).await?;
        let handle = self.write_file(&handle, content, encoding).await?;

        info!("Saved {}", handle.path.display());
        Ok(handle)
    }

    /// Delete the file or directory at `path`. A missing target is a success.
    pub async fn delete_node(&self, path: &str) -> Result<(), StorageError> {
        let parts = self.path_parts(path);

        let dir = match self.open_dir(&parts.dir_name, AccessMode::ReadWrite).await {
            Ok(dir) => dir,
            Err(e) if e.is_not_found() => {
                debug!("Parent of {} does not exist, nothing to delete", path);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let listed = self.list_files(&dir, Some(&parts.file_name)).await?;
        let Some(entry) = listed.into_iter().find(|f| f.name == parts.file_name) else {
            debug!("{} does not exist, nothing to delete", path);
            return Ok(());
        };

        if entry.is_directory {
            self.delete_directory(&dir, &entry.path, false).await
        } else {
            self.delete_file(&dir, &entry.path).await
        }
    }

    /// Delete a file that lives directly inside `dir`
    pub async fn delete_file(&self, dir: &DirHandle, path: &Path) -> Result<(), StorageError> {
        dir.ensure_writable()?;
        dir.ensure_contains(path)?;

        fs::remove_file(path).await.map_err(|e| {
            error!("Failed to delete file {}: {}", path.display(), e);
            StorageError::from_io(path, e)
        })?;

        debug!("Deleted file {}", path.display());
        Ok(())
    }

    /// Delete a directory that lives directly inside `dir`
    pub async fn delete_directory(
        &self,
        dir: &DirHandle,
        path: &Path,
        recursive: bool,
    ) -> Result<(), StorageError> {
        dir.ensure_writable()?;
        dir.ensure_contains(path)?;

        let result = if recursive {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_dir(path).await
        };

        result.map_err(|e| {
            error!("Failed to delete directory {}: {}", path.display(), e);
            StorageError::from_io(path, e)
        })?;

        debug!("Deleted directory {}", path.display());
        Ok(())
    }

    /// Check whether `path` resolves inside its parent directory. Any failure,
    /// including a missing parent, reports `false`.
    pub async fn file_exists(&self, path: &str) -> bool {
        let parts = self.path_parts(path);

        let dir = match self.open_dir(&parts.dir_name, AccessMode::Read).await {
            Ok(dir) => dir,
            Err(e) => {
                debug!("Existence check for {} failed: {}", path, e);
                return false;
            }
        };

        self.resolve(&dir, &parts.file_name).await.is_ok()
    }
}
