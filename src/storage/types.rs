use crate::error::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Access mode a directory is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// `"r"`: listing and lookups only
    Read,
    /// `"rw"`: entries may be created and deleted
    #[default]
    ReadWrite,
}

impl AccessMode {
    /// Parse a platform mode string; anything other than `"r"` opens read-write
    pub fn from_mode_str(mode: &str) -> Self {
        match mode {
            "r" => AccessMode::Read,
            _ => AccessMode::ReadWrite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::ReadWrite => "rw",
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, AccessMode::ReadWrite)
    }
}

/// How string content is turned into file bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentEncoding {
    /// Write the UTF-8 bytes of the string
    #[default]
    Text,
    /// Decode the string as standard base64 and write the bytes
    Base64,
}

/// An opened directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirHandle {
    path: PathBuf,
    mode: AccessMode,
}

impl DirHandle {
    pub(crate) fn new(path: PathBuf, mode: AccessMode) -> Self {
        Self { path, mode }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub(crate) fn ensure_writable(&self) -> Result<(), StorageError> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(StorageError::ReadOnly {
                path: self.path.clone(),
            })
        }
    }

    pub(crate) fn ensure_contains(&self, path: &Path) -> Result<(), StorageError> {
        if path.parent() == Some(self.path.as_path()) {
            Ok(())
        } else {
            Err(StorageError::OutsideDirectory {
                path: path.to_path_buf(),
                dir: self.path.clone(),
            })
        }
    }
}

/// A resolved filesystem entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
    pub is_directory: bool,
    pub created: DateTime<Utc>,
}

impl FileHandle {
    /// Resolve an existing entry
    pub async fn resolve(path: &Path) -> Result<Self, StorageError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;

        // Not every filesystem records a birth time
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_directory: metadata.is_dir(),
            created,
        })
    }

    /// Directory holding the entry
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    pub fn to_uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
