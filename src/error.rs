//! Error types for the cover fixer

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur while fixing or resolving covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverErrorKind {
    /// The scan root is missing or not a directory
    InvalidRoot,
    /// File or directory not found
    NotFound,
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// I/O error during file operations
    IoError,
    /// Copying an image candidate to the cover file failed
    CopyFailed,
    /// The copied cover does not match its source
    VerifyFailed,
    /// The file browser could not be started
    BrowserLaunch,
    /// An unresolved list file could not be parsed
    ListFormat,
}

/// Represents an error that occurred while processing a directory
#[derive(Debug, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct CoverError {
    /// The kind of error
    pub kind: CoverErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl CoverError {
    /// Create a new cover error
    pub fn new(kind: CoverErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create an invalid root error
    pub fn invalid_root(path: PathBuf) -> Self {
        Self::new(
            CoverErrorKind::InvalidRoot,
            Some(path.clone()),
            format!("Not a directory: {}", path.display()),
        )
    }

    /// Create a not found error
    pub fn not_found(path: PathBuf) -> Self {
        Self::new(
            CoverErrorKind::NotFound,
            Some(path.clone()),
            format!("Not found: {}", path.display()),
        )
    }

    /// Create an I/O error
    pub fn io_error(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(CoverErrorKind::IoError, path, message)
    }

    /// Create a copy failure for `source` -> `target`
    pub fn copy_failed(source: PathBuf, target: PathBuf, message: impl Into<String>) -> Self {
        Self::new(
            CoverErrorKind::CopyFailed,
            Some(target.clone()),
            format!(
                "Copying {} to {} failed: {}",
                source.display(),
                target.display(),
                message.into()
            ),
        )
    }

    /// Create a verification failure for a copied cover
    pub fn verify_failed(target: PathBuf) -> Self {
        Self::new(
            CoverErrorKind::VerifyFailed,
            Some(target.clone()),
            format!("Copied cover differs from its source: {}", target.display()),
        )
    }

    /// Create a browser launch error
    pub fn browser_launch(path: PathBuf, program: &str, message: impl Into<String>) -> Self {
        Self::new(
            CoverErrorKind::BrowserLaunch,
            Some(path),
            format!("Could not run {}: {}", program, message.into()),
        )
    }

    /// Create a list format error
    pub fn list_format(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(CoverErrorKind::ListFormat, Some(path), message)
    }

    /// Attach a path to an error that has none
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }
}

impl From<std::io::Error> for CoverError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => CoverErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => CoverErrorKind::NotFound,
            _ => CoverErrorKind::IoError,
        };
        Self::new(kind, None, err.to_string())
    }
}

impl From<walkdir::Error> for CoverError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf());
        let kind = if err.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied)
        {
            CoverErrorKind::PermissionDenied
        } else {
            CoverErrorKind::IoError
        };
        Self::new(kind, path, err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CoverError>;
