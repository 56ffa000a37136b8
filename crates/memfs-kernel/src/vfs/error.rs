//! VFS error types.

use std::io;
use thiserror::Error;

/// Plain error category, for callers that branch on the failure without
/// caring about the path payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    IsADirectory,
    AlreadyExists,
    NoPermissions,
    InvalidPath,
}

/// VFS error type.
///
/// Every error is raised by a precondition check before the tree is touched,
/// so a failed call never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// File or directory not found (or an intermediate segment is a file).
    #[error("not found: {0}")]
    NotFound(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Path already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Mutation rejected by a read-only registration. Never raised by the store.
    #[error("no permissions: {0}")]
    NoPermissions(String),

    /// Malformed URI, operation on the root, or a rename into its own subtree.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    /// Create a NoPermissions error.
    pub fn no_permissions(path: impl Into<String>) -> Self {
        Self::NoPermissions(path.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// The error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotADirectory(_) => ErrorKind::NotADirectory,
            Self::IsADirectory(_) => ErrorKind::IsADirectory,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NoPermissions(_) => ErrorKind::NoPermissions,
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
        }
    }

    /// The path (or URI) the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::IsADirectory(p)
            | Self::AlreadyExists(p)
            | Self::NoPermissions(p)
            | Self::InvalidPath(p) => p,
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::AlreadyExists(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::NoPermissions(msg) => io::Error::new(io::ErrorKind::PermissionDenied, msg),
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
