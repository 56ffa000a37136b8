//! Entry metadata and operation options.
//!
//! These types are path-free: they describe a single entry or a single call,
//! and are shared between the kernel (which produces them) and host glue
//! (which renders them).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

/// Kind of an entry. The set is closed: there are no symlinks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Entry metadata, as returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStat {
    /// Stable identifier; unchanged by rename.
    pub id: EntryId,
    /// Entry type.
    pub kind: FileType,
    /// Content length in bytes. Always 0 for directories.
    pub size: u64,
    /// Creation time.
    pub ctime: SystemTime,
    /// Last modification time.
    pub mtime: SystemTime,
}

impl EntryStat {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Modification time as Unix milliseconds.
    pub fn mtime_millis(&self) -> u64 {
        unix_millis(self.mtime)
    }

    /// Creation time as Unix milliseconds.
    pub fn ctime_millis(&self) -> u64 {
        unix_millis(self.ctime)
    }
}

fn unix_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}

/// Flags for `write_file`.
///
/// Both default to `false`: a plain write only replaces nothing and creates
/// nothing, so callers must opt in to each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Allow creating the file when it does not exist.
    pub create: bool,
    /// Allow replacing the content of an existing file.
    pub overwrite: bool,
}

impl WriteOptions {
    /// Create only; fail if the file exists.
    pub fn create() -> Self {
        Self {
            create: true,
            overwrite: false,
        }
    }

    /// Replace only; fail if the file is missing.
    pub fn overwrite() -> Self {
        Self {
            create: false,
            overwrite: true,
        }
    }

    /// Create or replace.
    pub fn upsert() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

/// Flags for `rename`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOptions {
    /// Replace an existing entry at the destination.
    pub overwrite: bool,
}

impl RenameOptions {
    /// Replace whatever sits at the destination.
    pub fn overwrite() -> Self {
        Self { overwrite: true }
    }
}

/// Provider capabilities declared once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Path lookup is case-sensitive. Always true for memfs.
    pub case_sensitive: bool,
    /// Host glue rejects mutating calls when set. Not enforced by the store.
    pub read_only: bool,
}

impl Capabilities {
    /// Case-sensitive, writable.
    pub fn writable() -> Self {
        Self {
            case_sensitive: true,
            read_only: false,
        }
    }

    /// Case-sensitive, read-only.
    pub fn read_only() -> Self {
        Self {
            case_sensitive: true,
            read_only: true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::writable()
    }
}
