//! Filesystem provider trait.
//!
//! The path-addressed contract host glue calls into. Reads take `&self`;
//! mutations take `&mut self`, leaving it to the caller to serialize them.

use memfs_types::{Capabilities, DirEntry, EntryStat, RenameOptions, WriteOptions};

use super::VfsResult;
use super::path::MemPath;

/// Core filesystem operations.
///
/// Implementations check every precondition before mutating, so an `Err`
/// means the tree is exactly as it was before the call.
pub trait FileSystemProvider {
    // ========================================================================
    // Metadata
    // ========================================================================

    /// Capabilities to declare at registration.
    fn capabilities(&self) -> Capabilities;

    /// Get entry metadata.
    fn stat(&self, path: &MemPath) -> VfsResult<EntryStat>;

    // ========================================================================
    // Reading
    // ========================================================================

    /// List a directory's children as `(name, kind)` pairs.
    fn read_directory(&self, path: &MemPath) -> VfsResult<Vec<DirEntry>>;

    /// Read a whole file.
    fn read_file(&self, path: &MemPath) -> VfsResult<Vec<u8>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create or replace a file, as allowed by `options`.
    fn write_file(&mut self, path: &MemPath, content: &[u8], options: WriteOptions)
    -> VfsResult<()>;

    /// Create an empty directory. The parent must already exist.
    fn create_directory(&mut self, path: &MemPath) -> VfsResult<()>;

    /// Delete an entry; directories are removed with everything under them.
    fn delete(&mut self, path: &MemPath) -> VfsResult<()>;

    /// Move an entry, optionally replacing whatever is at `to`.
    fn rename(&mut self, from: &MemPath, to: &MemPath, options: RenameOptions) -> VfsResult<()>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if a path exists.
    fn exists(&self, path: &MemPath) -> bool {
        self.stat(path).is_ok()
    }
}
