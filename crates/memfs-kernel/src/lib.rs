//! # memfs-kernel
//!
//! An in-memory hierarchical filesystem with debounced change notification.
//!
//! - [`vfs`] holds the entry store, paths and errors, and the
//!   [`FileSystemProvider`] contract.
//! - [`changes`] batches change records and delivers them to listeners.
//! - [`MemFs`] ties the two together: each successful mutation updates the
//!   tree synchronously and queues its records for the next flush.
//!
//! Store calls never block or suspend; only notification is deferred.

pub mod changes;
pub mod config;
pub mod memfs;
pub mod vfs;

pub use changes::{
    ChangeBatch, ChangeKind, ChangeNotifier, DEFAULT_DEBOUNCE, FileChange, ListenerHandle,
};
pub use config::{ConfigError, MemfsConfig};
pub use memfs::MemFs;
pub use vfs::{
    EntryStore, ErrorKind, FileSystemProvider, MemPath, MemUri, VfsError, VfsResult,
};

pub use memfs_types::{
    Capabilities, DirEntry, EntryId, EntryStat, FileType, RenameOptions, WriteOptions,
};
