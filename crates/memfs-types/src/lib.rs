//! Shared identity and metadata types for memfs.
//!
//! A leaf crate with no internal memfs dependencies: entry ids, entry kinds,
//! `stat` results, directory listings and the option structs passed to
//! mutating calls.
//!
//! |------------------|-----------------------------------------|
//! | Type             | Purpose                                 |
//! |------------------|-----------------------------------------|
//! | [`EntryId`]      | Stable, process-unique entry identity   |
//! | [`FileType`]     | File or directory                       |
//! | [`EntryStat`]    | Metadata returned by `stat`             |
//! | [`DirEntry`]     | One row of a directory listing          |
//! | [`WriteOptions`] | `create` / `overwrite` flags for writes |
//! | [`RenameOptions`]| `overwrite` flag for renames            |
//! | [`Capabilities`] | Declared once at provider registration  |
//! |------------------|-----------------------------------------|

pub mod entry;
pub mod ids;

pub use entry::{Capabilities, DirEntry, EntryStat, FileType, RenameOptions, WriteOptions};
pub use ids::EntryId;
