//! In-memory virtual filesystem.
//!
//! Key components:
//!
//! - [`FileSystemProvider`] - Path-addressed contract used by host glue
//! - [`EntryStore`] - Arena-backed tree of directories and files
//! - [`MemPath`] / [`MemUri`] - Segment paths and `scheme:/path` addresses
//!
//! ## Design Decisions
//!
//! - **Arena, not pointers**: entries live in one map keyed by [`EntryId`];
//!   directories map child names to ids. No cyclic ownership, and a move is
//!   a re-parent of one id.
//! - **Closed entry set**: a node is a file or a directory and operations
//!   match on that, nothing else.
//! - **Fail before mutating**: every precondition is checked up front.
//!
//! [`EntryId`]: memfs_types::EntryId

mod error;
mod ops;
mod path;
mod store;

pub use error::{ErrorKind, VfsError, VfsResult};
pub use ops::FileSystemProvider;
pub use path::{MemPath, MemUri};
pub(crate) use path::is_valid_scheme;
pub use store::EntryStore;
