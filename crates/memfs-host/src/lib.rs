//! # memfs-host
//!
//! Host-side glue for the memfs provider.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`registration`] | Scheme and declared capabilities |
//! | [`host_fs`] | URI facade with read-only enforcement |
//! | [`sample`] | Sample tree seeding and the `initialized` latch |
//! | [`documents`] | Uppercased `.backing.html` mirrors of open `.txt` documents |
//! | [`session`] | Line command interpreter used by the `memfs` binary |

pub mod documents;
pub mod host_fs;
pub mod registration;
pub mod sample;
pub mod session;

pub use documents::VirtualDocuments;
pub use host_fs::HostFs;
pub use registration::Registration;
pub use sample::{SampleWorkspace, WorkspaceFolder};
pub use session::{Flow, Session, describe_change};
