//! Typed identifiers for filesystem entries.
//!
//! `EntryId` wraps a UUIDv7 (time-ordered, globally unique), so an id minted
//! by one store can never collide with another store's ids in the same
//! process. Ids are assigned at creation and survive renames; they are never
//! reused after the entry is destroyed. The `short()` form (first 8 hex
//! chars) is for log lines and human-facing output only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a single entry (file or directory).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for display only.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for EntryId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl From<EntryId> for uuid::Uuid {
    fn from(id: EntryId) -> uuid::Uuid {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full UUID with hyphens for log readability
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.short())
    }
}
