//! Provider registration.
//!
//! A provider is registered once under a URI scheme together with its
//! capabilities. After that the host only talks to it through
//! [`HostFs`](crate::HostFs).

use memfs_kernel::MemfsConfig;
use memfs_types::Capabilities;
use serde::Serialize;

/// What the host declared when it registered a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// URI scheme, e.g. `memfs`.
    pub scheme: String,
    /// Declared capabilities. `case_sensitive` is always true.
    pub capabilities: Capabilities,
}

impl Registration {
    /// Register under `scheme`.
    pub fn new(scheme: impl Into<String>, read_only: bool) -> Self {
        let capabilities = if read_only {
            Capabilities::read_only()
        } else {
            Capabilities::writable()
        };
        Self {
            scheme: scheme.into(),
            capabilities,
        }
    }

    /// Registration described by a config file.
    pub fn from_config(config: &MemfsConfig) -> Self {
        Self::new(config.scheme.clone(), config.read_only)
    }

    /// URI of the provider's root, e.g. `memfs:/`.
    pub fn root_uri(&self) -> String {
        format!("{}:/", self.scheme)
    }
}
