//! URI-addressed facade over a registered provider.
//!
//! The host addresses entries as `scheme:/path`. [`HostFs`] strips the
//! scheme, rejects URIs for other schemes, and enforces the declared
//! read-only capability before anything reaches the provider. The provider
//! itself never checks read-only; code holding it directly (the sample
//! commands) can still mutate a read-only registration.

use memfs_kernel::{FileSystemProvider, MemPath, MemUri, VfsError, VfsResult};
use memfs_types::{DirEntry, EntryStat, RenameOptions, WriteOptions};

use crate::registration::Registration;

/// A provider as seen by the host.
#[derive(Debug)]
pub struct HostFs<P> {
    registration: Registration,
    provider: P,
}

impl<P: FileSystemProvider> HostFs<P> {
    /// Register `provider` with explicitly declared capabilities.
    pub fn new(registration: Registration, provider: P) -> Self {
        tracing::info!(
            scheme = %registration.scheme,
            read_only = registration.capabilities.read_only,
            "registered filesystem provider"
        );
        Self {
            registration,
            provider,
        }
    }

    /// Register `provider` under `scheme`, declaring its own capabilities.
    pub fn register(scheme: impl Into<String>, provider: P) -> Self {
        let registration = Registration {
            scheme: scheme.into(),
            capabilities: provider.capabilities(),
        };
        Self::new(registration, provider)
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Direct provider access. Bypasses the read-only check.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Resolve a URI string to a provider path.
    pub fn resolve(&self, uri: &str) -> VfsResult<MemPath> {
        let uri = MemUri::parse(uri)?;
        if uri.scheme() != self.registration.scheme {
            return Err(VfsError::invalid_path(format!(
                "scheme {} is not registered: {uri}",
                uri.scheme()
            )));
        }
        Ok(uri.into_path())
    }

    /// Format a provider path as a URI under this registration.
    pub fn uri_for(&self, path: &MemPath) -> MemUri {
        MemUri::new(self.registration.scheme.clone(), path.clone())
    }

    fn writable(&self, uri: &str) -> VfsResult<MemPath> {
        let path = self.resolve(uri)?;
        if self.registration.capabilities.read_only {
            return Err(VfsError::no_permissions(uri));
        }
        Ok(path)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn stat(&self, uri: &str) -> VfsResult<EntryStat> {
        self.provider.stat(&self.resolve(uri)?)
    }

    pub fn read_directory(&self, uri: &str) -> VfsResult<Vec<DirEntry>> {
        self.provider.read_directory(&self.resolve(uri)?)
    }

    pub fn read_file(&self, uri: &str) -> VfsResult<Vec<u8>> {
        self.provider.read_file(&self.resolve(uri)?)
    }

    // ========================================================================
    // Mutations (rejected with NoPermissions when read-only)
    // ========================================================================

    pub fn write_file(&mut self, uri: &str, content: &[u8], options: WriteOptions) -> VfsResult<()> {
        let path = self.writable(uri)?;
        self.provider.write_file(&path, content, options)
    }

    pub fn create_directory(&mut self, uri: &str) -> VfsResult<()> {
        let path = self.writable(uri)?;
        self.provider.create_directory(&path)
    }

    pub fn delete(&mut self, uri: &str) -> VfsResult<()> {
        let path = self.writable(uri)?;
        self.provider.delete(&path)
    }

    pub fn rename(&mut self, from: &str, to: &str, options: RenameOptions) -> VfsResult<()> {
        let from_path = self.writable(from)?;
        let to_path = self.writable(to)?;
        self.provider.rename(&from_path, &to_path, options)
    }
}
