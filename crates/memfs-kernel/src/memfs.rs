//! The memfs provider: an [`EntryStore`] wired to a [`ChangeNotifier`].
//!
//! Every successful mutation forwards the store's change records to the
//! notifier, which batches them. Reads go straight to the store.

use memfs_types::{Capabilities, DirEntry, EntryStat, RenameOptions, WriteOptions};

use crate::changes::{ChangeNotifier, FileChange, ListenerHandle};
use crate::config::MemfsConfig;
use crate::vfs::{EntryStore, FileSystemProvider, MemPath, VfsResult};

/// In-memory filesystem with debounced change notification.
#[derive(Debug)]
pub struct MemFs {
    store: EntryStore,
    notifier: ChangeNotifier,
    capabilities: Capabilities,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    /// Empty filesystem, default debounce, writable.
    pub fn new() -> Self {
        Self {
            store: EntryStore::new(),
            notifier: ChangeNotifier::default(),
            capabilities: Capabilities::writable(),
        }
    }

    /// Empty filesystem using the configured debounce and read-only flag.
    pub fn with_config(config: &MemfsConfig) -> Self {
        let capabilities = if config.read_only {
            Capabilities::read_only()
        } else {
            Capabilities::writable()
        };
        Self {
            store: EntryStore::new(),
            notifier: ChangeNotifier::new(config.debounce()),
            capabilities,
        }
    }

    /// The change notifier. Clone it to keep a handle past `self`.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Shorthand for `notifier().on_did_change(..)`.
    pub fn on_did_change<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&[FileChange]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.notifier.on_did_change(listener)
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    fn publish(&self, result: VfsResult<Vec<FileChange>>) -> VfsResult<()> {
        self.notifier.fire(result?);
        Ok(())
    }
}

impl FileSystemProvider for MemFs {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn stat(&self, path: &MemPath) -> VfsResult<EntryStat> {
        self.store.stat(path)
    }

    fn read_directory(&self, path: &MemPath) -> VfsResult<Vec<DirEntry>> {
        self.store.read_directory(path)
    }

    fn read_file(&self, path: &MemPath) -> VfsResult<Vec<u8>> {
        self.store.read_file(path).map(<[u8]>::to_vec)
    }

    fn write_file(
        &mut self,
        path: &MemPath,
        content: &[u8],
        options: WriteOptions,
    ) -> VfsResult<()> {
        let result = self.store.write_file(path, content, options);
        self.publish(result)
    }

    fn create_directory(&mut self, path: &MemPath) -> VfsResult<()> {
        let result = self.store.create_directory(path);
        self.publish(result)
    }

    fn delete(&mut self, path: &MemPath) -> VfsResult<()> {
        let result = self.store.delete(path);
        self.publish(result)
    }

    fn rename(&mut self, from: &MemPath, to: &MemPath, options: RenameOptions) -> VfsResult<()> {
        let result = self.store.rename(from, to, options);
        self.publish(result)
    }

    fn exists(&self, path: &MemPath) -> bool {
        self.store.exists(path)
    }
}
