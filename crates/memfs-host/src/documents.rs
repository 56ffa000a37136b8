//! Virtual backing documents.
//!
//! Opening a `.txt` document mirrors its text, uppercased, into
//! `/<basename>.backing.html` on the provider. Edits to a tracked document
//! rewrite the mirror; closing it deletes the mirror. Like the sample
//! commands, this talks to the provider directly.
//!
//! Documents are keyed by their host path, which need not live on memfs.
//! Two tracked documents with the same basename share one backing file.

use std::collections::HashSet;

use memfs_kernel::{FileSystemProvider, MemPath, MemUri, VfsResult};
use memfs_types::WriteOptions;

const TRACKED_EXTENSION: &str = ".txt";
const BACKING_SUFFIX: &str = ".backing.html";

/// Tracks open documents and their backing files.
#[derive(Debug, Default, Clone)]
pub struct VirtualDocuments {
    tracked: HashSet<String>,
}

impl VirtualDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider path of the mirror for `document`.
    pub fn backing_path(document: &str) -> MemPath {
        let base = MemPath::parse(document)
            .name()
            .map(str::to_owned)
            .unwrap_or_default();
        MemPath::root().join(&format!("{base}{BACKING_SUFFIX}"))
    }

    /// The mirror's URI under `scheme`.
    pub fn backing_uri(scheme: &str, document: &str) -> MemUri {
        MemUri::new(scheme, Self::backing_path(document))
    }

    pub fn is_tracked(&self, document: &str) -> bool {
        self.tracked.contains(document)
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Start mirroring `document`. Returns false, writing nothing, for
    /// non-`.txt` documents and documents already tracked.
    pub fn open<P: FileSystemProvider>(
        &mut self,
        fs: &mut P,
        document: &str,
        text: &str,
    ) -> VfsResult<bool> {
        if !document.ends_with(TRACKED_EXTENSION) || self.is_tracked(document) {
            return Ok(false);
        }
        self.tracked.insert(document.to_string());
        self.mirror(fs, document, text)?;
        tracing::debug!(document, "tracking document");
        Ok(true)
    }

    /// Replace the mirror of a tracked document with `text`, uppercased.
    /// Returns false for untracked documents.
    pub fn update<P: FileSystemProvider>(
        &mut self,
        fs: &mut P,
        document: &str,
        text: &str,
    ) -> VfsResult<bool> {
        if !self.is_tracked(document) {
            return Ok(false);
        }
        self.mirror(fs, document, text)?;
        Ok(true)
    }

    /// Stop mirroring `document` and delete its backing file. Returns false
    /// for untracked documents.
    pub fn close<P: FileSystemProvider>(&mut self, fs: &mut P, document: &str) -> VfsResult<bool> {
        if !self.tracked.remove(document) {
            return Ok(false);
        }
        fs.delete(&Self::backing_path(document))?;
        tracing::debug!(document, "released document");
        Ok(true)
    }

    fn mirror<P: FileSystemProvider>(&self, fs: &mut P, document: &str, text: &str) -> VfsResult<()> {
        fs.write_file(
            &Self::backing_path(document),
            text.to_uppercase().as_bytes(),
            WriteOptions::upsert(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memfs_kernel::{ErrorKind, MemFs};

    #[test]
    fn test_backing_path() {
        assert_eq!(
            VirtualDocuments::backing_path("/home/me/notes.txt").to_string(),
            "/notes.txt.backing.html"
        );
        assert_eq!(
            VirtualDocuments::backing_uri("memfs", "notes.txt").to_string(),
            "memfs:/notes.txt.backing.html"
        );
    }

    #[test]
    fn test_open_mirrors_uppercased() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        assert!(docs.open(&mut fs, "/work/a.txt", "hello, wörld").unwrap());
        assert!(docs.is_tracked("/work/a.txt"));
        assert_eq!(
            fs.read_file(&MemPath::parse("/a.txt.backing.html")).unwrap(),
            "HELLO, WÖRLD".as_bytes()
        );
    }

    #[test]
    fn test_open_skips_other_extensions() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        assert!(!docs.open(&mut fs, "/work/a.md", "text").unwrap());
        assert!(!docs.open(&mut fs, "/work/txt", "text").unwrap());
        assert_eq!(docs.tracked_count(), 0);
        assert!(fs.read_directory(&MemPath::root()).unwrap().is_empty());
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        assert!(docs.open(&mut fs, "/a.txt", "first").unwrap());
        assert!(!docs.open(&mut fs, "/a.txt", "second").unwrap());
        assert_eq!(docs.tracked_count(), 1);
        assert_eq!(
            fs.read_file(&MemPath::parse("/a.txt.backing.html")).unwrap(),
            b"FIRST"
        );
    }

    #[test]
    fn test_update_only_tracked() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        assert!(!docs.update(&mut fs, "/a.txt", "x").unwrap());
        assert!(!fs.exists(&MemPath::parse("/a.txt.backing.html")));

        docs.open(&mut fs, "/a.txt", "x").unwrap();
        assert!(docs.update(&mut fs, "/a.txt", "edited").unwrap());
        assert_eq!(
            fs.read_file(&MemPath::parse("/a.txt.backing.html")).unwrap(),
            b"EDITED"
        );
    }

    #[test]
    fn test_close_deletes_backing_file() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        assert!(!docs.close(&mut fs, "/a.txt").unwrap());

        docs.open(&mut fs, "/a.txt", "x").unwrap();
        assert!(docs.close(&mut fs, "/a.txt").unwrap());
        assert!(!docs.is_tracked("/a.txt"));
        assert!(!fs.exists(&MemPath::parse("/a.txt.backing.html")));

        // Reopening mirrors again.
        assert!(docs.open(&mut fs, "/a.txt", "y").unwrap());
    }

    #[test]
    fn test_close_after_backing_removed_reports_not_found() {
        let mut fs = MemFs::new();
        let mut docs = VirtualDocuments::new();
        docs.open(&mut fs, "/a.txt", "x").unwrap();
        fs.delete(&MemPath::parse("/a.txt.backing.html")).unwrap();

        let err = docs.close(&mut fs, "/a.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!docs.is_tracked("/a.txt"));
    }
}
