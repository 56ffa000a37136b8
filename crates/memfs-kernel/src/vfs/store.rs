//! The entry store: an arena-backed tree of directories and files.
//!
//! Nodes live in a single `HashMap<EntryId, Node>`. A directory owns its
//! children by id (`name -> EntryId`) and every node records its parent, so
//! a rename is a re-parent of one id rather than a copy of a subtree.
//!
//! The store is synchronous and single-owner: mutations take `&mut self` and
//! there is no internal locking. Every mutation runs all of its precondition
//! checks before it touches the arena, and returns the change records it
//! produced in the order they happened.

use std::collections::HashMap;
use std::time::SystemTime;

use memfs_types::{DirEntry, EntryId, EntryStat, FileType, RenameOptions, WriteOptions};

use super::error::{VfsError, VfsResult};
use super::path::MemPath;
use crate::changes::FileChange;

#[derive(Debug)]
enum NodeKind {
    File { data: Vec<u8> },
    Directory { children: HashMap<String, EntryId> },
}

#[derive(Debug)]
struct Node {
    id: EntryId,
    parent: Option<EntryId>,
    ctime: SystemTime,
    mtime: SystemTime,
    kind: NodeKind,
}

impl Node {
    fn file(parent: EntryId, data: Vec<u8>, now: SystemTime) -> Self {
        Self {
            id: EntryId::new(),
            parent: Some(parent),
            ctime: now,
            mtime: now,
            kind: NodeKind::File { data },
        }
    }

    fn directory(parent: Option<EntryId>, now: SystemTime) -> Self {
        Self {
            id: EntryId::new(),
            parent,
            ctime: now,
            mtime: now,
            kind: NodeKind::Directory {
                children: HashMap::new(),
            },
        }
    }

    fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::File { .. } => FileType::File,
            NodeKind::Directory { .. } => FileType::Directory,
        }
    }

    fn stat(&self) -> EntryStat {
        let size = match &self.kind {
            NodeKind::File { data } => data.len() as u64,
            NodeKind::Directory { .. } => 0,
        };
        EntryStat {
            id: self.id,
            kind: self.file_type(),
            size,
            ctime: self.ctime,
            mtime: self.mtime,
        }
    }
}

/// In-memory tree of directories and files.
#[derive(Debug)]
pub struct EntryStore {
    root: EntryId,
    nodes: HashMap<EntryId, Node>,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    /// Create a store holding only an empty root directory.
    pub fn new() -> Self {
        let root = Node::directory(None, SystemTime::now());
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            root: root_id,
            nodes,
        }
    }

    /// Id of the root directory.
    pub fn root_id(&self) -> EntryId {
        self.root
    }

    /// Number of live entries, root included.
    pub fn entry_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if `path` resolves.
    pub fn exists(&self, path: &MemPath) -> bool {
        self.resolve(path).is_ok()
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Metadata for the entry at `path`.
    pub fn stat(&self, path: &MemPath) -> VfsResult<EntryStat> {
        let id = self.resolve(path)?;
        Ok(self.node(id, path)?.stat())
    }

    /// Children of the directory at `path`, sorted by name.
    pub fn read_directory(&self, path: &MemPath) -> VfsResult<Vec<DirEntry>> {
        let id = self.resolve(path)?;
        let children = match &self.node(id, path)?.kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => return Err(VfsError::not_a_directory(path.to_string())),
        };

        let mut entries = children
            .iter()
            .map(|(name, child)| {
                let kind = self.node(*child, path)?.file_type();
                Ok(DirEntry::new(name.clone(), kind))
            })
            .collect::<VfsResult<Vec<_>>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Content of the file at `path`.
    pub fn read_file(&self, path: &MemPath) -> VfsResult<&[u8]> {
        let id = self.resolve(path)?;
        match &self.node(id, path)?.kind {
            NodeKind::File { data } => Ok(data),
            NodeKind::Directory { .. } => Err(VfsError::is_a_directory(path.to_string())),
        }
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create or replace the file at `path`.
    pub fn write_file(
        &mut self,
        path: &MemPath,
        content: &[u8],
        options: WriteOptions,
    ) -> VfsResult<Vec<FileChange>> {
        let Some(name) = path.name() else {
            return Err(VfsError::is_a_directory(path.to_string()));
        };
        let parent = self.lookup_parent_directory(path)?;
        let existing = self.child(parent, name, path)?;

        if let Some(id) = existing
            && self.node(id, path)?.file_type().is_dir()
        {
            return Err(VfsError::is_a_directory(path.to_string()));
        }
        match existing {
            None if !options.create => return Err(VfsError::not_found(path.to_string())),
            Some(_) if !options.overwrite => {
                return Err(VfsError::already_exists(path.to_string()));
            }
            _ => {}
        }

        let now = SystemTime::now();
        let change = match existing {
            Some(id) => {
                let node = self.node_mut(id, path)?;
                node.kind = NodeKind::File {
                    data: content.to_vec(),
                };
                node.mtime = now;
                FileChange::Changed {
                    path: path.clone(),
                    id,
                }
            }
            None => {
                let node = Node::file(parent, content.to_vec(), now);
                let id = node.id;
                self.nodes.insert(id, node);
                self.children_mut(parent, path)?.insert(name.to_string(), id);
                FileChange::Created {
                    path: path.clone(),
                    id,
                }
            }
        };
        self.touch(parent, now, path)?;

        tracing::debug!(path = %path, size = content.len(), "wrote file");
        Ok(vec![change])
    }

    /// Create an empty directory at `path`.
    pub fn create_directory(&mut self, path: &MemPath) -> VfsResult<Vec<FileChange>> {
        let Some(name) = path.name() else {
            return Err(VfsError::already_exists(path.to_string()));
        };
        let parent = self.lookup_parent_directory(path)?;
        if self.child(parent, name, path)?.is_some() {
            return Err(VfsError::already_exists(path.to_string()));
        }

        let now = SystemTime::now();
        let node = Node::directory(Some(parent), now);
        let id = node.id;
        self.nodes.insert(id, node);
        self.children_mut(parent, path)?.insert(name.to_string(), id);
        self.touch(parent, now, path)?;

        tracing::debug!(path = %path, "created directory");
        Ok(vec![
            FileChange::Changed {
                path: parent_path(path),
                id: parent,
            },
            FileChange::Created {
                path: path.clone(),
                id,
            },
        ])
    }

    /// Remove the entry at `path`, and its whole subtree for directories.
    pub fn delete(&mut self, path: &MemPath) -> VfsResult<Vec<FileChange>> {
        let Some(name) = path.name() else {
            return Err(VfsError::invalid_path("cannot delete the root"));
        };
        let id = self.resolve(path)?;
        let parent = self.parent_of(id, path)?;

        let now = SystemTime::now();
        self.children_mut(parent, path)?.remove(name);
        let removed = self.remove_subtree(id);
        self.touch(parent, now, path)?;

        tracing::debug!(path = %path, removed, "deleted entry");
        Ok(vec![
            FileChange::Changed {
                path: parent_path(path),
                id: parent,
            },
            FileChange::Deleted {
                path: path.clone(),
                id,
            },
        ])
    }

    /// Move the entry at `from` to `to`, keeping its id.
    ///
    /// With `overwrite`, an existing entry at `to` is destroyed as part of
    /// the same call. All checks run first, so either the whole rename
    /// happens or nothing does.
    pub fn rename(
        &mut self,
        from: &MemPath,
        to: &MemPath,
        options: RenameOptions,
    ) -> VfsResult<Vec<FileChange>> {
        let (Some(from_name), Some(to_name)) = (from.name(), to.name()) else {
            return Err(VfsError::invalid_path("cannot rename the root"));
        };
        let id = self.resolve(from)?;
        let old_parent = self.parent_of(id, from)?;
        let new_parent = self.lookup_parent_directory(to)?;

        if from == to {
            return Ok(Vec::new());
        }
        if to.starts_with(from) {
            return Err(VfsError::invalid_path(format!(
                "cannot move {from} into its own subtree"
            )));
        }

        let existing = self.child(new_parent, to_name, to)?;
        if existing.is_some() {
            if !options.overwrite {
                return Err(VfsError::already_exists(to.to_string()));
            }
            if from.starts_with(to) {
                return Err(VfsError::invalid_path(format!(
                    "cannot replace {to} with its own descendant"
                )));
            }
        }

        let now = SystemTime::now();
        let mut changes = Vec::with_capacity(2);

        if let Some(victim) = existing {
            self.children_mut(new_parent, to)?.remove(to_name);
            self.remove_subtree(victim);
            changes.push(FileChange::Deleted {
                path: to.clone(),
                id: victim,
            });
        }

        self.children_mut(old_parent, from)?.remove(from_name);
        self.children_mut(new_parent, to)?.insert(to_name.to_string(), id);
        self.node_mut(id, from)?.parent = Some(new_parent);
        self.touch(old_parent, now, from)?;
        self.touch(new_parent, now, to)?;

        changes.push(FileChange::Renamed {
            from: from.clone(),
            to: to.clone(),
            id,
        });

        tracing::debug!(from = %from, to = %to, replaced = existing.is_some(), "renamed entry");
        Ok(changes)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Walk `path` from the root. Any missing segment, or a file where a
    /// directory is needed, is NotFound.
    fn resolve(&self, path: &MemPath) -> VfsResult<EntryId> {
        let mut current = self.root;
        for seg in path.segments() {
            current = match &self.node(current, path)?.kind {
                NodeKind::Directory { children } => *children
                    .get(seg)
                    .ok_or_else(|| VfsError::not_found(path.to_string()))?,
                NodeKind::File { .. } => return Err(VfsError::not_found(path.to_string())),
            };
        }
        Ok(current)
    }

    /// Resolve the parent of `path`, which must be a directory.
    fn lookup_parent_directory(&self, path: &MemPath) -> VfsResult<EntryId> {
        let parent = parent_path(path);
        let id = self.resolve(&parent)?;
        match self.node(id, &parent)?.kind {
            NodeKind::Directory { .. } => Ok(id),
            NodeKind::File { .. } => Err(VfsError::not_a_directory(parent.to_string())),
        }
    }

    fn node(&self, id: EntryId, path: &MemPath) -> VfsResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| VfsError::not_found(path.to_string()))
    }

    fn node_mut(&mut self, id: EntryId, path: &MemPath) -> VfsResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| VfsError::not_found(path.to_string()))
    }

    fn child(&self, dir: EntryId, name: &str, path: &MemPath) -> VfsResult<Option<EntryId>> {
        match &self.node(dir, path)?.kind {
            NodeKind::Directory { children } => Ok(children.get(name).copied()),
            NodeKind::File { .. } => Err(VfsError::not_a_directory(path.to_string())),
        }
    }

    fn children_mut(
        &mut self,
        dir: EntryId,
        path: &MemPath,
    ) -> VfsResult<&mut HashMap<String, EntryId>> {
        match &mut self.node_mut(dir, path)?.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(VfsError::not_a_directory(path.to_string())),
        }
    }

    fn parent_of(&self, id: EntryId, path: &MemPath) -> VfsResult<EntryId> {
        self.node(id, path)?
            .parent
            .ok_or_else(|| VfsError::invalid_path("the root has no parent"))
    }

    fn touch(&mut self, id: EntryId, now: SystemTime, path: &MemPath) -> VfsResult<()> {
        self.node_mut(id, path)?.mtime = now;
        Ok(())
    }

    /// Drop `id` and all of its descendants from the arena. Returns how many
    /// nodes were removed. The caller unlinks `id` from its parent.
    fn remove_subtree(&mut self, id: EntryId) -> usize {
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                removed += 1;
                if let NodeKind::Directory { children } = node.kind {
                    stack.extend(children.into_values());
                }
            }
        }
        removed
    }
}

fn parent_path(path: &MemPath) -> MemPath {
    path.parent().unwrap_or_default()
}
