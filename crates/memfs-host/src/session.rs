//! Line-oriented command session over a registered memfs.
//!
//! Each input line is one command. Paths may be given as full URIs
//! (`memfs:/a/b`) or as bare absolute paths, which are taken to be under
//! the registered scheme.
//!
//! Text arguments (`write`, `open`, `edit`) run to the end of the line and
//! keep their inner whitespace.

use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use memfs_kernel::{ChangeNotifier, FileChange, MemFs, MemfsConfig};
use memfs_types::{RenameOptions, WriteOptions};
use serde_json::json;

use crate::documents::VirtualDocuments;
use crate::host_fs::HostFs;
use crate::registration::Registration;
use crate::sample::SampleWorkspace;

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_help_subcommand = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show entry metadata
    Stat {
        uri: String,
        #[arg(long)]
        json: bool,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        uri: String,
    },
    /// Print a file
    Cat { uri: String },
    /// Write text to a file
    Write {
        uri: String,
        /// Fail if the file does not exist
        #[arg(long)]
        no_create: bool,
        /// Fail if the file exists
        #[arg(long)]
        no_overwrite: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Create a directory
    Mkdir { uri: String },
    /// Delete a file or directory tree
    Rm { uri: String },
    /// Move an entry
    Mv {
        from: String,
        to: String,
        #[arg(short = 'f', long)]
        overwrite: bool,
    },
    /// Deliver pending change records now
    Flush,
    /// Seed the sample tree
    Init,
    /// Remove everything under the root
    Reset,
    /// Write /file.txt
    AddFile,
    /// Delete /file.txt
    DeleteFile,
    /// Print the workspace folder to open
    WorkspaceInit,
    /// Start mirroring a .txt document into its backing file
    Open {
        document: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Replace a tracked document's text
    Edit {
        document: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Stop mirroring a document and delete its backing file
    Close { document: String },
    /// List commands
    Help,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// A memfs registration plus the sample commands.
pub struct Session {
    host: HostFs<MemFs>,
    sample: SampleWorkspace,
    documents: VirtualDocuments,
    workspace_name: String,
}

impl Session {
    pub fn new(config: &MemfsConfig) -> Self {
        let registration = Registration::from_config(config);
        Self {
            host: HostFs::new(registration, MemFs::with_config(config)),
            sample: SampleWorkspace::new(),
            documents: VirtualDocuments::new(),
            workspace_name: config.workspace_name.clone(),
        }
    }

    /// Replace the sample command state (e.g. to shrink the random file).
    pub fn with_sample(mut self, sample: SampleWorkspace) -> Self {
        self.sample = sample;
        self
    }

    pub fn host(&self) -> &HostFs<MemFs> {
        &self.host
    }

    /// A handle on the provider's notifier.
    pub fn notifier(&self) -> ChangeNotifier {
        self.host.provider().notifier().clone()
    }

    /// Run one command line, writing its output to `out`.
    ///
    /// Blank lines and `#` comments are ignored. Filesystem errors are
    /// returned; the session stays usable after them.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let parsed = Line::try_parse_from(tokens.iter().copied())
            .map_err(|e| anyhow::anyhow!(e.render().to_string().trim_end().to_string()))?;
        tracing::debug!(command = ?parsed.command, "execute");

        match parsed.command {
            Command::Stat { uri, json } => {
                let uri = self.uri(&uri);
                let stat = self.host.stat(&uri)?;
                if json {
                    let value = json!({
                        "uri": uri,
                        "id": stat.id,
                        "type": stat.kind,
                        "size": stat.size,
                        "ctime": stat.ctime_millis(),
                        "mtime": stat.mtime_millis(),
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
                } else {
                    writeln!(
                        out,
                        "{} {} size={} mtime={} id={}",
                        stat.kind,
                        uri,
                        stat.size,
                        stat.mtime_millis(),
                        stat.id.short()
                    )?;
                }
            }
            Command::Ls { uri } => {
                for entry in self.host.read_directory(&self.uri(&uri))? {
                    let suffix = if entry.kind.is_dir() { "/" } else { "" };
                    writeln!(out, "{}{suffix}", entry.name)?;
                }
            }
            Command::Cat { uri } => {
                let data = self.host.read_file(&self.uri(&uri))?;
                writeln!(out, "{}", String::from_utf8_lossy(&data))?;
            }
            Command::Write {
                uri,
                no_create,
                no_overwrite,
                text,
            } => {
                let options = WriteOptions {
                    create: !no_create,
                    overwrite: !no_overwrite,
                };
                let uri = self.uri(&uri);
                let content = line_tail(line, tokens.len() - text.len());
                self.host
                    .write_file(&uri, content.as_bytes(), options)
                    .with_context(|| format!("write {uri}"))?;
            }
            Command::Mkdir { uri } => {
                let uri = self.uri(&uri);
                self.host.create_directory(&uri)?;
            }
            Command::Rm { uri } => {
                let uri = self.uri(&uri);
                self.host.delete(&uri)?;
            }
            Command::Mv {
                from,
                to,
                overwrite,
            } => {
                let (from, to) = (self.uri(&from), self.uri(&to));
                self.host
                    .rename(&from, &to, RenameOptions { overwrite })?;
            }
            Command::Flush => {
                let n = self.host.provider().notifier().flush();
                writeln!(out, "flushed {n} change(s)")?;
            }
            Command::Init => {
                let seeded = self.sample.init(self.host.provider_mut())?;
                writeln!(out, "{}", if seeded { "initialized" } else { "already initialized" })?;
            }
            Command::Reset => {
                let removed = self.sample.reset(self.host.provider_mut())?;
                writeln!(out, "removed {removed} entries")?;
            }
            Command::AddFile => {
                if !self.sample.add_file(self.host.provider_mut())? {
                    writeln!(out, "not initialized")?;
                }
            }
            Command::DeleteFile => {
                if !self.sample.delete_file(self.host.provider_mut())? {
                    writeln!(out, "not initialized")?;
                }
            }
            Command::WorkspaceInit => {
                let folder = self
                    .sample
                    .workspace_folder(&self.host.registration().root_uri(), &self.workspace_name);
                writeln!(out, "{}", serde_json::to_string(&folder)?)?;
            }
            Command::Open { document, text } => {
                let content = line_tail(line, tokens.len() - text.len());
                if self.documents.open(self.host.provider_mut(), &document, content)? {
                    let scheme = &self.host.registration().scheme;
                    let backing = VirtualDocuments::backing_uri(scheme, &document);
                    writeln!(out, "mirrored to {backing}")?;
                } else {
                    writeln!(out, "not mirrored")?;
                }
            }
            Command::Edit { document, text } => {
                let content = line_tail(line, tokens.len() - text.len());
                if !self.documents.update(self.host.provider_mut(), &document, content)? {
                    writeln!(out, "not tracked")?;
                }
            }
            Command::Close { document } => {
                if !self.documents.close(self.host.provider_mut(), &document)? {
                    writeln!(out, "not tracked")?;
                }
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn uri(&self, arg: &str) -> String {
        if arg.starts_with('/') {
            format!("{}:{arg}", self.host.registration().scheme)
        } else {
            arg.to_string()
        }
    }
}

/// `line` after its first `skip` whitespace-separated tokens, with the
/// separating whitespace removed and inner whitespace kept.
fn line_tail(line: &str, skip: usize) -> &str {
    let mut rest = line;
    for _ in 0..skip {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    rest.trim_start()
}

/// One line per record, e.g. `created memfs:/a`.
pub fn describe_change(scheme: &str, change: &FileChange) -> String {
    match change {
        FileChange::Renamed { from, to, .. } => {
            format!("renamed {scheme}:{from} -> {scheme}:{to}")
        }
        other => format!("{} {scheme}:{}", other.kind(), other.path()),
    }
}

const HELP: &str = "\
stat <uri> [--json]                    show entry metadata
ls [uri]                               list a directory
cat <uri>                              print a file
write <uri> [--no-create] [--no-overwrite] <text...>
                                       text runs to end of line, spacing kept
mkdir <uri>                            create a directory
rm <uri>                               delete an entry (recursive)
mv <from> <to> [-f]                    move an entry, -f replaces the target
flush                                  deliver pending change records now
init | reset | add-file | delete-file  sample workspace commands
workspace-init                         print the workspace folder
open <document> <text...>              mirror a .txt document, uppercased
edit <document> <text...>              replace a tracked document's text
close <document>                       stop mirroring, delete the backing file
quit";

#[cfg(test)]
mod tests {
    use super::*;
    use memfs_kernel::{ErrorKind, MemPath, VfsError};
    use memfs_types::EntryId;

    fn session() -> Session {
        Session::new(&MemfsConfig::default()).with_sample(SampleWorkspace::new().with_large_lines(4))
    }

    fn run(session: &mut Session, line: &str) -> anyhow::Result<String> {
        let mut out = Vec::new();
        session.execute(line, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_write_cat_ls() {
        let mut s = session();
        run(&mut s, "mkdir /docs").unwrap();
        run(&mut s, "write /docs/a.txt hello   world").unwrap();
        assert_eq!(run(&mut s, "cat memfs:/docs/a.txt").unwrap(), "hello   world\n");
        assert_eq!(run(&mut s, "ls").unwrap(), "docs/\n");
        assert_eq!(run(&mut s, "ls /docs").unwrap(), "a.txt\n");
    }

    #[test]
    fn test_errors_carry_vfs_kind() {
        let mut s = session();
        let err = run(&mut s, "cat /missing").unwrap_err();
        let vfs = err.downcast_ref::<VfsError>().unwrap();
        assert_eq!(vfs.kind(), ErrorKind::NotFound);

        run(&mut s, "write /a x").unwrap();
        let err = run(&mut s, "write --no-overwrite /a y").unwrap_err();
        let vfs = err.downcast_ref::<VfsError>().unwrap();
        assert_eq!(vfs.kind(), ErrorKind::AlreadyExists);
        assert_eq!(run(&mut s, "cat /a").unwrap(), "x\n");
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut s = session();
        assert!(run(&mut s, "frobnicate /a").is_err());
        assert_eq!(run(&mut s, "# comment").unwrap(), "");
    }

    #[test]
    fn test_stat_json() {
        let mut s = session();
        run(&mut s, "write /a abc").unwrap();
        let text = run(&mut s, "stat /a --json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["size"], 3);
        assert_eq!(value["uri"], "memfs:/a");
    }

    #[test]
    fn test_mv_overwrite_flag() {
        let mut s = session();
        run(&mut s, "write /a 1").unwrap();
        run(&mut s, "write /b 2").unwrap();
        assert!(run(&mut s, "mv /a /b").is_err());
        run(&mut s, "mv -f /a /b").unwrap();
        assert_eq!(run(&mut s, "cat /b").unwrap(), "1\n");
        assert_eq!(run(&mut s, "ls").unwrap(), "b\n");
    }

    #[test]
    fn test_write_keeps_spacing_after_flags() {
        let mut s = session();
        run(&mut s, "write --no-overwrite /a  x\t  y  -z").unwrap();
        assert_eq!(run(&mut s, "cat /a").unwrap(), "x\t  y  -z\n");
        run(&mut s, "write /empty").unwrap();
        assert_eq!(run(&mut s, "cat /empty").unwrap(), "\n");
    }

    #[test]
    fn test_line_tail() {
        assert_eq!(line_tail("write /a  x   y", 2), "x   y");
        assert_eq!(line_tail("write /a", 2), "");
        assert_eq!(line_tail("a b", 0), "a b");
    }

    #[test]
    fn test_open_edit_close() {
        let mut s = session();
        assert_eq!(
            run(&mut s, "open /home/me/notes.txt shout  this").unwrap(),
            "mirrored to memfs:/notes.txt.backing.html\n"
        );
        assert_eq!(
            run(&mut s, "cat /notes.txt.backing.html").unwrap(),
            "SHOUT  THIS\n"
        );
        assert_eq!(run(&mut s, "open /home/me/notes.txt again").unwrap(), "not mirrored\n");
        assert_eq!(run(&mut s, "open /home/me/notes.md x").unwrap(), "not mirrored\n");

        run(&mut s, "edit /home/me/notes.txt quiet").unwrap();
        assert_eq!(run(&mut s, "cat /notes.txt.backing.html").unwrap(), "QUIET\n");

        run(&mut s, "close /home/me/notes.txt").unwrap();
        assert_eq!(run(&mut s, "ls").unwrap(), "");
        assert_eq!(run(&mut s, "close /home/me/notes.txt").unwrap(), "not tracked\n");
    }

    #[test]
    fn test_quit() {
        let mut s = session();
        let mut out = Vec::new();
        assert_eq!(s.execute("quit", &mut out).unwrap(), Flow::Quit);
        assert_eq!(s.execute("exit", &mut out).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_describe_change() {
        let id = EntryId::new();
        let created = FileChange::Created {
            path: MemPath::parse("/a"),
            id,
        };
        assert_eq!(describe_change("memfs", &created), "created memfs:/a");
        let renamed = FileChange::Renamed {
            from: MemPath::parse("/a"),
            to: MemPath::parse("/b"),
            id,
        };
        assert_eq!(describe_change("memfs", &renamed), "renamed memfs:/a -> memfs:/b");
    }
}
