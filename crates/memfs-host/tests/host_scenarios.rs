//! End-to-end scenarios through the host facade and the command session.

use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use memfs_host::{HostFs, SampleWorkspace, Session};
use memfs_kernel::{
    ChangeKind, ErrorKind, FileChange, FileSystemProvider, MemFs, MemPath, MemfsConfig, VfsError,
};
use memfs_types::{DirEntry, RenameOptions, WriteOptions};

fn run(session: &mut Session, line: &str) -> anyhow::Result<String> {
    let mut out = Vec::new();
    session.execute(line, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn vfs_kind(err: anyhow::Error) -> ErrorKind {
    err.downcast_ref::<VfsError>()
        .map(VfsError::kind)
        .unwrap_or_else(|| panic!("not a VfsError: {err:#}"))
}

#[test]
fn write_under_missing_directory_is_not_found() {
    let mut fs = HostFs::register("memfs", MemFs::new());
    let err = fs
        .write_file("memfs:/nope/a.txt", b"x", WriteOptions::upsert())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(fs.read_directory("memfs:/").unwrap().is_empty());
}

#[test]
fn empty_file_in_folder() {
    let mut fs = HostFs::register("memfs", MemFs::new());
    fs.create_directory("memfs:/folder").unwrap();
    fs.write_file("memfs:/folder/empty.txt", b"", WriteOptions::create())
        .unwrap();

    let stat = fs.stat("memfs:/folder/empty.txt").unwrap();
    assert!(stat.is_file());
    assert_eq!(stat.size, 0);
    assert_eq!(
        fs.read_directory("memfs:/folder").unwrap(),
        vec![DirEntry::file("empty.txt")]
    );
}

#[test]
fn rename_across_directories_keeps_id_and_content() {
    let mut fs = HostFs::register("memfs", MemFs::new());
    fs.create_directory("memfs:/a").unwrap();
    fs.create_directory("memfs:/b").unwrap();
    fs.write_file("memfs:/a/f", b"payload", WriteOptions::create())
        .unwrap();
    let before = fs.stat("memfs:/a/f").unwrap().id;

    fs.rename("memfs:/a/f", "memfs:/b/g", RenameOptions::default())
        .unwrap();

    assert_eq!(
        fs.stat("memfs:/a/f").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(fs.stat("memfs:/b/g").unwrap().id, before);
    assert_eq!(fs.read_file("memfs:/b/g").unwrap(), b"payload");
}

#[test]
fn read_only_config_rejects_session_writes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "read_only = true").unwrap();
    let config = MemfsConfig::load(Some(file.path())).unwrap();
    assert!(config.read_only);

    let mut session =
        Session::new(&config).with_sample(SampleWorkspace::new().with_large_lines(2));
    assert!(session.host().registration().capabilities.read_only);

    for line in ["write /a x", "mkdir /d", "rm /a", "mv /a /b"] {
        let err = run(&mut session, line).unwrap_err();
        assert_eq!(vfs_kind(err), ErrorKind::NoPermissions, "{line}");
    }

    // Sample commands go straight to the provider.
    assert_eq!(run(&mut session, "init").unwrap(), "initialized\n");
    assert_eq!(run(&mut session, "cat /file.txt").unwrap(), "foo\n");
}

#[test]
fn sample_tree_has_case_distinct_siblings() {
    let mut session = Session::new(&MemfsConfig::default())
        .with_sample(SampleWorkspace::new().with_large_lines(3));
    run(&mut session, "init").unwrap();

    assert_eq!(run(&mut session, "cat /xyz/UPPER.txt").unwrap(), "UPPER\n");
    assert_eq!(run(&mut session, "cat /xyz/upper.txt").unwrap(), "upper\n");
    assert_eq!(
        run(&mut session, "ls /").unwrap(),
        "file.css\nfile.html\nfile.js\nfile.json\nfile.md\nfile.php\nfile.py\n\
         file.ts\nfile.txt\nfile.xml\nfile.yaml\nfolder/\nlarge/\nxyz/\n"
    );

    let large = session
        .host()
        .provider()
        .read_file(&MemPath::parse("/large/rnd.foo"))
        .unwrap();
    assert_eq!(large.len(), 3 * 155 + 2);

    assert_eq!(
        run(&mut session, "workspace-init").unwrap(),
        "{\"uri\":\"memfs:/\",\"name\":\"MemFS - Sample\"}\n"
    );
}

#[test]
fn flush_command_delivers_pending_records() {
    let mut session = Session::new(&MemfsConfig::default());
    let notifier = session.notifier();
    let mut rx = notifier.subscribe();

    run(&mut session, "mkdir /d").unwrap();
    run(&mut session, "write /d/x 1").unwrap();
    assert_eq!(notifier.pending_len(), 3);

    assert_eq!(run(&mut session, "flush").unwrap(), "flushed 3 change(s)\n");
    let batch = rx.try_recv().unwrap();
    let kinds: Vec<_> = batch.iter().map(FileChange::kind).collect();
    assert_eq!(
        kinds,
        vec![ChangeKind::Changed, ChangeKind::Created, ChangeKind::Created]
    );
}

#[tokio::test]
async fn rapid_writes_produce_one_batch() {
    let config = MemfsConfig {
        debounce_ms: 25,
        ..MemfsConfig::default()
    };
    let mut session = Session::new(&config);
    let notifier = session.notifier();
    let mut rx = notifier.subscribe();

    for n in 0..5 {
        run(&mut session, &format!("write /file.txt {n}")).unwrap();
    }

    let batch = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(batch.len(), 5);
    assert_eq!(batch[0].kind(), ChangeKind::Created);
    assert!(batch[1..].iter().all(|c| c.kind() == ChangeKind::Changed));
    assert!(batch.iter().all(|c| c.id() == batch[0].id()));

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(notifier.flush_count(), 1);
}

#[tokio::test]
async fn failing_listener_does_not_block_others() {
    let config = MemfsConfig {
        debounce_ms: 10,
        ..MemfsConfig::default()
    };
    let mut fs = MemFs::with_config(&config);
    let delivered = Arc::new(AtomicUsize::new(0));

    fs.on_did_change(|_| anyhow::bail!("listener failed"));
    let counter = Arc::clone(&delivered);
    fs.on_did_change(move |batch| {
        counter.fetch_add(batch.len(), Ordering::SeqCst);
        Ok(())
    });

    fs.write_file(&MemPath::parse("/a"), b"1", WriteOptions::upsert())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(delivered.load(Ordering::SeqCst), 1);

    fs.write_file(&MemPath::parse("/a"), b"2", WriteOptions::upsert())
        .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
}

#[test]
fn document_mirror_lifecycle_emits_records() {
    let mut session = Session::new(&MemfsConfig::default());
    let notifier = session.notifier();
    let mut rx = notifier.subscribe();

    run(&mut session, "open /src/readme.txt Mixed Case").unwrap();
    run(&mut session, "close /src/readme.txt").unwrap();
    notifier.flush();

    let batch = rx.try_recv().unwrap();
    let backing = MemPath::parse("/readme.txt.backing.html");
    let kinds: Vec<_> = batch
        .iter()
        .filter(|c| c.path() == &backing)
        .map(FileChange::kind)
        .collect();
    assert_eq!(kinds, vec![ChangeKind::Created, ChangeKind::Deleted]);
    assert!(!session.host().provider().exists(&backing));
}
