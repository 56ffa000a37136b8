//! memfs binary.
//!
//! Registers an in-memory filesystem and reads commands from stdin, one per
//! line. Change batches are printed to stdout as they are delivered.
//!
//! Usage:
//!   cargo run -p memfs-host -- --init
//!   echo 'write /a hello' | cargo run -p memfs-host
//!   RUST_LOG=memfs_kernel=debug cargo run -p memfs-host -- --read-only

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use memfs_host::{Flow, Session, describe_change};
use memfs_kernel::MemfsConfig;

/// In-memory filesystem with debounced change notification.
#[derive(Parser, Debug)]
#[command(name = "memfs")]
#[command(about = "In-memory filesystem shell")]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/memfs/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Register the provider read-only
    #[arg(long)]
    read_only: bool,

    /// Seed the sample tree before reading commands
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output and change lines.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    let mut config = MemfsConfig::load(args.config.as_deref())?;
    if args.read_only {
        config.read_only = true;
    }
    tracing::info!(
        scheme = %config.scheme,
        read_only = config.read_only,
        debounce_ms = config.debounce_ms,
        "starting memfs"
    );

    let mut session = Session::new(&config);

    let mut changes = session.notifier().subscribe();
    let scheme = config.scheme.clone();
    let printer = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(batch) => {
                    let mut stdout = std::io::stdout().lock();
                    for change in batch.iter() {
                        let _ = writeln!(stdout, "~ {}", describe_change(&scheme, change));
                    }
                }
                Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "change printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    if args.init {
        run_line(&mut session, "init");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if run_line(&mut session, &line) == Flow::Quit {
            break;
        }
    }

    // Deliver whatever is still inside the debounce window.
    session.notifier().flush();
    drop(session);
    let _ = printer.await;
    Ok(())
}

fn run_line(session: &mut Session, line: &str) -> Flow {
    let mut stdout = std::io::stdout().lock();
    match session.execute(line, &mut stdout) {
        Ok(flow) => flow,
        Err(e) => {
            let _ = writeln!(stdout, "error: {e:#}");
            Flow::Continue
        }
    }
}
