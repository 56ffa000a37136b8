//! Debounced change notification.
//!
//! Store mutations hand their change records to a [`ChangeNotifier`], which
//! appends them to a pending batch. The first record to land in an empty
//! batch arms a one-shot timer; when it fires, everything accumulated in the
//! meantime is delivered as a single ordered [`ChangeBatch`]. Subscribers
//! never see one event per mutation.
//!
//! # Delivery
//!
//! - Callback listeners ([`ChangeNotifier::on_did_change`]) run sequentially
//!   on the flushing task. Taking a batch and delivering it happen under one
//!   delivery lock, so batches arrive in append order even when a timer and
//!   an explicit flush race on different threads. A listener that errors or panics is logged and
//!   skipped; the rest still see the batch.
//! - Channel subscribers ([`ChangeNotifier::subscribe`]) get the same batch
//!   through a `tokio::sync::broadcast` receiver.
//! - With nobody listening, a flush simply drops the batch.
//!
//! The timer needs a tokio runtime. Outside one, records stay pending until
//! [`ChangeNotifier::flush`] is called.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use memfs_types::EntryId;

use crate::vfs::MemPath;

/// Debounce window used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(5);

/// Capacity of the broadcast channel behind [`ChangeNotifier::subscribe`].
const CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// Records
// ============================================================================

/// Category of a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
    Renamed,
}

/// One structural or content change.
///
/// Every record carries the entry id so subscribers can follow an entry
/// across a rename without re-resolving paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileChange {
    /// A file or directory came into existence.
    Created { path: MemPath, id: EntryId },
    /// File content was replaced, or a directory's children changed.
    Changed { path: MemPath, id: EntryId },
    /// An entry (and its subtree) was destroyed.
    Deleted { path: MemPath, id: EntryId },
    /// An entry moved; `id` is unchanged.
    Renamed {
        from: MemPath,
        to: MemPath,
        id: EntryId,
    },
}

impl FileChange {
    /// The record's category.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Created { .. } => ChangeKind::Created,
            Self::Changed { .. } => ChangeKind::Changed,
            Self::Deleted { .. } => ChangeKind::Deleted,
            Self::Renamed { .. } => ChangeKind::Renamed,
        }
    }

    /// The path the entry has after this change (the destination for renames).
    pub fn path(&self) -> &MemPath {
        match self {
            Self::Created { path, .. } | Self::Changed { path, .. } | Self::Deleted { path, .. } => {
                path
            }
            Self::Renamed { to, .. } => to,
        }
    }

    /// The affected entry.
    pub fn id(&self) -> EntryId {
        match self {
            Self::Created { id, .. }
            | Self::Changed { id, .. }
            | Self::Deleted { id, .. }
            | Self::Renamed { id, .. } => *id,
        }
    }
}

/// One flushed batch, in append order.
pub type ChangeBatch = Arc<[FileChange]>;

type Listener = Arc<dyn Fn(&[FileChange]) -> anyhow::Result<()> + Send + Sync>;

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
struct Pending {
    records: Vec<FileChange>,
    /// Bumped on every flush so a stale timer can tell its batch is gone.
    generation: u64,
}

struct Inner {
    delay: Duration,
    pending: Mutex<Pending>,
    /// Held from taking a batch until its delivery ends. Reentrant so a
    /// listener may call `flush()`.
    delivery: ReentrantMutex<()>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
    flushes: AtomicU64,
    tx: broadcast::Sender<ChangeBatch>,
}

impl Inner {
    /// Take the pending batch. With `only`, do nothing unless the batch is
    /// still the one that generation armed a timer for.
    fn take_batch(&self, only: Option<u64>) -> Option<ChangeBatch> {
        let mut pending = self.pending.lock();
        if only.is_some_and(|generation| generation != pending.generation) {
            return None;
        }
        pending.generation += 1;
        if pending.records.is_empty() {
            return None;
        }
        Some(Arc::from(std::mem::take(&mut pending.records)))
    }

    /// Take and deliver under the delivery lock. Returns the record count.
    fn flush(&self, only: Option<u64>) -> usize {
        let _delivering = self.delivery.lock();
        match self.take_batch(only) {
            Some(batch) => {
                let len = batch.len();
                self.deliver(batch);
                len
            }
            None => 0,
        }
    }

    fn is_registered(&self, id: u64) -> bool {
        self.listeners.lock().iter().any(|(lid, _)| *lid == id)
    }

    fn deliver(&self, batch: ChangeBatch) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(records = batch.len(), "flushing change batch");

        // Snapshot so listeners may (un)subscribe while we iterate.
        let listeners: Vec<(u64, Listener)> = self.listeners.lock().clone();
        for (id, listener) in listeners {
            if !self.is_registered(id) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| listener(&batch))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(listener = id, error = %e, "change listener failed"),
                Err(_) => tracing::warn!(listener = id, "change listener panicked"),
            }
        }

        let _ = self.tx.send(batch);
    }
}

/// Batches change records and delivers them after a quiet period.
///
/// Cheap to clone; clones share the same pending batch and listeners.
#[derive(Clone)]
pub struct ChangeNotifier {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("delay", &self.inner.delay)
            .field("pending", &self.pending_len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl ChangeNotifier {
    /// Create a notifier with the given debounce window.
    pub fn new(delay: Duration) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                delay,
                pending: Mutex::new(Pending::default()),
                delivery: ReentrantMutex::new(()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                flushes: AtomicU64::new(0),
                tx,
            }),
        }
    }

    /// The debounce window.
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Register a callback for flushed batches.
    ///
    /// The callback runs on whichever task performs the flush. Keep the
    /// returned handle to unsubscribe; dropping it leaves the listener in
    /// place.
    pub fn on_did_change<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&[FileChange]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        ListenerHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Receive flushed batches over a broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeBatch> {
        self.inner.tx.subscribe()
    }

    /// Append records to the pending batch, arming the timer if the batch
    /// was empty.
    pub fn fire(&self, records: impl IntoIterator<Item = FileChange>) {
        let (armed, generation) = {
            let mut pending = self.inner.pending.lock();
            let was_empty = pending.records.is_empty();
            pending.records.extend(records);
            (was_empty && !pending.records.is_empty(), pending.generation)
        };
        if armed {
            self.schedule_flush(generation);
        }
    }

    /// Deliver whatever is pending right now. Returns the number of records
    /// delivered.
    ///
    /// Waits for a delivery already in progress on another thread.
    pub fn flush(&self) -> usize {
        self.inner.flush(None)
    }

    /// Records waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().records.len()
    }

    /// Batches delivered so far.
    pub fn flush_count(&self) -> u64 {
        self.inner.flushes.load(Ordering::Relaxed)
    }

    /// Registered callback listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn schedule_flush(&self, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime; change batch held until flush()");
            return;
        };
        let inner = Arc::downgrade(&self.inner);
        let delay = self.inner.delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.flush(Some(generation));
            }
        });
    }
}

/// Registration returned by [`ChangeNotifier::on_did_change`].
pub struct ListenerHandle {
    id: u64,
    inner: Weak<Inner>,
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle").field("id", &self.id).finish()
    }
}

impl ListenerHandle {
    /// Unsubscribe. Idempotent, and safe to call from inside a listener.
    /// Returns true if this call removed the listener.
    pub fn dispose(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut listeners = inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}
