//! Persistence background task

use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{services::BlobStore, state::TimerStore};

/// Spawn the persistence task for the given snapshot stream
pub fn spawn_persistence<B: BlobStore>(
    store_rx: watch::Receiver<TimerStore>,
    blobs: Arc<B>,
) -> PersistenceHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(persistence_task(store_rx, blobs, stop_rx));
    PersistenceHandle { stop_tx, task }
}

/// Write the latest store snapshot after every mutation.
///
/// Snapshots published faster than they can be written are coalesced; only
/// the newest one is saved. Writes never overlap. On a stop request the
/// current snapshot is saved one last time. Also returns once the state is
/// dropped.
pub async fn persistence_task<B: BlobStore>(
    mut store_rx: watch::Receiver<TimerStore>,
    blobs: Arc<B>,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!("Starting persistence task");

    loop {
        tokio::select! {
            changed = store_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = store_rx.borrow_and_update().clone();
                write_snapshot(&blobs, snapshot).await;
            }
            _ = stop_rx.changed() => {
                debug!("Persistence task received stop request");
                let snapshot = store_rx.borrow_and_update().clone();
                write_snapshot(&blobs, snapshot).await;
                break;
            }
        }
    }

    info!("Persistence task stopped");
}

/// Save a snapshot on the blocking pool so file I/O stays off the runtime
async fn write_snapshot<B: BlobStore>(blobs: &Arc<B>, snapshot: TimerStore) {
    let blobs = Arc::clone(blobs);
    let write = tokio::task::spawn_blocking(move || save_snapshot(blobs.as_ref(), &snapshot));
    if let Err(e) = write.await {
        warn!("Snapshot write ended abnormally: {}", e);
    }
}

/// Handle to a running persistence task
#[derive(Debug)]
pub struct PersistenceHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PersistenceHandle {
    /// Save the current snapshot and wait for the task to finish
    pub async fn stop(self) {
        if self.stop_tx.send(true).is_err() {
            debug!("Persistence task already finished");
        }
        if let Err(e) = self.task.await {
            warn!("Persistence task ended abnormally: {}", e);
        }
    }
}

/// Serialize and save one snapshot, logging failures
pub fn save_snapshot<B: BlobStore + ?Sized>(blobs: &B, snapshot: &TimerStore) {
    let blob = match snapshot.serialize() {
        Ok(blob) => blob,
        Err(e) => {
            warn!("Failed to serialize timers: {}", e);
            return;
        }
    };

    match blobs.save(&blob) {
        Ok(()) => debug!("Saved {} timers", snapshot.len()),
        Err(e) => warn!("Failed to save timers: {}", e),
    }
}

/// Load the persisted store, falling back to an empty one
pub fn load_store<B: BlobStore + ?Sized>(blobs: &B) -> TimerStore {
    match blobs.load() {
        Ok(blob) => {
            let store = TimerStore::deserialize(blob.as_deref());
            info!("Loaded {} timers", store.len());
            store
        }
        Err(e) => {
            warn!("Failed to read saved timers, starting empty: {}", e);
            TimerStore::new()
        }
    }
}
