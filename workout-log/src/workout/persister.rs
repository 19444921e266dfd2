//! Single background writer for the workout log.
//!
//! Every mutation queues a full snapshot. The worker drains whatever has
//! queued up, writes only the newest state and drops the rest, so snapshots
//! reach disk in the order they were taken.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StoreError};
use crate::workout::events::StoreEvent;
use crate::workout::file::LogFile;
use crate::workout::types::LoggedWorkout;

/// Immutable view of the workout list at one point in time.
pub type Snapshot = Arc<Vec<LoggedWorkout>>;

/// Desired state of the file. The newest one always wins.
#[derive(Debug)]
enum FileOp {
    Write(Snapshot),
    Remove,
}

#[derive(Debug)]
enum PersistRequest {
    Apply(FileOp),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task.
pub(crate) struct Persister {
    tx: mpsc::UnboundedSender<PersistRequest>,
    worker: JoinHandle<()>,
    events: broadcast::Sender<StoreEvent>,
}

impl Persister {
    /// Starts the writer on `runtime`.
    pub(crate) fn spawn(
        runtime: &Handle,
        file: Arc<dyn LogFile>,
        events: broadcast::Sender<StoreEvent>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run(file, rx, events.clone()));
        Self { tx, worker, events }
    }

    /// Queues `snapshot` to replace the file contents.
    pub(crate) fn write(&self, snapshot: Snapshot) {
        self.send(FileOp::Write(snapshot));
    }

    /// Queues deletion of the file.
    pub(crate) fn remove(&self) {
        self.send(FileOp::Remove);
    }

    fn send(&self, op: FileOp) {
        if self.tx.send(PersistRequest::Apply(op)).is_err() {
            warn!("Workout log writer has stopped; change kept in memory only");
            let _ = self
                .events
                .send(StoreEvent::PersistFailed(Arc::new(StoreError::WriterStopped)));
        }
    }

    /// Resolves once everything queued before this call has been applied.
    pub(crate) async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistRequest::Flush(ack_tx))
            .map_err(|_| StoreError::WriterStopped)?;
        ack_rx.await.map_err(|_| StoreError::WriterStopped)
    }

    /// Applies pending work and stops the writer.
    pub(crate) async fn shutdown(self) {
        let Self { tx, worker, .. } = self;
        drop(tx);

        if let Err(e) = worker.await {
            error!(error = %e, "Workout log writer panicked");
        }
    }
}

async fn run(
    file: Arc<dyn LogFile>,
    mut rx: mpsc::UnboundedReceiver<PersistRequest>,
    events: broadcast::Sender<StoreEvent>,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut acks = Vec::new();
        let mut superseded = 0usize;

        let mut next = Some(first);
        while let Some(request) = next {
            match request {
                PersistRequest::Apply(op) => {
                    if latest.replace(op).is_some() {
                        superseded += 1;
                    }
                }
                PersistRequest::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        if superseded > 0 {
            debug!(superseded, "Skipped superseded workout log snapshots");
        }

        if let Some(op) = latest {
            let event = apply(&file, op).await;
            let _ = events.send(event);
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }

    debug!("Workout log writer stopped");
}

/// Runs one file operation on the blocking pool and reports the outcome.
async fn apply(file: &Arc<dyn LogFile>, op: FileOp) -> StoreEvent {
    let path = file.path();
    let removing = matches!(op, FileOp::Remove);

    let file = Arc::clone(file);
    let result = tokio::task::spawn_blocking(move || match op {
        FileOp::Write(snapshot) => file
            .write(&snapshot)
            .map(|()| StoreEvent::Persisted {
                count: snapshot.len(),
            }),
        FileOp::Remove => file.remove().map(|existed| StoreEvent::Removed { existed }),
    })
    .await
    .unwrap_or_else(|e| {
        error!(error = %e, "Workout log write task failed");
        Err(StoreError::WriterStopped)
    });

    match result {
        Ok(event) => {
            match &event {
                StoreEvent::Persisted { count } => {
                    debug!(path = %path.display(), count, "Workout log saved");
                }
                StoreEvent::Removed { existed } => {
                    info!(path = %path.display(), existed, "Workout log cleared");
                }
                _ => {}
            }
            event
        }
        Err(e) if removing => {
            warn!(path = %path.display(), error = %e, "Failed to delete workout log");
            StoreEvent::RemoveFailed(Arc::new(e))
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to save workout log; change kept in memory only"
            );
            StoreEvent::PersistFailed(Arc::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::workout::file::MockLogFile;

    fn mock_file() -> MockLogFile {
        let mut file = MockLogFile::new();
        file.expect_path()
            .return_const(PathBuf::from("/mock/logged_workouts_v1.json"));
        file
    }

    fn snapshot(len: usize) -> Snapshot {
        let now = chrono::Utc::now();
        Arc::new((0..len).map(|i| LoggedWorkout::new(format!("w{i}"), now)).collect())
    }

    #[tokio::test]
    async fn flush_waits_for_write() {
        let written = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&written);

        let mut file = mock_file();
        file.expect_write().returning(move |workouts| {
            counter.store(workouts.len(), Ordering::SeqCst);
            Ok(())
        });

        let (events, mut rx) = broadcast::channel(8);
        let persister = Persister::spawn(&Handle::current(), Arc::new(file), events);

        persister.write(snapshot(3));
        persister.flush().await.unwrap();

        assert_eq!(written.load(Ordering::SeqCst), 3);
        assert!(matches!(
            rx.recv().await.unwrap(),
            StoreEvent::Persisted { count: 3 }
        ));
    }

    #[tokio::test]
    async fn last_queued_state_wins() {
        let mut file = mock_file();
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));
        let seen = Arc::clone(&last_len);
        file.expect_write().returning(move |workouts| {
            seen.store(workouts.len(), Ordering::SeqCst);
            Ok(())
        });

        let (events, _rx) = broadcast::channel(8);
        let persister = Persister::spawn(&Handle::current(), Arc::new(file), events);

        for len in 1..=20 {
            persister.write(snapshot(len));
        }
        persister.flush().await.unwrap();

        assert_eq!(last_len.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn remove_failure_is_reported() {
        let mut file = mock_file();
        file.expect_remove().returning(|| {
            Err(StoreError::Delete {
                path: PathBuf::from("/mock/logged_workouts_v1.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        });

        let (events, mut rx) = broadcast::channel(8);
        let persister = Persister::spawn(&Handle::current(), Arc::new(file), events);

        persister.remove();
        persister.flush().await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            StoreEvent::RemoveFailed(_)
        ));
    }

    #[tokio::test]
    async fn shutdown_applies_pending_work() {
        let writes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writes);

        let mut file = mock_file();
        file.expect_write().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let (events, _rx) = broadcast::channel(8);
        let persister = Persister::spawn(&Handle::current(), Arc::new(file), events);

        persister.write(snapshot(1));
        persister.shutdown().await;

        assert!(writes.load(Ordering::SeqCst) >= 1);
    }
}
