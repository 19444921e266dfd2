//! In-memory workout log mirrored to a JSON file.
//!
//! [`WorkoutLogStore`] owns the authoritative list of workouts, sorted by
//! start time with the most recent first. Reads are served from memory.
//! Mutations update memory immediately and queue a full snapshot for the
//! background writer; callers never wait for disk and never see storage
//! errors. Failures are logged and published as [`StoreEvent`]s instead.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WorkoutLogConfig;
use crate::error::{Result, StoreError};
use crate::workout::events::{StoreEvent, EVENT_CAPACITY};
use crate::workout::file::{JsonLogFile, LogFile};
use crate::workout::persister::{Persister, Snapshot};
use crate::workout::types::LoggedWorkout;

/// Observable, file-backed list of logged workouts.
///
/// All mutations take `&mut self`: a single owner drives the store, and any
/// number of observers follow it through [`subscribe`](Self::subscribe).
pub struct WorkoutLogStore {
    file: Arc<dyn LogFile>,
    state: watch::Sender<Snapshot>,
    events: broadcast::Sender<StoreEvent>,
    persister: Persister,
}

impl WorkoutLogStore {
    /// Creates an empty store backed by `file`, with its writer on the
    /// current Tokio runtime.
    ///
    /// Call [`load`](Self::load) to read existing workouts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRuntime`] when called outside a runtime.
    pub fn new(file: impl LogFile + 'static) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        Ok(Self::with_runtime(file, &runtime))
    }

    /// Creates an empty store whose writer runs on `runtime`.
    #[must_use]
    pub fn with_runtime(file: impl LogFile + 'static, runtime: &Handle) -> Self {
        let file: Arc<dyn LogFile> = Arc::new(file);
        let (state, _) = watch::channel(Snapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let persister = Persister::spawn(runtime, Arc::clone(&file), events.clone());

        Self {
            file,
            state,
            events,
            persister,
        }
    }

    /// Creates a store at the location named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log path cannot be determined or no Tokio
    /// runtime is running.
    pub fn open(config: &WorkoutLogConfig) -> Result<Self> {
        let path = config.log_path()?;
        debug!(path = %path.display(), "Opening workout log");
        Self::new(JsonLogFile::at(path))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.file.path()
    }

    /// Replaces the in-memory list with the contents of the log file.
    ///
    /// A missing file yields an empty list. An unreadable or corrupted file
    /// also yields an empty list, after logging and emitting
    /// [`StoreEvent::LoadFailed`]. Writes already queued by this store are
    /// applied before reading.
    pub async fn load(&mut self) {
        self.flush().await;

        let file = Arc::clone(&self.file);
        let path = file.path();
        let result = tokio::task::spawn_blocking(move || file.read())
            .await
            .unwrap_or_else(|e| {
                Err(StoreError::Read {
                    path: path.clone(),
                    source: std::io::Error::other(e.to_string()),
                })
            });

        let (workouts, event) = match result {
            Ok(None) => {
                debug!(path = %path.display(), "No workout log found, starting fresh");
                (Vec::new(), StoreEvent::Loaded { count: 0 })
            }
            Ok(Some(workouts)) => {
                let mut workouts = dedupe_by_id(workouts);
                sort_newest_first(&mut workouts);
                info!(path = %path.display(), count = workouts.len(), "Workout log loaded");
                let count = workouts.len();
                (workouts, StoreEvent::Loaded { count })
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load workout log; starting with an empty history"
                );
                (Vec::new(), StoreEvent::LoadFailed(Arc::new(e)))
            }
        };

        self.state.send_replace(Arc::new(workouts));
        let _ = self.events.send(event);
    }

    /// Looks up a workout by identifier.
    #[must_use]
    pub fn workout(&self, id: Uuid) -> Option<LoggedWorkout> {
        self.state.borrow().iter().find(|w| w.id == id).cloned()
    }

    /// Current list of workouts, most recent first.
    #[must_use]
    pub fn workouts(&self) -> Snapshot {
        Arc::clone(&self.state.borrow())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Subscribes to changes of the workout list.
    ///
    /// The receiver always holds the latest list; intermediate states may be
    /// skipped by slow observers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Subscribes to load and persist outcomes.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Inserts `workout` or replaces the one with the same identifier.
    ///
    /// `updated_at` is set to now regardless of the value passed in. Returns
    /// the stored copy.
    pub fn upsert(&mut self, mut workout: LoggedWorkout) -> LoggedWorkout {
        workout.touch();

        let mut workouts = self.current();
        match workouts.iter_mut().find(|w| w.id == workout.id) {
            Some(existing) => *existing = workout.clone(),
            None => workouts.push(workout.clone()),
        }

        debug!(id = %workout.id, "Workout upserted");
        self.commit(workouts);
        workout
    }

    /// Removes the workout with `id`.
    ///
    /// Returns `true` if a workout was removed. Unknown identifiers leave the
    /// store untouched and queue no write.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let mut workouts = self.current();
        let before = workouts.len();
        workouts.retain(|w| w.id != id);

        if workouts.len() == before {
            return false;
        }

        debug!(%id, "Workout deleted");
        self.commit(workouts);
        true
    }

    /// Empties the store and deletes the log file.
    ///
    /// The deletion is queued behind any pending writes, so an older snapshot
    /// cannot recreate the file afterwards.
    pub fn clear_all(&mut self) {
        self.state.send_replace(Snapshot::default());
        self.persister.remove();
    }

    /// Waits until every change made so far has been written (or has failed).
    pub async fn flush(&self) {
        if let Err(e) = self.persister.flush().await {
            warn!(error = %e, "Could not wait for workout log writes");
        }
    }

    /// Writes pending changes and stops the background writer.
    pub async fn close(self) {
        self.persister.shutdown().await;
    }

    fn current(&self) -> Vec<LoggedWorkout> {
        (**self.state.borrow()).clone()
    }

    fn commit(&mut self, mut workouts: Vec<LoggedWorkout>) {
        sort_newest_first(&mut workouts);
        let snapshot = Arc::new(workouts);
        self.state.send_replace(Arc::clone(&snapshot));
        self.persister.write(snapshot);
    }
}

/// Stable sort by `started_at`, most recent first.
fn sort_newest_first(workouts: &mut [LoggedWorkout]) {
    workouts.sort_by(|a, b| b.started_at.cmp(&a.started_at));
}

/// Keeps one record per identifier, preferring the latest `updated_at`.
fn dedupe_by_id(workouts: Vec<LoggedWorkout>) -> Vec<LoggedWorkout> {
    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(workouts.len());
    let mut unique: Vec<LoggedWorkout> = Vec::with_capacity(workouts.len());

    for workout in workouts {
        match index.get(&workout.id) {
            Some(&i) => {
                warn!(id = %workout.id, "Duplicate workout in log file");
                if workout.updated_at > unique[i].updated_at {
                    unique[i] = workout;
                }
            }
            None => {
                index.insert(workout.id, unique.len());
                unique.push(workout);
            }
        }
    }

    unique
}
