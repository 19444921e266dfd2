//! Workout Log - local persistence for logged workouts.
//!
//! Workouts are kept in memory, newest first, and mirrored to a single JSON
//! file in the user's documents directory. See [`WorkoutLogStore`].

pub mod cli;
pub mod config;
pub mod error;
pub mod workout;

pub use config::{load_config, load_config_from, WorkoutLogConfig};
pub use error::{Result, StoreError};
pub use workout::{
    JsonLogFile, LogFile, LoggedExercise, LoggedSet, LoggedWorkout, Snapshot, StoreEvent,
    WorkoutLogStore,
};
