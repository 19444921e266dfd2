//! Workout log persistence.
//!
//! This module keeps the logged workouts in memory and mirrors them to disk:
//! - [`WorkoutLogStore`] - Sorted, observable list of workouts
//! - [`LogFile`] / [`JsonLogFile`] - The backing JSON file
//! - [`StoreEvent`] - Outcomes of background load and write work

pub mod events;
pub mod file;
mod persister;
pub mod store;
pub mod types;

pub use events::StoreEvent;
pub use file::{JsonLogFile, LogFile};
pub use persister::Snapshot;
pub use store::WorkoutLogStore;
pub use types::{LoggedExercise, LoggedSet, LoggedWorkout};
