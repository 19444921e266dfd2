//! Workout data types for workout-log.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workout the user has logged.
///
/// Serialized with camelCase keys and RFC 3339 timestamps, e.g.
/// `{"id": "...", "title": "Push day", "startedAt": "2024-01-02T10:00:00Z", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedWorkout {
    /// Stable unique identifier.
    pub id: Uuid,

    /// Short user-facing title.
    pub title: String,

    /// When the workout started. The store orders by this, newest first.
    pub started_at: DateTime<Utc>,

    /// When the workout finished, if it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// Last modification time. Stamped by the store on every upsert.
    pub updated_at: DateTime<Utc>,

    /// Exercises performed, in order.
    #[serde(default)]
    pub exercises: Vec<LoggedExercise>,

    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One exercise within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedExercise {
    pub name: String,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
}

/// A single set of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSet {
    pub reps: u32,
    /// Load in kilograms; `None` for bodyweight sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

impl LoggedWorkout {
    /// Creates a new workout with a fresh identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            started_at,
            ended_at: None,
            updated_at: Utc::now(),
            exercises: Vec::new(),
            notes: None,
        }
    }

    /// Updates the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Time between start and end, if the workout has ended.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    /// Number of sets across all exercises.
    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Sum of `reps * weight` over weighted sets.
    #[must_use]
    pub fn total_volume_kg(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter_map(|s| s.weight_kg.map(|w| w * f64::from(s.reps)))
            .sum()
    }
}

impl LoggedExercise {
    #[must_use]
    pub fn new(name: impl Into<String>, sets: Vec<LoggedSet>) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }
}

impl LoggedSet {
    #[must_use]
    pub const fn new(reps: u32, weight_kg: Option<f64>) -> Self {
        Self { reps, weight_kg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn new_workout_has_fresh_ids() {
        let a = LoggedWorkout::new("A", at(10));
        let b = LoggedWorkout::new("B", at(10));

        assert_ne!(a.id, b.id);
        assert!(a.exercises.is_empty());
        assert!(a.ended_at.is_none());
    }

    #[test]
    fn touch_updates_timestamp() {
        let mut w = LoggedWorkout::new("test", at(10));
        let original = w.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(10));
        w.touch();

        assert!(w.updated_at > original);
        assert_eq!(w.started_at, at(10));
    }

    #[test]
    fn duration_requires_end() {
        let mut w = LoggedWorkout::new("test", at(10));
        assert!(w.duration().is_none());

        w.ended_at = Some(at(11));
        assert_eq!(w.duration(), Some(Duration::hours(1)));
    }

    #[test]
    fn totals_skip_bodyweight_sets() {
        let mut w = LoggedWorkout::new("test", at(10));
        w.exercises = vec![
            LoggedExercise::new(
                "Squat",
                vec![LoggedSet::new(5, Some(100.0)), LoggedSet::new(5, Some(100.0))],
            ),
            LoggedExercise::new("Pull-up", vec![LoggedSet::new(8, None)]),
        ];

        assert_eq!(w.total_sets(), 3);
        assert!((w.total_volume_kg() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_camel_case_iso_timestamps() {
        let mut w = LoggedWorkout::new("Push day", at(10));
        w.updated_at = at(12);

        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["startedAt"], "2024-01-01T10:00:00Z");
        assert_eq!(json["updatedAt"], "2024-01-01T12:00:00Z");
        assert!(json.get("endedAt").is_none());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn decodes_minimal_record() {
        let json = r#"{
            "id": "6f1c1c52-9a43-4f0e-8a53-1d3c1a7e2b10",
            "title": "Run",
            "startedAt": "2024-01-02T06:30:00+01:00",
            "updatedAt": "2024-01-02T07:30:00Z"
        }"#;

        let w: LoggedWorkout = serde_json::from_str(json).unwrap();
        assert_eq!(w.title, "Run");
        assert_eq!(
            w.started_at,
            Utc.with_ymd_and_hms(2024, 1, 2, 5, 30, 0).unwrap()
        );
        assert!(w.exercises.is_empty());
    }
}
