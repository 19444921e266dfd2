//! Workout command handlers for the wlog CLI.
//!
//! Each handler opens a [`WorkoutLogStore`] at the configured location,
//! loads it, performs one operation and closes the store so that the
//! background write has finished before the process exits.

use std::io::{self, Write};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::cli::args::ShellType;
use crate::config::WorkoutLogConfig;
use crate::error::{Result, StoreError};
use crate::workout::{LoggedExercise, LoggedSet, LoggedWorkout, WorkoutLogStore};

/// Number of id characters shown in listings.
const SHORT_ID_LEN: usize = 8;

/// Shortest id prefix accepted on the command line.
const MIN_ID_PREFIX: usize = 4;

/// Fields supplied to `wlog log` / `wlog edit`.
#[derive(Debug, Default)]
pub struct WorkoutInput {
    pub title: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub notes: Option<String>,
    pub exercises: Vec<String>,
    /// Remove the end time (`wlog edit --clear-end`).
    pub clear_end: bool,
    /// Remove the notes (`wlog edit --clear-notes`).
    pub clear_notes: bool,
}

/// Handles the `wlog list` command.
///
/// # Errors
///
/// Returns an error if the log location cannot be determined.
pub async fn handle_list(config: &WorkoutLogConfig, limit: Option<usize>) -> Result<()> {
    let store = open_loaded(config).await?;
    let workouts = store.workouts();

    if workouts.is_empty() {
        println!("No workouts logged yet.");
        println!("\nLog one with: wlog log <title>");
        return Ok(());
    }

    println!("Logged workouts:\n");
    for workout in workouts.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("  {}  {}", short_id(workout.id), workout.title);
        print!("    Started: {}", workout.started_at.format("%Y-%m-%d %H:%M UTC"));
        if let Some(duration) = workout.duration() {
            print!("  Duration: {}", format_duration(duration));
        }
        println!();
        if !workout.exercises.is_empty() {
            println!(
                "    Exercises: {}  Sets: {}",
                workout.exercises.len(),
                workout.total_sets()
            );
        }
        println!();
    }

    if let Some(limit) = limit.filter(|&l| l < workouts.len()) {
        println!("  ... and {} more", workouts.len() - limit);
    }

    store.close().await;
    Ok(())
}

/// Handles the `wlog show <id>` command.
///
/// # Errors
///
/// Returns an error if the id is malformed or no such workout exists.
pub async fn handle_show(config: &WorkoutLogConfig, id: &str) -> Result<()> {
    let store = open_loaded(config).await?;
    let id = resolve_id(&store, id)?;
    let workout = store
        .workout(id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    println!("{}\n", workout.title);
    println!("  Id:       {}", workout.id);
    println!("  Started:  {}", workout.started_at.to_rfc3339());
    if let Some(ended_at) = workout.ended_at {
        println!("  Ended:    {}", ended_at.to_rfc3339());
    }
    if let Some(duration) = workout.duration() {
        println!("  Duration: {}", format_duration(duration));
    }
    println!("  Updated:  {}", workout.updated_at.to_rfc3339());

    if !workout.exercises.is_empty() {
        println!("\n  Exercises:");
        for exercise in &workout.exercises {
            let sets: Vec<String> = exercise.sets.iter().map(format_set).collect();
            println!("    {}: {}", exercise.name, sets.join(", "));
        }
        let volume = workout.total_volume_kg();
        if volume > 0.0 {
            println!("\n  Volume:   {volume} kg");
        }
    }

    if let Some(notes) = &workout.notes {
        println!("\n  Notes: {notes}");
    }

    store.close().await;
    Ok(())
}

/// Handles the `wlog log <title>` command.
///
/// # Errors
///
/// Returns an error if a timestamp or exercise is malformed, or the workout
/// ends before it starts.
pub async fn handle_log(
    config: &WorkoutLogConfig,
    title: String,
    input: WorkoutInput,
) -> Result<()> {
    let started_at = match input.started_at.as_deref() {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };

    let mut workout = LoggedWorkout::new(title, started_at);
    workout.ended_at = input.ended_at.as_deref().map(parse_timestamp).transpose()?;
    workout.notes = input.notes;
    workout.exercises = input
        .exercises
        .iter()
        .map(String::as_str)
        .map(parse_exercise)
        .collect::<Result<_>>()?;
    validate_times(&workout)?;

    let mut store = open_loaded(config).await?;
    let stored = store.upsert(workout);
    store.close().await;

    println!("Logged workout '{}' ({}).", stored.title, short_id(stored.id));
    Ok(())
}

/// Handles the `wlog edit <id>` command.
///
/// # Errors
///
/// Returns an error if the workout does not exist or an input is malformed.
pub async fn handle_edit(config: &WorkoutLogConfig, id: &str, input: WorkoutInput) -> Result<()> {
    let mut store = open_loaded(config).await?;
    let id = resolve_id(&store, id)?;
    let mut workout = store
        .workout(id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    if let Some(title) = input.title {
        workout.title = title;
    }
    if let Some(value) = input.started_at.as_deref() {
        workout.started_at = parse_timestamp(value)?;
    }
    if let Some(value) = input.ended_at.as_deref() {
        workout.ended_at = Some(parse_timestamp(value)?);
    } else if input.clear_end {
        workout.ended_at = None;
    }
    if input.notes.is_some() {
        workout.notes = input.notes;
    } else if input.clear_notes {
        workout.notes = None;
    }
    validate_times(&workout)?;

    let stored = store.upsert(workout);
    store.close().await;

    println!("Updated workout '{}'.", stored.title);
    Ok(())
}

/// Handles the `wlog delete <id>` command.
///
/// # Errors
///
/// Returns an error if no such workout exists.
pub async fn handle_delete(config: &WorkoutLogConfig, id: &str) -> Result<()> {
    let mut store = open_loaded(config).await?;
    let id = resolve_id(&store, id)?;

    if !store.delete(id) {
        return Err(StoreError::NotFound(id.to_string()));
    }
    store.close().await;

    println!("Deleted workout {}.", short_id(id));
    Ok(())
}

/// Handles the `wlog clear` command.
///
/// # Errors
///
/// Returns an error if the confirmation prompt cannot be read.
pub async fn handle_clear(config: &WorkoutLogConfig, yes: bool) -> Result<()> {
    let mut store = open_loaded(config).await?;
    let count = store.len();

    if count == 0 && !store.path().exists() {
        println!("Nothing to clear.");
        return Ok(());
    }

    // Confirm deletion unless --yes is specified
    if !yes {
        print!("Delete all {count} logged workout(s)? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear_all();
    store.close().await;

    println!("Cleared {count} workout(s).");
    Ok(())
}

/// Handles the `wlog path` command.
///
/// # Errors
///
/// Returns an error if the log location cannot be determined.
pub fn handle_path(config: &WorkoutLogConfig) -> Result<()> {
    println!("{}", config.log_path()?.display());
    Ok(())
}

/// Handles the `wlog completions <shell>` command.
///
/// Generates shell completion scripts.
pub fn handle_completions(shell: ShellType) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};

    let mut cmd = crate::cli::Cli::command();
    let shell = match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
    };

    generate(shell, &mut cmd, "wlog", &mut std::io::stdout());

    Ok(())
}

async fn open_loaded(config: &WorkoutLogConfig) -> Result<WorkoutLogStore> {
    let mut store = WorkoutLogStore::open(config)?;
    store.load().await;
    Ok(store)
}

/// Resolves a full id or a unique prefix of one.
fn resolve_id(store: &WorkoutLogStore, input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let prefix = input.trim().to_ascii_lowercase();
    if prefix.len() < MIN_ID_PREFIX {
        return Err(StoreError::InvalidInput(format!(
            "'{input}' is not a workout id (use at least {MIN_ID_PREFIX} characters)"
        )));
    }

    let workouts = store.workouts();
    let mut matches = workouts
        .iter()
        .filter(|w| w.id.to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(workout), None) => Ok(workout.id),
        (None, _) => Err(StoreError::NotFound(input.to_string())),
        (Some(_), Some(_)) => Err(StoreError::InvalidInput(format!(
            "'{input}' matches more than one workout; use more characters"
        ))),
    }
}

/// Parses an RFC 3339 timestamp, or `now`.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }

    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::InvalidInput(format!(
                "'{value}' is not a valid time ({e}); expected e.g. 2024-01-02T10:00:00Z"
            ))
        })
}

/// Parses `NAME[:REPS[xKG],...]`.
pub(crate) fn parse_exercise(spec: &str) -> Result<LoggedExercise> {
    let (name, sets) = spec.split_once(':').unwrap_or((spec, ""));
    let name = name.trim();

    if name.is_empty() {
        return Err(StoreError::InvalidInput(format!(
            "exercise '{spec}' has no name"
        )));
    }

    let sets = sets
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|set| parse_set(set).ok_or_else(|| invalid_set(spec, set)))
        .collect::<Result<Vec<_>>>()?;

    Ok(LoggedExercise::new(name, sets))
}

fn parse_set(set: &str) -> Option<LoggedSet> {
    match set.split_once(['x', 'X']) {
        Some((reps, weight)) => {
            let weight: f64 = weight.trim().parse().ok()?;
            if !weight.is_finite() || weight < 0.0 {
                return None;
            }
            Some(LoggedSet::new(reps.trim().parse().ok()?, Some(weight)))
        }
        None => Some(LoggedSet::new(set.parse().ok()?, None)),
    }
}

fn invalid_set(spec: &str, set: &str) -> StoreError {
    StoreError::InvalidInput(format!(
        "invalid set '{set}' in exercise '{spec}'; expected REPS or REPSxKG"
    ))
}

fn validate_times(workout: &LoggedWorkout) -> Result<()> {
    match workout.ended_at {
        Some(ended_at) if ended_at < workout.started_at => Err(StoreError::InvalidInput(
            "a workout cannot end before it starts".to_string(),
        )),
        _ => Ok(()),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

fn format_set(set: &LoggedSet) -> String {
    match set.weight_kg {
        Some(kg) => format!("{}x{kg}", set.reps),
        None => set.reps.to_string(),
    }
}

fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::workout::{JsonLogFile, LogFile};

    fn temp_config() -> (TempDir, WorkoutLogConfig) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = WorkoutLogConfig::default();
        config.storage.data_dir = Some(temp_dir.path().to_path_buf());
        (temp_dir, config)
    }

    fn on_disk(config: &WorkoutLogConfig) -> Vec<LoggedWorkout> {
        JsonLogFile::at(config.log_path().unwrap())
            .read()
            .unwrap()
            .unwrap_or_default()
    }

    #[test]
    fn parse_timestamp_accepts_offsets() {
        let parsed = parse_timestamp("2024-01-02T11:00:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_now() {
        let before = Utc::now();
        let parsed = parse_timestamp("now").unwrap();
        assert!(parsed >= before);
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn parse_exercise_with_weighted_and_bodyweight_sets() {
        let exercise = parse_exercise("Bench press: 5x80, 5x82.5 ,8").unwrap();

        assert_eq!(exercise.name, "Bench press");
        assert_eq!(
            exercise.sets,
            vec![
                LoggedSet::new(5, Some(80.0)),
                LoggedSet::new(5, Some(82.5)),
                LoggedSet::new(8, None),
            ]
        );
    }

    #[test]
    fn parse_exercise_without_sets() {
        let exercise = parse_exercise("Plank").unwrap();
        assert_eq!(exercise.name, "Plank");
        assert!(exercise.sets.is_empty());
    }

    #[test]
    fn parse_exercise_rejects_bad_sets() {
        assert!(parse_exercise(":5x80").is_err());
        assert!(parse_exercise("Squat:fivex80").is_err());
        assert!(parse_exercise("Squat:5x-10").is_err());
        assert!(parse_exercise("Squat:-5").is_err());
    }

    #[test]
    fn format_duration_hours_and_minutes() {
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_duration(Duration::minutes(65)), "1h 05m");
    }

    #[tokio::test]
    async fn log_then_edit_then_delete() {
        let (_dir, config) = temp_config();

        handle_log(
            &config,
            "Push day".to_string(),
            WorkoutInput {
                started_at: Some("2024-01-02T10:00:00Z".to_string()),
                exercises: vec!["Bench press:5x80".to_string()],
                ..WorkoutInput::default()
            },
        )
        .await
        .unwrap();

        let logged = on_disk(&config);
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].exercises[0].sets.len(), 1);
        let id = logged[0].id.to_string();

        handle_edit(
            &config,
            &id[..MIN_ID_PREFIX + 2],
            WorkoutInput {
                notes: Some("felt strong".to_string()),
                ..WorkoutInput::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(on_disk(&config)[0].notes.as_deref(), Some("felt strong"));

        handle_delete(&config, &id).await.unwrap();
        assert!(on_disk(&config).is_empty());
    }

    #[tokio::test]
    async fn edit_can_clear_end_and_notes() {
        let (_dir, config) = temp_config();

        handle_log(
            &config,
            "Swim".to_string(),
            WorkoutInput {
                started_at: Some("2024-01-02T10:00:00Z".to_string()),
                ended_at: Some("2024-01-02T11:00:00Z".to_string()),
                notes: Some("pool was cold".to_string()),
                ..WorkoutInput::default()
            },
        )
        .await
        .unwrap();
        let id = on_disk(&config)[0].id.to_string();

        handle_edit(
            &config,
            &id,
            WorkoutInput {
                clear_end: true,
                clear_notes: true,
                ..WorkoutInput::default()
            },
        )
        .await
        .unwrap();

        let edited = &on_disk(&config)[0];
        assert_eq!(edited.title, "Swim");
        assert_eq!(edited.ended_at, None);
        assert_eq!(edited.notes, None);
    }

    #[tokio::test]
    async fn log_rejects_end_before_start() {
        let (_dir, config) = temp_config();

        let result = handle_log(
            &config,
            "Backwards".to_string(),
            WorkoutInput {
                started_at: Some("2024-01-02T10:00:00Z".to_string()),
                ended_at: Some("2024-01-02T09:00:00Z".to_string()),
                ..WorkoutInput::default()
            },
        )
        .await;

        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
        assert!(!config.log_path().unwrap().exists());
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let (_dir, config) = temp_config();
        let result = handle_delete(&config, &Uuid::new_v4().to_string()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn clear_with_yes_removes_file() {
        let (_dir, config) = temp_config();
        handle_log(&config, "Run".to_string(), WorkoutInput::default())
            .await
            .unwrap();
        assert!(config.log_path().unwrap().exists());

        handle_clear(&config, true).await.unwrap();

        assert!(!config.log_path().unwrap().exists());
    }

    #[tokio::test]
    async fn short_prefix_is_rejected() {
        let (_dir, config) = temp_config();
        let store = open_loaded(&config).await.unwrap();

        let err = resolve_id(&store, "ab").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }
}
