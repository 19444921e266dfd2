//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Log workouts to a local JSON file.
///
/// Workouts are listed most recent first. Every change is written to
/// `logged_workouts_v1.json` in your documents directory.
#[derive(Parser, Debug)]
#[command(name = "wlog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the workout log (overrides config and `WLOG_DATA_DIR`).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List logged workouts, most recent first.
    List {
        /// Show at most this many workouts.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one workout in detail.
    Show {
        /// Workout identifier (as printed by `wlog list`).
        id: String,
    },

    /// Log a new workout.
    Log {
        /// Title, e.g. "Push day".
        title: String,

        /// Start time (RFC 3339, e.g. 2024-01-02T10:00:00Z). Defaults to now.
        #[arg(short, long, value_name = "TIME")]
        started_at: Option<String>,

        /// End time (RFC 3339, or "now").
        #[arg(short, long, value_name = "TIME")]
        ended_at: Option<String>,

        /// Free-form notes.
        #[arg(long)]
        notes: Option<String>,

        /// Exercise as NAME:SETS, where SETS is a comma-separated list of
        /// REPS or REPSxKG (e.g. "Bench press:5x80,5x80"). Repeatable.
        #[arg(short = 'x', long = "exercise", value_name = "NAME:SETS")]
        exercises: Vec<String>,
    },

    /// Change fields of an existing workout.
    Edit {
        /// Workout identifier.
        id: String,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New start time (RFC 3339, or "now").
        #[arg(short, long, value_name = "TIME")]
        started_at: Option<String>,

        /// New end time (RFC 3339, or "now").
        #[arg(short, long, value_name = "TIME")]
        ended_at: Option<String>,

        /// Remove the end time.
        #[arg(long, conflicts_with = "ended_at")]
        clear_end: bool,

        /// Replace the notes.
        #[arg(long)]
        notes: Option<String>,

        /// Remove the notes.
        #[arg(long, conflicts_with = "notes")]
        clear_notes: bool,
    },

    /// Delete a workout.
    Delete {
        /// Workout identifier.
        id: String,
    },

    /// Delete every workout and the log file.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the location of the workout log file.
    Path,

    /// Generate shell completion scripts.
    ///
    /// Outputs completion script for the specified shell.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: ShellType,
    },
}

/// Supported shell types for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}
