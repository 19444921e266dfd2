//! Command implementations.

pub mod workout;

pub use workout::{
    handle_clear, handle_completions, handle_delete, handle_edit, handle_list, handle_log,
    handle_path, handle_show, WorkoutInput,
};
