//! CLI module for wlog.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ShellType};
