//! wlog - log workouts to a local JSON file.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use workout_log::cli::commands::{self, WorkoutInput};
use workout_log::cli::{Cli, Commands};
use workout_log::config::settings::env;
use workout_log::{load_config, Result};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run the command
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    match cli.command {
        Commands::List { limit } => commands::handle_list(&config, limit).await,
        Commands::Show { id } => commands::handle_show(&config, &id).await,
        Commands::Log {
            title,
            started_at,
            ended_at,
            notes,
            exercises,
        } => {
            let input = WorkoutInput {
                started_at,
                ended_at,
                notes,
                exercises,
                ..WorkoutInput::default()
            };
            commands::handle_log(&config, title, input).await
        }
        Commands::Edit {
            id,
            title,
            started_at,
            ended_at,
            clear_end,
            notes,
            clear_notes,
        } => {
            let input = WorkoutInput {
                title,
                started_at,
                ended_at,
                notes,
                exercises: Vec::new(),
                clear_end,
                clear_notes,
            };
            commands::handle_edit(&config, &id, input).await
        }
        Commands::Delete { id } => commands::handle_delete(&config, &id).await,
        Commands::Clear { yes } => commands::handle_clear(&config, yes).await,
        Commands::Path => commands::handle_path(&config),
        Commands::Completions { shell } => commands::handle_completions(shell),
    }
}
