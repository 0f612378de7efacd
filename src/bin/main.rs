use celltrack::config::{self, Settings, SettingsEvent};
use celltrack::{CellTrackError, CellTrackResult, HostEvent, InteractiveSession, ShadowDocument};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// Track executed notebook cells in their source files
#[derive(Parser)]
#[command(name = "celltrack")]
#[command(version)]
#[command(about = "Track executed notebook cells in their source files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded host events and print the resulting cell hashes
    Replay {
        /// JSON Lines file with one host event per line
        events: PathBuf,

        /// Settings file (default: celltrack.toml in the current directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also print the shadow document text
        #[arg(long)]
        shadow: bool,

        /// Path the shadow document is named after
        #[arg(long, default_value = "interactive.py")]
        shadow_file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            events,
            config,
            shadow,
            shadow_file,
        } => replay(&events, config.as_deref(), shadow, &shadow_file),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn replay(
    events_path: &Path,
    config_path: Option<&Path>,
    print_shadow: bool,
    shadow_file: &Path,
) -> CellTrackResult<()> {
    let settings = load_settings(config_path)?;
    let shadow_path = std::env::current_dir()?.join(shadow_file);
    let mut session =
        InteractiveSession::from_settings(ShadowDocument::from_path(&shadow_path)?, &settings);

    let contents = fs::read_to_string(events_path)?;
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: HostEvent = serde_json::from_str(line)
            .map_err(|err| CellTrackError::replay(index + 1, err.to_string()))?;
        if let Some(notification) = session.dispatch(event) {
            log::debug!(target: "celltrack::replay", "{}", notification.into_message());
        }
    }

    println!("{}", serde_json::to_string_pretty(&session.file_hashes())?);
    if print_shadow {
        println!("{}", session.shadow().text());
    }
    Ok(())
}

fn load_settings(config_path: Option<&Path>) -> CellTrackResult<Settings> {
    match config_path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        }
        None => {
            let outcome = config::load_settings(Some(&std::env::current_dir()?), None);
            outcome.events.iter().for_each(SettingsEvent::log);
            Ok(outcome.settings)
        }
    }
}
