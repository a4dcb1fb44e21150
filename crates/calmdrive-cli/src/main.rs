use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "calmdrive-cli", version, about = "CalmDrive CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guided breathing sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Driving detection and interaction policy
    Driving {
        #[command(subcommand)]
        action: commands::driving::DrivingAction,
    },
    /// Media URL resolution
    Media {
        #[command(subcommand)]
        action: commands::media::MediaAction,
    },
    /// Built-in exercises
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Session statistics
    Stats {
        /// Also list this many recent sessions
        #[arg(long, default_value = "0")]
        recent: usize,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Driving { action } => commands::driving::run(action),
        Commands::Media { action } => commands::media::run(action),
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { recent } => commands::stats::run(recent),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "calmdrive-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
