use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focusplan-cli", version, about = "Focusplan task ranking and day planning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank tasks from a snapshot
    Rank(commands::rank::RankArgs),
    /// Plan one day from a snapshot
    Plan(commands::plan::PlanArgs),
    /// Preferences management
    Prefs {
        /// Preferences file (defaults to ~/.config/focusplan/preferences.toml)
        #[arg(long, global = true)]
        file: Option<std::path::PathBuf>,
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Show the modeled energy curve
    Energy(commands::energy::EnergyArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Rank(args) => commands::rank::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Prefs { file, action } => commands::prefs::run(action, file),
        Commands::Energy(args) => commands::energy::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
