use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "radialday-cli", version, about = "Radialday CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Day overview
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Block management
    Block {
        #[command(subcommand)]
        action: commands::block::BlockAction,
    },
    /// Dial angle/time conversions
    Dial {
        #[command(subcommand)]
        action: commands::dial::DialAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
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
        Commands::Day { action } => commands::day::run(action),
        Commands::Block { action } => commands::block::run(action),
        Commands::Dial { action } => commands::dial::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
