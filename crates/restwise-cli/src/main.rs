use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use restwise_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "restwise", version, about = "Restwise CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily load analysis and burnout risk
    Analyze(commands::analyze::AnalyzeArgs),
    /// Suggest recovery breaks for a day
    Breaks(commands::breaks::BreaksArgs),
    /// Check a proposed block for conflicts
    Check(commands::check::CheckArgs),
    /// List blocks that apply on a day
    Blocks(commands::blocks::BlocksArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    // A broken config file is reported once logging is up.
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    init_tracing(&config);
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "falling back to default configuration");
    }

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, &config),
        Commands::Breaks(args) => commands::breaks::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Blocks(args) => commands::blocks::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
