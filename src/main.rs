use clap::Parser;
use pairscout::commands;
use pairscout::types::AssetClass;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// --- CLI Argument Parsing ---
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    verbose: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Screen each asset class for mean-reverting pairs and backtest them
    Run {
        /// Directory holding the collected per-instrument CSV files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Directory the results tables are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// JSON file overriding configuration defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Asset classes to screen (defaults to all of stock, crypto, fx)
        #[arg(long, value_enum)]
        asset: Vec<AssetClass>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.verbose).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match &cli.command {
        Commands::Run {
            data_dir,
            output_dir,
            config,
            asset,
        } => commands::run_pipeline(data_dir, output_dir, config.as_ref(), asset),
    }
}
