use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use payload_capture_cli::cli::{cmd_inspect, cmd_validate, InspectArgs, ValidateArgs};
use payload_capture_cli::init_tracing;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a capture config and summarise its rules
    Validate(ValidateArgs),

    /// Run a recorded exchange through the capture pipeline
    Inspect(InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Validate(args) => cmd_validate(args),
        Commands::Inspect(args) => cmd_inspect(args),
    };

    if let Err(err) = result {
        error!("Command failed: {:#}", err);
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
