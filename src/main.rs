use anyhow::Result;
use bondterm::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for bondterm::AppCommand {
    fn from(cmd: Commands) -> bondterm::AppCommand {
        match cmd {
            Commands::Board { select } => bondterm::AppCommand::Board { select },
            Commands::Watch { select } => bondterm::AppCommand::Watch { select },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display tiles, detail chart and yield curve once
    Board {
        /// Instrument shown in the detail view
        #[arg(short, long)]
        select: Option<String>,
    },
    /// Display the dashboard and select instruments interactively
    Watch {
        /// Instrument shown in the detail view at start
        #[arg(short, long)]
        select: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => bondterm::cli::setup::setup(),
        Some(cmd) => bondterm::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
