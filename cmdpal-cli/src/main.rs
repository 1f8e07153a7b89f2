//! cmdpal CLI - keyboard-driven command palette
//!
//! This is the main entry point for the cmdpal command-line tool, which provides:
//! - A terminal UI with a hover menu bar and a searchable palette (`run`)
//! - Headless listing of the filtered, grouped catalog (`list`)
//! - Headless selection and execution of one entry (`exec`)
//! - Config management (`config`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod catalog;
mod commands;
mod config;
mod tracing_setup;
mod tui;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "cmdpal",
    author,
    version,
    about = "Searchable, keyboard-driven command palette for the terminal",
    long_about = "Define commands in ~/.cmdpal/config.toml, then filter and run them from a \
                  palette overlay, a hover menu bar, or straight from the shell."
)]
struct Cli {
    /// Config file (defaults to $CMDPAL_CONFIG or ~/.cmdpal/config.toml)
    #[arg(long, short = 'c', global = true, env = "CMDPAL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive palette (default)
    Run(RunArgs),
    /// Print commands matching a query, grouped by category
    List(commands::ListArgs),
    /// Select a command by query and run it without the UI
    Exec(commands::ExecArgs),
    /// Manage the config file
    Config(config::ConfigArgs),
}

#[derive(Parser, Debug, Default)]
struct RunArgs {
    /// Log file while the UI owns the terminal (default: ~/.cmdpal/cmdpal.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    let config_path = cli.config.as_deref();

    let log_file = match &command {
        Commands::Run(args) => Some(
            args.log_file
                .clone()
                .unwrap_or_else(|| cmdpal_core::PaletteConfig::home_dir().join("cmdpal.log")),
        ),
        _ => None,
    };
    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        log_file,
    })
    .ok();

    match command {
        Commands::Run(_) => {
            let palette_config = config::load(config_path)?;
            tui::run(palette_config)?
        }
        Commands::List(args) => {
            let palette_config = config::load(config_path)?;
            commands::run_list(args, &palette_config)?
        }
        Commands::Exec(args) => {
            let palette_config = config::load(config_path)?;
            commands::run_exec(args, &palette_config)?
        }
        Commands::Config(args) => config::run_config(args, config_path)?,
    }

    Ok(())
}
