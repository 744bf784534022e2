use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;

use commands::block::BlockCommand;
use commands::disasm::DisasmCommand;

#[derive(Parser)]
#[command(name = "kestrel", version, about = "Kestrel bytecode tools")]
struct Cli {
    /// Configuration file (default: nearest kestrel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Disassemble a raw bytecode file
    Disasm(DisasmCommand),
    /// Print the raw blocks of a block directive
    Block(BlockCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_level))?,
        )
        .init();

    match cli.command {
        Commands::Disasm(cmd) => cmd.run(&config)?,
        Commands::Block(cmd) => cmd.run()?,
    }

    Ok(())
}
