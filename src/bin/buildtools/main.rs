//! Buildtools CLI - build helpers for CMake projects and Sphinx documentation

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for echoed commands and tool output
    let filter = if cli.verbose {
        EnvFilter::new("buildtools=debug")
    } else {
        EnvFilter::new("buildtools=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Cpp(args) => commands::cpp::execute(args),
        Commands::Docs(args) => commands::docs::execute(args),
        Commands::Move(args) => commands::mv::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
