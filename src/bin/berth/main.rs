//! berth CLI - dependency resolution for Go workspaces

use anyhow::Result;
use berth::util::GlobalContext;
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
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_color(!cli.no_color);
    // An interrupted run must not leave the shared cache locked
    ctx.cache_lock().release_on_interrupt()?;

    match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &ctx),
        Commands::Import(args) => commands::import::execute(args, &ctx),
        Commands::Locate(args) => commands::locate::execute(args, &ctx),
        Commands::Versions(args) => commands::versions::execute(args, &ctx),
        Commands::Cache(args) => commands::cache::execute(args, &ctx),
    }
}
