use clap::Parser;
use colored::Colorize;
use tracing::Level;

mod cli;
mod commands;
mod config;
mod editor;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = commands::run_command(cli) {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so console output on stdout stays exact.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
