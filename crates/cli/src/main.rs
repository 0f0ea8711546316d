//! Entry point for the command-line interface.
//! Delegates to dedicated modules for argument handling,
//! parsing, analysis and output formatting.

use anyhow::Context;
use smaliscan::analyze::run_analyze;
use smaliscan::args::{parse_cli, Commands};
use smaliscan::config::load_config;
use smaliscan::parse::run_parse;
use smaliscan::ui;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    let level = cli.log_filter();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    debug!(?level, "Logging initialised");
    if !cli.quiet {
        ui::print_header();
    }

    let config = load_config().context("failed to load configuration")?;
    match cli.command {
        Commands::Parse(args) => run_parse(args, &config.scan, cli.quiet),
        Commands::Analyze(args) => run_analyze(args, &config.graph),
    }
}
