use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use typewiz::cli::args::CliArgs;
use typewiz::cli::driver;

fn main() -> Result<()> {
    // Initialize tracing if TYPEWIZ_LOG or RUST_LOG is set (zero cost otherwise).
    // Supports TYPEWIZ_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    typewiz::tracing_config::init_tracing();

    let mut args = CliArgs::parse();
    let stdout = std::io::stdout();
    if !stdout.is_terminal() {
        args.no_color = true;
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    driver::run(&args, &cwd, &mut stdout.lock())
}
