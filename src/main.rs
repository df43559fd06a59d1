mod cli;
mod commands;
mod config;
mod engine;
mod logging;
mod paths;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Declaration file override
    pub file: Option<PathBuf>,
    /// State file override
    pub state: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.quiet);

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        file: cli.file.map(|p| paths::expand(&p.to_string_lossy())),
        state: cli.state.map(|p| paths::expand(&p.to_string_lossy())),
    };
    log::trace!("Verbosity level {}", ctx.verbose);

    match cli.command {
        Command::Plan => commands::plan::run(&ctx),
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Refresh => commands::refresh::run(&ctx),
        Command::Import { key, id } => commands::import::run(&ctx, &key, &id),
        Command::Destroy { yes, dry_run } => commands::destroy::run(&ctx, yes, dry_run),
        Command::List { json } => commands::list::run(&ctx, json),
        Command::Info => commands::info::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "xata-provider", &mut io::stdout());
            Ok(())
        }
    }
}
