//! `docgen` command line entry point

use clap::Parser;
use docgen::cli::{run, Cli, EXIT_FAILURE};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let status = run(&cli, &mut io::stdout(), &mut io::stderr()).unwrap_or(EXIT_FAILURE);
    ExitCode::from(status)
}
