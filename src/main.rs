//! Lumen CLI - semantic analysis for Lumen programs

use clap::Parser;
use std::process::ExitCode;

use lumen::cli::Cli;
use lumen::logging::{init_logging, LogOptions};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogOptions::resolve(cli.log_format, cli.log_level));

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}
