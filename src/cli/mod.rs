//! Command-line interface for the Lumen analyzer
//!
//! Provides commands: check, explain

mod check_cmd;
mod explain_cmd;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::Result;
use crate::logging::{LogFormat, LogLevel};

/// Lumen - semantic analysis for Lumen programs
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity (overrides LUMEN_LOG)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format (overrides LUMEN_LOG_FORMAT)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze JSON compilation units and report diagnostics
    Check {
        /// AST files produced by the parser
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output diagnostics as JSON lines
        #[arg(long)]
        json: bool,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Configuration file (defaults to ./lumen.toml when present)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Explain a diagnostic code in detail
    Explain {
        /// Diagnostic code to explain (e.g., TC010, TRAIT009)
        code: String,
    },
}

impl Cli {
    /// Run the parsed command
    pub fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Check {
                files,
                json,
                strict,
                config,
            } => check_cmd::run_check(&files, strict, json, config.as_deref()),
            Command::Explain { code } => {
                explain_cmd::run_explain(&code)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
