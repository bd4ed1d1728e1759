//! Handler for the `lumen explain` subcommand.

use crate::diagnostics::explain;
use crate::error::{LumenError, Result};

pub(crate) fn run_explain(code: &str) -> Result<()> {
    println!("{}", explanation(code)?);
    Ok(())
}

/// `CODE: text`, with the code matched case-insensitively
pub(super) fn explanation(code: &str) -> Result<String> {
    let normalized = code.trim().to_ascii_uppercase();
    explain(&normalized)
        .map(|text| format!("{}: {}", normalized, text))
        .ok_or_else(|| LumenError::UnknownCode(code.to_string()))
}
