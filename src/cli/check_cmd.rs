//! Handler for the `lumen check` subcommand.

use std::path::Path;
use std::process::ExitCode;

use crate::ast::CompilationUnit;
use crate::config::{self, AnalyzerConfig};
use crate::diagnostics::DiagnosticBag;
use crate::error::{LumenError, Result};
use crate::typechecker::analyze;

/// Counts from checking a single file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct CheckCounts {
    pub(super) errors: usize,
    pub(super) warnings: usize,
}

pub(crate) fn run_check(
    files: &[std::path::PathBuf],
    strict: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let config = config::resolve(config_path)?;
    // Reject bad intrinsic types up front instead of silently skipping them
    config.intrinsic_types()?;
    let strict = strict || config.analysis.strict;

    let mut total = CheckCounts::default();
    for path in files {
        let counts = check_file(path, &config, json)?;
        total.errors += counts.errors;
        total.warnings += counts.warnings;
    }

    let (summary, failed) = summarize(files.len(), total, strict);
    if failed {
        eprintln!("\n{}", summary);
        Ok(ExitCode::FAILURE)
    } else {
        println!("{}", summary);
        Ok(ExitCode::SUCCESS)
    }
}

pub(super) fn load_unit(path: &Path) -> Result<CompilationUnit> {
    let content = std::fs::read_to_string(path).map_err(|source| LumenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut unit: CompilationUnit =
        serde_json::from_str(&content).map_err(|source| LumenError::Ast {
            path: path.to_path_buf(),
            source,
        })?;
    if unit.name.is_empty() {
        unit.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(unit)
}

pub(super) fn check_file(path: &Path, config: &AnalyzerConfig, json: bool) -> Result<CheckCounts> {
    let unit = load_unit(path)?;
    let analysis = analyze(&unit, config);
    let bag = &analysis.diagnostics;

    if !bag.is_empty() {
        let rendered = render(path, bag, json);
        if json {
            println!("{}", rendered);
        } else {
            eprintln!("{}", rendered);
        }
    }

    Ok(CheckCounts {
        errors: bag.error_count(),
        warnings: bag.warning_count(),
    })
}

/// One JSON object per line, or human-readable blocks under a file header
pub(super) fn render(path: &Path, bag: &DiagnosticBag, json: bool) -> String {
    if json {
        bag.diagnostics()
            .iter()
            .map(|d| d.to_json())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        format!("==> {}\n{}", path.display(), bag.format_text())
    }
}

/// Summary line and whether the check failed
pub(super) fn summarize(files: usize, counts: CheckCounts, strict: bool) -> (String, bool) {
    let failed = counts.errors > 0 || (strict && counts.warnings > 0);
    if failed {
        let mut parts = Vec::new();
        if counts.errors > 0 {
            parts.push(format!("{} error(s)", counts.errors));
        }
        if counts.warnings > 0 {
            if strict {
                parts.push(format!(
                    "{} warning(s) [treated as errors with --strict]",
                    counts.warnings
                ));
            } else {
                parts.push(format!("{} warning(s)", counts.warnings));
            }
        }
        (format!("Checked {} file(s), found {}", files, parts.join(", ")), true)
    } else if counts.warnings > 0 {
        (
            format!("Checked {} file(s), no errors ({} warning(s))", files, counts.warnings),
            false,
        )
    } else {
        (format!("Checked {} file(s), no errors found", files), false)
    }
}
