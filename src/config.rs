//! Analyzer configuration (lumen.toml)

use crate::ast::TypeExpr;
use crate::diagnostics::Span;
use crate::error::{LumenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to the analyzed input
pub const CONFIG_FILE: &str = "lumen.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub analysis: AnalysisOptions,

    /// Extra intrinsic callables: name to return type
    pub intrinsics: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Treat warnings as failures in `lumen check`
    pub strict: bool,

    /// Report comparisons between incompatible operand types (TC006)
    pub strict_comparisons: bool,

    /// Severity of an async function's return type mismatch (TC031)
    pub async_return_mismatch: MismatchLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchLevel {
    #[default]
    Warning,
    Error,
}

impl AnalyzerConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LumenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| LumenError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `lumen.toml` from `dir` if it exists, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Intrinsics declared in the file, with return types parsed
    pub fn intrinsic_types(&self) -> Result<Vec<(String, TypeExpr)>> {
        self.intrinsics
            .iter()
            .map(|(name, ty)| {
                parse_type_name(ty)
                    .map(|expr| (name.clone(), expr))
                    .ok_or_else(|| LumenError::Intrinsic {
                        name: name.clone(),
                        ty: ty.clone(),
                    })
            })
            .collect()
    }
}

/// Parse the small type syntax accepted in configuration values:
/// `Name`, `T?` and `[T]`
pub fn parse_type_name(text: &str) -> Option<TypeExpr> {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix('?') {
        return Some(TypeExpr::Optional {
            span: Span::default(),
            inner: Box::new(parse_type_name(inner)?),
        });
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return Some(TypeExpr::Array {
            span: Span::default(),
            element: Box::new(parse_type_name(inner)?),
        });
    }
    let mut chars = text.chars();
    let first = chars.next()?;
    if !first.is_alphabetic() || !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(TypeExpr::Named {
        span: Span::default(),
        name: text.to_string(),
        args: Vec::new(),
    })
}

/// Resolve the configuration for a run: an explicit `--config` path wins,
/// otherwise `lumen.toml` in the working directory is used when present
pub fn resolve(explicit: Option<&Path>) -> Result<AnalyzerConfig> {
    match explicit {
        Some(path) => AnalyzerConfig::load(path),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            AnalyzerConfig::discover(&cwd)
        }
    }
}
