//! Errors raised by the driver surface (file loading, configuration).
//!
//! Problems in the analyzed program are never errors here; they are
//! diagnostics in the analysis result.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LumenError {
    #[error("failed to read `{}`", path.display())]
    #[diagnostic(code(lumen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not a valid AST document", path.display())]
    #[diagnostic(
        code(lumen::ast),
        help("`lumen check` expects the JSON compilation unit produced by the parser")
    )]
    Ast {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration in `{}`", path.display())]
    #[diagnostic(
        code(lumen::config),
        help("see `[analysis]` and `[intrinsics]` in the lumen.toml reference")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("intrinsic `{name}` has an unsupported return type `{ty}`")]
    #[diagnostic(
        code(lumen::config::intrinsic),
        help("use a type name, optionally wrapped as `[T]` or suffixed with `?`")
    )]
    Intrinsic { name: String, ty: String },

    #[error("unknown diagnostic code `{0}`")]
    #[diagnostic(code(lumen::explain))]
    UnknownCode(String),
}

pub type Result<T, E = LumenError> = std::result::Result<T, E>;
