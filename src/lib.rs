//! Lumen semantic analysis
//!
//! Takes the AST of one compilation unit and produces a scoped,
//! type-annotated program plus diagnostics: symbol tables, type inference,
//! type checking with async-context rules, trait dispatch and match
//! exhaustiveness.

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod typechecker;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::AnalyzerConfig;
    pub use crate::diagnostics::{Diagnostic, DiagnosticBag, Severity, Span};
    pub use crate::typechecker::{analyze, Analysis, Type};
}
