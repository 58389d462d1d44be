use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all reqbound operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ReqboundError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requirement line could not be parsed.
    #[error("Malformed constraint at {origin}:{line}: `{text}` ({reason})")]
    #[diagnostic(
        code(reqbound::malformed_constraint),
        help("Expected `name <op><version>[, <op><version>]` with op one of >, >=, <, <=, ==")
    )]
    MalformedConstraint {
        origin: String,
        line: usize,
        text: String,
        reason: String,
    },

    /// The same package is listed more than once.
    #[error("Duplicate package `{name}` at {origin}:{line} (first listed at {first_origin}:{first_line})")]
    #[diagnostic(
        code(reqbound::duplicate_package),
        help("Merge the entries or set `duplicates = \"last-wins\"` under [resolve] in reqbound.toml")
    )]
    DuplicatePackage {
        origin: String,
        name: String,
        first_origin: String,
        first_line: usize,
        line: usize,
    },

    /// A `-r` include chain loops back on itself.
    #[error("Include cycle detected at {}", path.display())]
    IncludeCycle { path: PathBuf },

    /// Invalid or unreadable `reqbound.toml`.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your reqbound.toml for syntax errors"))]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl ReqboundError {
    /// Line number of the offending entry, for parse-level errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedConstraint { line, .. } | Self::DuplicatePackage { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type ReqboundResult<T> = miette::Result<T>;
