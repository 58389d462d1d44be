//! CLI argument definitions for reqbound.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "reqbound",
    version,
    about = "Parse requirement files and relax CI-only upper bounds",
    long_about = "reqbound reads requirement files whose upper version bounds exist only for CI \
                  stability. Outside CI those bounds are dropped (or widened) unless the entry \
                  carries a `# strict` comment."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate requirement files
    Check {
        /// Requirement files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Report every problem instead of stopping at the first
        #[arg(long)]
        keep_going: bool,
    },

    /// Show the parsed constraint records
    List {
        /// Requirement files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print requirements with the relaxation policy applied
    Resolve {
        /// Requirement files to resolve
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Resolve for CI: keep every bound
        #[arg(long)]
        ci: bool,
        /// How to treat non-strict upper bounds: none, major, all
        #[arg(long, value_parser = ["none", "major", "all"])]
        unfreeze: Option<String>,
        /// Output format: text, json
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
