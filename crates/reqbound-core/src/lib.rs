//! Core data types for reqbound.
//!
//! Versions and their ordering, constraint records, the requirement-line
//! parser, requirement sets loaded from files, and project configuration.
//!
//! This crate performs no network I/O.

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "reqbound.toml";

pub mod config;
pub mod constraint;
pub mod manifest;
pub mod parser;
pub mod version;
