//! Shared utilities for reqbound.
//!
//! Cross-cutting concerns used by the other reqbound crates: the unified
//! error type, filesystem helpers, and Cargo-style terminal status lines.

pub mod errors;
pub mod fs;
pub mod progress;
