//! Bound relaxation engine: decides which upper bounds survive when a
//! requirement set is resolved for CI or for production installation.

pub mod policy;
pub mod report;
pub mod resolver;
