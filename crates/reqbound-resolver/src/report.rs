//! Reporting of bounds changed by relaxation.

use std::fmt;

use serde::Serialize;

/// Every upper bound that relaxation changed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RelaxationReport {
    pub changes: Vec<BoundChange>,
}

/// A single upper bound that was dropped or widened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundChange {
    pub name: String,
    /// The original upper bound clause, e.g. `<4.52.0`.
    pub from: String,
    /// The replacement clause, or `None` when the bound was dropped.
    pub to: Option<String>,
}

impl RelaxationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, change: BoundChange) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn dropped(&self) -> impl Iterator<Item = &BoundChange> {
        self.changes.iter().filter(|c| c.to.is_none())
    }
}

impl fmt::Display for RelaxationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            return write!(f, "No upper bounds relaxed.");
        }
        writeln!(f, "Relaxed upper bounds ({}):", self.changes.len())?;
        for c in &self.changes {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BoundChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(ref to) => write!(f, "{}: {} -> {}", self.name, self.from, to),
            None => write!(f, "{}: {} dropped", self.name, self.from),
        }
    }
}
