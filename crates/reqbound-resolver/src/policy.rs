//! The bound relaxation policy.
//!
//! Upper bounds in a requirements file exist for CI stability. Outside CI
//! every non-strict upper bound is relaxed according to the [`UnfreezeMode`];
//! lower bounds, exact pins and strict upper bounds are always kept.

use reqbound_core::config::{ProjectConfig, UnfreezeMode};
use reqbound_core::constraint::{Bound, ConstraintRecord};
use reqbound_core::manifest::RequirementSet;
use serde::Serialize;

use crate::report::{BoundChange, RelaxationReport};

/// Where the requirement set is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    pub ci: bool,
    pub mode: UnfreezeMode,
}

impl ResolveContext {
    /// Production installation with upper bounds dropped.
    pub fn production() -> Self {
        Self {
            ci: false,
            mode: UnfreezeMode::All,
        }
    }

    /// Continuous integration: every bound is enforced.
    pub fn ci() -> Self {
        Self {
            ci: true,
            mode: UnfreezeMode::None,
        }
    }

    /// Build a context from configuration; `force_ci` wins over detection.
    pub fn from_config(config: &ProjectConfig, force_ci: bool) -> Self {
        Self {
            ci: force_ci || config.is_ci(),
            mode: config.resolve.unfreeze,
        }
    }

    /// The mode actually applied: CI always keeps every bound.
    pub fn effective_mode(&self) -> UnfreezeMode {
        if self.ci {
            UnfreezeMode::None
        } else {
            self.mode
        }
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::production()
    }
}

/// A relaxed requirement set with the list of changed bounds.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub set: RequirementSet,
    pub report: RelaxationReport,
    pub mode: UnfreezeMode,
}

/// Serializable view of a [`Resolution`].
#[derive(Debug, Serialize)]
pub struct ResolutionView<'a> {
    pub mode: UnfreezeMode,
    pub requirements: &'a [ConstraintRecord],
    pub relaxed: &'a [BoundChange],
}

impl Resolution {
    pub fn view(&self) -> ResolutionView<'_> {
        ResolutionView {
            mode: self.mode,
            requirements: self.set.records(),
            relaxed: &self.report.changes,
        }
    }
}

/// Relax one record under `mode`, returning the new record and what changed.
pub fn relax_record(
    record: &ConstraintRecord,
    mode: UnfreezeMode,
) -> (ConstraintRecord, Option<BoundChange>) {
    let mut relaxed = record.clone();
    if record.strict || record.pinned {
        return (relaxed, None);
    }
    let Some(upper) = record.max_version.as_ref() else {
        return (relaxed, None);
    };
    let from = format!("{}{}", upper.upper_op(), upper.version);

    match mode {
        UnfreezeMode::None => (relaxed, None),
        UnfreezeMode::All => {
            relaxed.max_version = None;
            let change = BoundChange {
                name: record.name.clone(),
                from,
                to: None,
            };
            (relaxed, Some(change))
        }
        UnfreezeMode::Major => {
            if !upper.inclusive && upper.version.is_major_boundary() {
                return (relaxed, None);
            }
            let to = match upper.version.next_major() {
                Some(next) => {
                    let widened = Bound::exclusive(next);
                    let to = format!("{}{}", widened.upper_op(), widened.version);
                    relaxed.max_version = Some(widened);
                    Some(to)
                }
                // Major component is u64::MAX.
                None => {
                    relaxed.max_version = None;
                    None
                }
            };
            let change = BoundChange {
                name: record.name.clone(),
                from,
                to,
            };
            (relaxed, Some(change))
        }
    }
}

/// Apply the relaxation policy to a whole set.
pub fn relax(set: &RequirementSet, ctx: &ResolveContext) -> Resolution {
    let mode = ctx.effective_mode();
    let mut report = RelaxationReport::new();
    let relaxed = set.map(|record| {
        let (record, change) = relax_record(record, mode);
        if let Some(change) = change {
            tracing::debug!("{change}");
            report.add(change);
        }
        record
    });
    tracing::info!(
        "resolved {} requirements (ci: {}, unfreeze: {}), {} upper bounds relaxed",
        relaxed.len(),
        ctx.ci,
        mode,
        report.len()
    );
    Resolution {
        set: relaxed,
        report,
        mode,
    }
}
