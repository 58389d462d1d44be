//! Constraint records: a package name plus version bounds.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::version::Version;

/// A comparison operator accepted in a requirement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Operator {
    /// Longest spellings first so `>=` is not read as `>` followed by `=...`.
    const SPELLINGS: [(&'static str, Operator); 5] = [
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        ("==", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ];

    /// Split a leading operator off `clause`, returning it with the remainder.
    pub fn split_prefix(clause: &str) -> Option<(Self, &str)> {
        Self::SPELLINGS
            .iter()
            .find_map(|(s, op)| clause.strip_prefix(s).map(|rest| (*op, rest)))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::split_prefix(s) {
            Some((op, "")) => Ok(op),
            _ => Err(format!("unknown operator `{s}`")),
        }
    }
}

/// One side of a version range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }

    /// Operator used when this bound is rendered as a lower bound.
    pub fn lower_op(&self) -> Operator {
        if self.inclusive {
            Operator::Ge
        } else {
            Operator::Gt
        }
    }

    /// Operator used when this bound is rendered as an upper bound.
    pub fn upper_op(&self) -> Operator {
        if self.inclusive {
            Operator::Le
        } else {
            Operator::Lt
        }
    }
}

/// A package name with optional version bounds.
///
/// An exact pin (`==v`) is stored as an inclusive lower and upper bound on
/// the same version with `pinned` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    pub min_version: Option<Bound>,
    pub max_version: Option<Bound>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
    pub strict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl ConstraintRecord {
    /// A record with no bounds.
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            min_version: None,
            max_version: None,
            pinned: false,
            strict: false,
            marker: None,
        }
    }

    /// Name normalized for identity comparisons (`Foo_Bar.baz` -> `foo-bar-baz`).
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Whether `version` satisfies both bounds.
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.min_version {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.max_version {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }

    /// The version clauses in rendering order, e.g. `[">4.4.0", "<4.52.0"]`.
    pub fn clauses(&self) -> Vec<String> {
        if self.pinned {
            if let Some(ref pin) = self.min_version {
                return vec![format!("{}{}", Operator::Eq, pin.version)];
            }
        }
        let mut clauses = Vec::with_capacity(2);
        if let Some(ref lower) = self.min_version {
            clauses.push(format!("{}{}", lower.lower_op(), lower.version));
        }
        if let Some(ref upper) = self.max_version {
            clauses.push(format!("{}{}", upper.upper_op(), upper.version));
        }
        clauses
    }
}

/// Renders as a requirement line, e.g. `transformers >4.4.0, <4.52.0  # strict`.
impl fmt::Display for ConstraintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let clauses = self.clauses();
        if !clauses.is_empty() {
            write!(f, " {}", clauses.join(", "))?;
        }
        if let Some(ref marker) = self.marker {
            write!(f, "; {marker}")?;
        }
        if self.strict {
            f.write_str("  # strict")?;
        }
        Ok(())
    }
}

/// Normalize a package name: lowercase, runs of `-`, `_`, `.` become one `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}
