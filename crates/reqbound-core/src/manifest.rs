//! Requirement sets: the records of one requirements file and its includes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use reqbound_util::errors::ReqboundError;

use crate::config::DuplicatePolicy;
use crate::constraint::ConstraintRecord;
use crate::parser::{self, Entry};

/// Origin label used for in-memory text.
pub const INPUT_ORIGIN: &str = "<input>";

/// Where a record was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub origin: String,
    pub line: usize,
}

/// An ordered set of constraint records, unique by normalized name.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    records: Vec<ConstraintRecord>,
    locations: Vec<SourceLocation>,
    index: HashMap<String, usize>,
    policy: DuplicatePolicy,
}

impl RequirementSet {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Parse in-memory requirement text, aborting at the first error.
    ///
    /// Include lines are rejected since there is no file to resolve them against.
    pub fn parse_str(text: &str, policy: DuplicatePolicy) -> Result<Self, ReqboundError> {
        let mut loader = Loader::new(policy, false);
        loader.load_text(INPUT_ORIGIN, None, text)?;
        Ok(loader.set)
    }

    /// Load a requirements file and everything it includes, aborting at the
    /// first error.
    pub fn from_path(path: &Path, policy: DuplicatePolicy) -> Result<Self, ReqboundError> {
        let mut loader = Loader::new(policy, false);
        loader.load_file(path)?;
        Ok(loader.set)
    }

    /// Load several files into one set, in order.
    pub fn from_paths<P: AsRef<Path>>(
        paths: &[P],
        policy: DuplicatePolicy,
    ) -> Result<Self, ReqboundError> {
        let mut loader = Loader::new(policy, false);
        for path in paths {
            loader.load_file(path.as_ref())?;
        }
        Ok(loader.set)
    }

    /// Load like [`from_paths`](Self::from_paths) but keep going past errors,
    /// returning the partial set with every error encountered.
    pub fn collect_errors<P: AsRef<Path>>(
        paths: &[P],
        policy: DuplicatePolicy,
    ) -> (Self, Vec<ReqboundError>) {
        let mut loader = Loader::new(policy, true);
        for path in paths {
            if let Err(err) = loader.load_file(path.as_ref()) {
                loader.errors.push(err);
            }
        }
        (loader.set, loader.errors)
    }

    /// Add a record, applying the duplicate policy.
    pub fn insert(
        &mut self,
        origin: &str,
        line: usize,
        record: ConstraintRecord,
    ) -> Result<(), ReqboundError> {
        let key = record.normalized_name();
        let location = SourceLocation {
            origin: origin.to_string(),
            line,
        };
        match self.index.get(&key).copied() {
            Some(idx) => match self.policy {
                DuplicatePolicy::Reject => Err(ReqboundError::DuplicatePackage {
                    origin: origin.to_string(),
                    name: record.name,
                    first_origin: self.locations[idx].origin.clone(),
                    first_line: self.locations[idx].line,
                    line,
                }),
                DuplicatePolicy::LastWins => {
                    tracing::warn!(
                        "{}:{} replaces earlier entry for `{}` ({}:{})",
                        origin,
                        line,
                        record.name,
                        self.locations[idx].origin,
                        self.locations[idx].line
                    );
                    self.records[idx] = record;
                    self.locations[idx] = location;
                    Ok(())
                }
            },
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
                self.locations.push(location);
                Ok(())
            }
        }
    }

    pub fn records(&self) -> &[ConstraintRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintRecord> {
        self.records.iter()
    }

    /// Records paired with where they were read from.
    pub fn iter_located(&self) -> impl Iterator<Item = (&ConstraintRecord, &SourceLocation)> {
        self.records.iter().zip(self.locations.iter())
    }

    /// Look up a record by name (normalized, so `Typing_Extensions` finds
    /// `typing-extensions`).
    pub fn get(&self, name: &str) -> Option<&ConstraintRecord> {
        let key = crate::constraint::normalize_name(name);
        self.index.get(&key).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A new set with every record transformed by `f`, keeping order and
    /// source locations.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(&ConstraintRecord) -> ConstraintRecord,
    {
        Self {
            records: self.records.iter().map(f).collect(),
            locations: self.locations.clone(),
            index: self.index.clone(),
            policy: self.policy,
        }
    }

    /// Render one requirement line per record.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_string());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a ConstraintRecord;
    type IntoIter = std::slice::Iter<'a, ConstraintRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Walks a file and its `-r` includes depth-first into one set.
struct Loader {
    set: RequirementSet,
    /// Files currently being loaded, for cycle detection.
    stack: Vec<PathBuf>,
    /// Files already fully loaded; a second include of one is a no-op.
    done: HashSet<PathBuf>,
    keep_going: bool,
    errors: Vec<ReqboundError>,
}

impl Loader {
    fn new(policy: DuplicatePolicy, keep_going: bool) -> Self {
        Self {
            set: RequirementSet::new(policy),
            stack: Vec::new(),
            done: HashSet::new(),
            keep_going,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, err: ReqboundError) -> Result<(), ReqboundError> {
        if self.keep_going {
            self.errors.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<(), ReqboundError> {
        let canonical = match std::fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) => {
                return self.fail(ReqboundError::Generic {
                    message: format!("Failed to read {}: {e}", path.display()),
                })
            }
        };
        if self.stack.contains(&canonical) {
            return self.fail(ReqboundError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }
        if self.done.contains(&canonical) {
            tracing::debug!("{} already loaded, skipping", path.display());
            return Ok(());
        }

        let text = match std::fs::read_to_string(&canonical) {
            Ok(t) => t,
            Err(e) => return self.fail(ReqboundError::Io(e)),
        };

        tracing::debug!("loading requirements from {}", path.display());
        self.stack.push(canonical.clone());
        let origin = path.display().to_string();
        let result = self.load_text(&origin, Some(path), &text);
        self.stack.pop();
        self.done.insert(canonical);
        result
    }

    fn load_text(&mut self, origin: &str, file: Option<&Path>, text: &str) -> Result<(), ReqboundError> {
        for parsed in parser::lines(origin, text) {
            let parsed = match parsed {
                Ok(p) => p,
                Err(e) => {
                    self.fail(e)?;
                    continue;
                }
            };
            match parsed.entry {
                Entry::Constraint(record) => {
                    if let Err(e) = self.set.insert(origin, parsed.line, record) {
                        self.fail(e)?;
                    }
                }
                Entry::Include(target) => match file {
                    Some(file) => {
                        let include = reqbound_util::fs::resolve_sibling(file, &target);
                        tracing::debug!("{origin}:{} includes {}", parsed.line, include.display());
                        self.load_file(&include)?;
                    }
                    None => {
                        self.fail(ReqboundError::MalformedConstraint {
                            origin: origin.to_string(),
                            line: parsed.line,
                            text: parsed.text,
                            reason: "includes are only supported when loading from a file"
                                .to_string(),
                        })?;
                    }
                },
                Entry::Skipped(_) => {}
            }
        }
        Ok(())
    }
}
