//! Package version parsing and comparison.
//!
//! Versions follow the PEP 440 public-version subset used in requirement
//! files:
//! - An optional leading `v`
//! - A numeric release `N(.N)*`, trailing zeros ignored when comparing
//! - An optional pre-release `aN`, `bN` or `rcN` (`alpha`, `beta`, `c`, `pre`,
//!   `preview` are accepted spellings)
//! - Optional `.postN` and `.devN` suffixes
//! - An optional `+local` label, ignored by ordering
//!
//! Ordering: `1.0.dev0 < 1.0a1 < 1.0rc1 < 1.0 < 1.0.post1`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// A parsed package version with comparable components.
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

/// Pre-release phases in ascending order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

/// Sort key for the pre-release slot.
///
/// A version with only a `.dev` suffix sorts below every pre-release of the
/// same release; a final release sorts above them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum PreKey {
    DevOnly,
    Pre(PreKind, u64),
    Final,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Version {
    /// Parse a version string. Returns `None` when it is not a valid version.
    pub fn parse(version: &str) -> Option<Self> {
        let original = version.trim();
        if original.is_empty() {
            return None;
        }
        let lowered = original.to_ascii_lowercase();
        let public = match lowered.split_once('+') {
            Some((public, local)) => {
                if local.is_empty()
                    || !local
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
                {
                    return None;
                }
                public
            }
            None => lowered.as_str(),
        };
        let rest = public.strip_prefix('v').unwrap_or(public);

        let mut scanner = Scanner::new(rest);
        let release = scanner.release()?;
        let pre = scanner.pre()?;
        let post = scanner.suffix(&["post", "rev", "r"])?;
        let dev = scanner.suffix(&["dev"])?;
        if !scanner.is_done() {
            return None;
        }

        Some(Self {
            original: original.to_string(),
            release,
            pre,
            post,
            dev,
        })
    }

    /// The first release component.
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(0)
    }

    /// Whether this is a bare `N`, `N.0`, `N.0.0`... release.
    pub fn is_major_boundary(&self) -> bool {
        self.release.iter().skip(1).all(|&n| n == 0)
            && self.pre.is_none()
            && self.post.is_none()
            && self.dev.is_none()
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The first version of the next major series, e.g. `4.52.0` gives `5`.
    ///
    /// `None` when the major component is already `u64::MAX`.
    pub fn next_major(&self) -> Option<Self> {
        let next = self.major().checked_add(1)?;
        Some(Self {
            original: next.to_string(),
            release: vec![next],
            pre: None,
            post: None,
            dev: None,
        })
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            (None, None, Some(_)) => PreKey::DevOnly,
            _ => PreKey::Final,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            // No post-release sorts below any post-release.
            .then_with(|| self.post.cmp(&other.post))
            // No dev-release sorts above any dev-release.
            .then_with(|| match (self.dev, other.dev) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let max_len = a.len().max(b.len());
    for i in 0..max_len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        let ord = x.cmp(&y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Cursor over the lowercased public part of a version string.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    fn is_done(&self) -> bool {
        self.rest.is_empty()
    }

    fn number(&mut self) -> Option<u64> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let n = self.rest[..end].parse().ok()?;
        self.rest = &self.rest[end..];
        Some(n)
    }

    /// Optional number, defaulting to 0 (`1.0rc` means `1.0rc0`).
    fn implicit_number(&mut self) -> u64 {
        if self.rest.starts_with(|c: char| c.is_ascii_digit()) {
            self.number().unwrap_or(0)
        } else {
            0
        }
    }

    fn release(&mut self) -> Option<Vec<u64>> {
        let mut parts = vec![self.number()?];
        while let Some(after_dot) = self.rest.strip_prefix('.') {
            if !after_dot.starts_with(|c: char| c.is_ascii_digit()) {
                break;
            }
            self.rest = after_dot;
            parts.push(self.number()?);
        }
        Some(parts)
    }

    fn skip_separator(&mut self) {
        if let Some(stripped) = self.rest.strip_prefix(['.', '-', '_']) {
            self.rest = stripped;
        }
    }

    /// Outer `None` means malformed; inner `None` means absent.
    #[allow(clippy::option_option)]
    fn pre(&mut self) -> Option<Option<(PreKind, u64)>> {
        let saved = self.rest;
        self.skip_separator();
        // Longest spellings first so `alpha` is not read as `a` + `lpha`.
        const SPELLINGS: &[(&str, PreKind)] = &[
            ("preview", PreKind::Rc),
            ("alpha", PreKind::Alpha),
            ("beta", PreKind::Beta),
            ("pre", PreKind::Rc),
            ("rc", PreKind::Rc),
            ("a", PreKind::Alpha),
            ("b", PreKind::Beta),
            ("c", PreKind::Rc),
        ];
        for (spelling, kind) in SPELLINGS {
            if let Some(stripped) = self.rest.strip_prefix(spelling) {
                self.rest = stripped;
                self.skip_separator();
                return Some(Some((*kind, self.implicit_number())));
            }
        }
        self.rest = saved;
        Some(None)
    }

    #[allow(clippy::option_option)]
    fn suffix(&mut self, spellings: &[&str]) -> Option<Option<u64>> {
        let saved = self.rest;
        self.skip_separator();
        for spelling in spellings {
            if let Some(stripped) = self.rest.strip_prefix(spelling) {
                self.rest = stripped;
                self.skip_separator();
                return Some(Some(self.implicit_number()));
            }
        }
        self.rest = saved;
        Some(None)
    }
}
