//! Requirement-line parser.
//!
//! Each line is one of: blank, a full-line `#` comment, a pip option
//! (`-r other.txt` is reported as an include, anything else is skipped), or a
//! constraint `name[extras] <op><version>[, <op><version>][; marker]  # comment`.

use reqbound_util::errors::ReqboundError;

use crate::constraint::{Bound, ConstraintRecord, Operator};
use crate::version::Version;

/// Word in an inline comment that keeps a record's upper bound in production.
pub const STRICT_MARKER: &str = "strict";

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Constraint(ConstraintRecord),
    /// `-r path` / `--requirement path`, relative to the including file.
    Include(String),
    Skipped(SkipReason),
}

/// Why a line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Comment,
    PipOption,
}

/// A parsed line with its 1-based line number and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub line: usize,
    pub text: String,
    pub entry: Entry,
}

/// Parse one line of requirement text.
///
/// `origin` and `line` only label the error on failure.
pub fn parse_line(origin: &str, line: usize, text: &str) -> Result<Entry, ReqboundError> {
    classify(text).map_err(|reason| ReqboundError::MalformedConstraint {
        origin: origin.to_string(),
        line,
        text: text.trim_end().to_string(),
        reason,
    })
}

/// Parse every line of `text`, yielding one result per line.
///
/// The iterator does not stop at a malformed line; callers that want to
/// abort use `collect::<Result<Vec<_>, _>>()` or `?` on each item.
/// A leading UTF-8 byte order mark is ignored.
pub fn lines<'a>(
    origin: &'a str,
    text: &'a str,
) -> impl Iterator<Item = Result<ParsedLine, ReqboundError>> + 'a {
    text.lines().enumerate().map(move |(idx, raw)| {
        let line = idx + 1;
        let raw = if idx == 0 {
            raw.strip_prefix('\u{feff}').unwrap_or(raw)
        } else {
            raw
        };
        parse_line(origin, line, raw).map(|entry| ParsedLine {
            line,
            text: raw.trim_end().to_string(),
            entry,
        })
    })
}

/// Whether an inline comment carries the strict marker as a standalone word.
pub fn is_strict_comment(comment: &str) -> bool {
    comment
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(STRICT_MARKER))
}

fn classify(text: &str) -> Result<Entry, String> {
    let (body, comment) = match text.split_once('#') {
        Some((body, comment)) => (body.trim(), Some(comment)),
        None => (text.trim(), None),
    };

    if body.is_empty() {
        let reason = if comment.is_some() {
            SkipReason::Comment
        } else {
            SkipReason::Blank
        };
        return Ok(Entry::Skipped(reason));
    }

    if body.starts_with('-') {
        return option_line(body);
    }

    let mut record = constraint(body)?;
    record.strict = comment.is_some_and(is_strict_comment);
    Ok(Entry::Constraint(record))
}

fn option_line(body: &str) -> Result<Entry, String> {
    let path = ["--requirement", "-r"].iter().find_map(|flag| {
        let rest = body.strip_prefix(flag)?;
        if let Some(path) = rest.strip_prefix('=') {
            Some(path)
        } else if *flag == "-r" || rest.is_empty() || rest.starts_with(char::is_whitespace) {
            Some(rest)
        } else {
            None
        }
    });

    match path {
        Some(path) => {
            let path = path.trim();
            if path.is_empty() {
                Err("missing path after -r".to_string())
            } else {
                Ok(Entry::Include(path.to_string()))
            }
        }
        None => {
            tracing::debug!("skipping pip option line `{body}`");
            Ok(Entry::Skipped(SkipReason::PipOption))
        }
    }
}

fn constraint(body: &str) -> Result<ConstraintRecord, String> {
    let (req, marker) = match body.split_once(';') {
        Some((req, marker)) => {
            let marker = marker.trim();
            if marker.is_empty() {
                return Err("empty environment marker after `;`".to_string());
            }
            (req.trim(), Some(marker.to_string()))
        }
        None => (body, None),
    };

    let name_end = req
        .find(|c: char| !is_name_char(c))
        .unwrap_or(req.len());
    let name = &req[..name_end];
    validate_name(name)?;
    let mut rest = req[name_end..].trim_start();

    let mut extras = Vec::new();
    if let Some(after) = rest.strip_prefix('[') {
        let (list, tail) = after
            .split_once(']')
            .ok_or_else(|| "unclosed `[` in extras".to_string())?;
        for extra in list.split(',') {
            let extra = extra.trim();
            validate_name(extra).map_err(|e| format!("bad extra: {e}"))?;
            extras.push(extra.to_string());
        }
        rest = tail.trim_start();
    }

    let mut record = ConstraintRecord {
        extras,
        marker,
        ..ConstraintRecord::unbounded(name)
    };

    if rest.is_empty() {
        return Ok(record);
    }

    for clause in rest.split(',') {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err("empty version clause".to_string());
        }
        let (op, version) = split_clause(clause)?;
        apply_clause(&mut record, op, version)?;
    }

    if let (Some(lower), Some(upper)) = (&record.min_version, &record.max_version) {
        let empty = match lower.version.cmp(&upper.version) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => !(lower.inclusive && upper.inclusive),
            std::cmp::Ordering::Less => false,
        };
        if empty {
            return Err("lower bound is above upper bound".to_string());
        }
    }

    Ok(record)
}

fn split_clause(clause: &str) -> Result<(Operator, Version), String> {
    for unsupported in ["===", "~=", "!="] {
        if clause.starts_with(unsupported) {
            return Err(format!("unsupported operator `{unsupported}`"));
        }
    }
    let (op, raw) = Operator::split_prefix(clause)
        .ok_or_else(|| format!("expected an operator before `{clause}`"))?;
    let raw = raw.trim();
    let version = Version::parse(raw).ok_or_else(|| format!("invalid version `{raw}`"))?;
    Ok((op, version))
}

fn apply_clause(record: &mut ConstraintRecord, op: Operator, version: Version) -> Result<(), String> {
    if record.pinned {
        return Err("an exact pin cannot be combined with other bounds".to_string());
    }
    match op {
        Operator::Gt | Operator::Ge => {
            if record.min_version.is_some() {
                return Err("more than one lower bound".to_string());
            }
            record.min_version = Some(Bound {
                version,
                inclusive: op == Operator::Ge,
            });
        }
        Operator::Lt | Operator::Le => {
            if record.max_version.is_some() {
                return Err("more than one upper bound".to_string());
            }
            record.max_version = Some(Bound {
                version,
                inclusive: op == Operator::Le,
            });
        }
        Operator::Eq => {
            if record.min_version.is_some() || record.max_version.is_some() {
                return Err("an exact pin cannot be combined with other bounds".to_string());
            }
            record.min_version = Some(Bound::inclusive(version.clone()));
            record.max_version = Some(Bound::inclusive(version));
            record.pinned = true;
        }
    }
    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("missing package name".to_string());
    }
    let first_last_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !first_last_ok || !name.chars().all(is_name_char) {
        return Err(format!("invalid package name `{name}`"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> ConstraintRecord {
        match parse_line("<test>", 1, text).unwrap() {
            Entry::Constraint(rec) => rec,
            other => panic!("expected a constraint, got {other:?}"),
        }
    }

    fn reason(text: &str) -> String {
        match parse_line("<test>", 7, text).unwrap_err() {
            ReqboundError::MalformedConstraint { reason, line, .. } => {
                assert_eq!(line, 7);
                reason
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let skip = |t: &str| parse_line("<test>", 1, t).unwrap();
        assert_eq!(skip(""), Entry::Skipped(SkipReason::Blank));
        assert_eq!(skip("   \t"), Entry::Skipped(SkipReason::Blank));
        assert_eq!(skip("# NOTE: strict"), Entry::Skipped(SkipReason::Comment));
        assert_eq!(skip("   # numpy >1.0"), Entry::Skipped(SkipReason::Comment));
    }

    #[test]
    fn two_bound_line() {
        let rec = record("transformers >4.4.0, <4.52.0");
        assert_eq!(rec.name, "transformers");
        let lower = rec.min_version.unwrap();
        assert_eq!(lower.version.to_string(), "4.4.0");
        assert!(!lower.inclusive);
        let upper = rec.max_version.unwrap();
        assert_eq!(upper.version.to_string(), "4.52.0");
        assert!(!upper.inclusive);
        assert!(!rec.strict);
    }

    #[test]
    fn no_space_before_operator() {
        let rec = record("numpy>=1.20.0,<2.0");
        assert_eq!(rec.name, "numpy");
        assert!(rec.min_version.unwrap().inclusive);
        assert!(!rec.max_version.unwrap().inclusive);
    }

    #[test]
    fn strict_inline_comment() {
        assert!(record("torch >=2.0.0, <2.8.0  # strict").strict);
        assert!(record("torch >=2.0.0, <2.8.0  # keep Strict, see #123").strict);
        assert!(!record("torch >=2.0.0, <2.8.0  # restricted build").strict);
        assert!(!record("torch >=2.0.0, <2.8.0  # pinned for CI").strict);
    }

    #[test]
    fn bare_name() {
        let rec = record("packaging");
        assert!(rec.min_version.is_none());
        assert!(rec.max_version.is_none());
    }

    #[test]
    fn exact_pin() {
        let rec = record("scipy ==1.11.4");
        assert!(rec.pinned);
        assert_eq!(rec.min_version, rec.max_version);
    }

    #[test]
    fn extras_and_marker() {
        let rec = record("lightning[extra, test] >=2.0; python_version >= \"3.9\"  # strict");
        assert_eq!(rec.extras, vec!["extra", "test"]);
        assert_eq!(rec.marker.as_deref(), Some("python_version >= \"3.9\""));
        assert!(rec.strict);
    }

    #[test]
    fn include_lines() {
        let inc = |t: &str| parse_line("<test>", 1, t).unwrap();
        assert_eq!(inc("-r base.txt"), Entry::Include("base.txt".to_string()));
        assert_eq!(inc("-rbase.txt"), Entry::Include("base.txt".to_string()));
        assert_eq!(
            inc("--requirement=extra/audio.txt"),
            Entry::Include("extra/audio.txt".to_string())
        );
        assert_eq!(
            inc("--requirement  test.txt  # tests"),
            Entry::Include("test.txt".to_string())
        );
    }

    #[test]
    fn other_options_skipped() {
        assert_eq!(
            parse_line("<test>", 1, "--extra-index-url https://download.pytorch.org/whl/cpu")
                .unwrap(),
            Entry::Skipped(SkipReason::PipOption)
        );
        assert_eq!(
            parse_line("<test>", 1, "--requirements-only").unwrap(),
            Entry::Skipped(SkipReason::PipOption)
        );
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(reason("numpy 1.0"), "expected an operator before `1.0`");
        assert_eq!(reason("numpy >>1.0"), "invalid version `>1.0`");
        assert_eq!(reason("numpy ~=1.0"), "unsupported operator `~=`");
        assert_eq!(reason("numpy >1.0,"), "empty version clause");
        assert_eq!(reason("numpy >1.0, >2.0"), "more than one lower bound");
        assert_eq!(reason("numpy <1.0, <=2.0"), "more than one upper bound");
        assert_eq!(
            reason("numpy ==1.0, <2"),
            "an exact pin cannot be combined with other bounds"
        );
        assert_eq!(reason("numpy >2.0, <1.0"), "lower bound is above upper bound");
        assert_eq!(reason("numpy >=1.0, <1.0"), "lower bound is above upper bound");
        assert_eq!(reason(">=1.0"), "missing package name");
        assert_eq!(reason("-r   "), "missing path after -r");
        assert_eq!(reason("numpy[audio >1.0"), "unclosed `[` in extras");
        assert_eq!(reason("numpy >1.0;"), "empty environment marker after `;`");
    }

    #[test]
    fn malformed_error_keeps_raw_text() {
        let err = parse_line("reqs.txt", 4, "torch >=two  # strict").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed constraint at reqs.txt:4: `torch >=two  # strict` (invalid version `two`)"
        );
    }

    #[test]
    fn lines_numbers_every_line() {
        let text = "# header\n\nnumpy >1.0\nbad line here\n";
        let results: Vec<_> = lines("<test>", text).collect();
        assert_eq!(results.len(), 4);
        assert_eq!(results[2].as_ref().unwrap().line, 3);
        assert_eq!(results[3].as_ref().unwrap_err().line(), Some(4));
    }

    #[test]
    fn lines_ignore_leading_byte_order_mark() {
        let text = "\u{feff}numpy >1.0\ntorch >=2.0\n";
        let parsed: Vec<ParsedLine> = lines("<test>", text).map(Result::unwrap).collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "numpy >1.0");
        match &parsed[0].entry {
            Entry::Constraint(rec) => assert_eq!(rec.name, "numpy"),
            other => panic!("expected a constraint, got {other:?}"),
        }
    }
}
