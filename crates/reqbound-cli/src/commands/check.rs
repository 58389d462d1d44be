//! Handler for `reqbound check`.

use std::path::PathBuf;

use miette::Result;

use reqbound_core::config::ProjectConfig;
use reqbound_core::manifest::RequirementSet;
use reqbound_util::progress;

pub fn exec(files: &[PathBuf], keep_going: bool, config: &ProjectConfig) -> Result<()> {
    let policy = config.resolve.duplicates;

    if !keep_going {
        let set = RequirementSet::from_paths(files, policy)?;
        report_ok(&set, files.len());
        return Ok(());
    }

    let (set, errors) = RequirementSet::collect_errors(files, policy);
    if errors.is_empty() {
        report_ok(&set, files.len());
        return Ok(());
    }
    for err in &errors {
        progress::status_error("error", &err.to_string());
    }
    Err(miette::miette!(
        "{} problem(s) found in {} file(s)",
        errors.len(),
        files.len()
    ))
}

fn report_ok(set: &RequirementSet, files: usize) {
    if set.is_empty() {
        progress::status_warn("Empty", "no requirements found");
        return;
    }
    let strict = set.iter().filter(|r| r.strict).count();
    progress::status(
        "Checked",
        &format!(
            "{} requirements in {} file(s), {} strict",
            set.len(),
            files,
            strict
        ),
    );
}
