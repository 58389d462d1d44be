//! Handler for `reqbound list`.

use std::path::PathBuf;

use miette::Result;

use reqbound_core::config::ProjectConfig;
use reqbound_core::manifest::RequirementSet;

pub fn exec(files: &[PathBuf], config: &ProjectConfig) -> Result<()> {
    let set = RequirementSet::from_paths(files, config.resolve.duplicates)?;

    if set.is_empty() {
        println!("No requirements.");
        return Ok(());
    }

    println!("{:<32} {:<16} {:<16} Strict", "Package", "Lower", "Upper");
    println!("{}", "-".repeat(72));
    for record in &set {
        let (lower, upper) = if record.pinned {
            let pin = record.clauses().join("");
            (pin, "-".to_string())
        } else {
            let lower = record
                .min_version
                .as_ref()
                .map(|b| format!("{}{}", b.lower_op(), b.version))
                .unwrap_or_else(|| "-".to_string());
            let upper = record
                .max_version
                .as_ref()
                .map(|b| format!("{}{}", b.upper_op(), b.version))
                .unwrap_or_else(|| "-".to_string());
            (lower, upper)
        };
        let strict = if record.strict { "yes" } else { "no" };
        println!("{:<32} {:<16} {:<16} {}", record.name, lower, upper, strict);
    }
    Ok(())
}
