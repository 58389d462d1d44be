//! Handler for `reqbound resolve`.

use std::path::{Path, PathBuf};

use miette::Result;

use reqbound_core::config::{ProjectConfig, UnfreezeMode};
use reqbound_resolver::resolver::{self, OutputFormat, ResolveOptions};
use reqbound_util::progress;

pub fn exec(
    files: &[PathBuf],
    ci: bool,
    unfreeze: Option<&str>,
    format: &str,
    output: Option<&Path>,
    config: &ProjectConfig,
) -> Result<()> {
    let opts = ResolveOptions {
        force_ci: ci,
        mode: unfreeze.map(str::parse::<UnfreezeMode>).transpose()?,
    };
    let format: OutputFormat = format.parse()?;

    let resolution = resolver::resolve_files(files, config, &opts)?;

    for change in &resolution.report.changes {
        progress::status_info("Relaxed", &change.to_string());
    }

    match output {
        Some(path) => {
            resolver::write_rendered(&resolution, format, path)?;
            progress::status(
                "Resolved",
                &format!(
                    "{} requirements (unfreeze: {}) -> {}",
                    resolution.set.len(),
                    resolution.mode,
                    path.display()
                ),
            );
        }
        None => print!("{}", resolver::render(&resolution, format)?),
    }
    Ok(())
}
