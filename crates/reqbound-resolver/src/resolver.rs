//! Operation: load requirement files and resolve them for CI or production.

use std::path::{Path, PathBuf};

use reqbound_core::config::{ProjectConfig, UnfreezeMode};
use reqbound_core::manifest::RequirementSet;
use reqbound_util::errors::{ReqboundError, ReqboundResult};

use crate::policy::{self, Resolution, ResolveContext};

/// Options for a resolution run.
#[derive(Debug, Default, Clone)]
pub struct ResolveOptions {
    /// Treat the run as CI regardless of the environment.
    pub force_ci: bool,
    /// Override the configured unfreeze mode.
    pub mode: Option<UnfreezeMode>,
}

/// The context a run with `opts` uses under `config`.
pub fn context_for(config: &ProjectConfig, opts: &ResolveOptions) -> ResolveContext {
    let mut ctx = ResolveContext::from_config(config, opts.force_ci);
    if let Some(mode) = opts.mode {
        ctx.mode = mode;
    }
    ctx
}

/// Load `paths` (following includes) and apply the relaxation policy.
pub fn resolve_files(
    paths: &[PathBuf],
    config: &ProjectConfig,
    opts: &ResolveOptions,
) -> ReqboundResult<Resolution> {
    let set = RequirementSet::from_paths(paths, config.resolve.duplicates)?;
    let ctx = context_for(config, opts);
    Ok(policy::relax(&set, &ctx))
}

/// Resolve in-memory requirement text under an explicit context.
pub fn resolve_str(
    text: &str,
    config: &ProjectConfig,
    ctx: &ResolveContext,
) -> ReqboundResult<Resolution> {
    let set = RequirementSet::parse_str(text, config.resolve.duplicates)?;
    Ok(policy::relax(&set, ctx))
}

/// How a resolution is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One requirement line per record.
    #[default]
    Text,
    /// The record set and relaxation report as pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ReqboundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ReqboundError::Generic {
                message: format!("unknown output format `{other}` (expected text or json)"),
            }),
        }
    }
}

/// Render a resolution in `format`.
pub fn render(resolution: &Resolution, format: OutputFormat) -> ReqboundResult<String> {
    match format {
        OutputFormat::Text => Ok(resolution.set.render()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&resolution.view()).map_err(|e| {
                ReqboundError::Generic {
                    message: format!("Failed to serialize resolution: {e}"),
                }
            })?;
            Ok(json + "\n")
        }
    }
}

/// Write the rendered resolution to `out`.
pub fn write_rendered(
    resolution: &Resolution,
    format: OutputFormat,
    out: &Path,
) -> ReqboundResult<()> {
    let rendered = render(resolution, format)?;
    std::fs::write(out, rendered).map_err(ReqboundError::Io)?;
    tracing::debug!("wrote {} requirements to {}", resolution.set.len(), out.display());
    Ok(())
}
