//! Command dispatch and handler modules.

mod check;
mod list;
mod resolve;

use miette::Result;

use reqbound_core::config::ProjectConfig;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config()?;
    match cli.command {
        Command::Check { files, keep_going } => check::exec(&files, keep_going, &config),
        Command::List { files } => list::exec(&files, &config),
        Command::Resolve {
            files,
            ci,
            unfreeze,
            format,
            output,
        } => resolve::exec(
            &files,
            ci,
            unfreeze.as_deref(),
            &format,
            output.as_deref(),
            &config,
        ),
    }
}

/// Load `reqbound.toml` from the working directory upwards, then apply
/// environment overrides.
fn load_config() -> Result<ProjectConfig> {
    let cwd = std::env::current_dir().map_err(reqbound_util::errors::ReqboundError::Io)?;
    let mut config = ProjectConfig::load(&cwd)?;
    config.apply_env()?;
    tracing::debug!(
        "unfreeze: {}, duplicates: {:?}",
        config.resolve.unfreeze,
        config.resolve.duplicates
    );
    Ok(config)
}
