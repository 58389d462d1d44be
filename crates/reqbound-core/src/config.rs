use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqbound_util::errors::ReqboundError;

use crate::CONFIG_FILE_NAME;

/// Environment variable overriding `[resolve] unfreeze`.
pub const UNFREEZE_ENV: &str = "REQBOUND_UNFREEZE";

/// Project configuration loaded from `reqbound.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub ci: CiConfig,
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub unfreeze: UnfreezeMode,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// CI detection settings from `[ci]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiConfig {
    /// Environment variables whose truthy value means "running in CI".
    #[serde(default = "default_ci_env")]
    pub env: Vec<String>,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            env: default_ci_env(),
        }
    }
}

fn default_ci_env() -> Vec<String> {
    vec!["CI".to_string()]
}

/// How non-strict upper bounds are treated outside CI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnfreezeMode {
    /// Keep every bound.
    None,
    /// Widen upper bounds to the next major release.
    Major,
    /// Drop upper bounds.
    #[default]
    All,
}

impl FromStr for UnfreezeMode {
    type Err = ReqboundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "major" => Ok(Self::Major),
            "all" => Ok(Self::All),
            other => Err(ReqboundError::Config {
                message: format!("unknown unfreeze mode `{other}` (expected none, major or all)"),
            }),
        }
    }
}

impl fmt::Display for UnfreezeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Major => "major",
            Self::All => "all",
        })
    }
}

/// What to do when a package name appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    LastWins,
}

impl ProjectConfig {
    /// Load `reqbound.toml` from `start` or its nearest ancestor holding one,
    /// or return defaults if there is none.
    pub fn load(start: &Path) -> miette::Result<Self> {
        match reqbound_util::fs::find_ancestor_with(start, CONFIG_FILE_NAME) {
            Some(dir) => Self::from_path(&dir.join(CONFIG_FILE_NAME)),
            None => Ok(Self::default()),
        }
    }

    /// Load and parse a specific config file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReqboundError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            ReqboundError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ReqboundError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read environment variables.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ReqboundError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(UNFREEZE_ENV) {
            self.resolve.unfreeze = raw.parse()?;
            tracing::debug!("{UNFREEZE_ENV} overrides unfreeze mode to {}", self.resolve.unfreeze);
        }
        Ok(())
    }

    /// Whether the process environment says we are running in CI.
    pub fn is_ci(&self) -> bool {
        self.is_ci_with(|key| std::env::var(key).ok())
    }

    /// Like [`is_ci`](Self::is_ci) with an explicit environment lookup.
    pub fn is_ci_with<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        self.ci
            .env
            .iter()
            .any(|key| lookup(key).is_some_and(|value| is_truthy(&value)))
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !matches!(value.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Path of the config file that [`ProjectConfig::load`] would read, if any.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    reqbound_util::fs::find_ancestor_with(start, CONFIG_FILE_NAME)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
}
