use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::path::{Path, PathBuf};

use crate::client::GITHUB_API_BASE;
use crate::enrich::DEFAULT_CONCURRENCY;

/// Port the HTTP boundary listens on by default.
pub const DEFAULT_LISTEN_PORT: u16 = 5000;

/// Config file consulted before the per-user one.
pub const LOCAL_CONFIG_FILE: &str = "config/config.toml";

/// Configuration for reposcope.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (REPOSCOPE_* prefix)
/// 3. Config file (./config/config.toml, then ~/.config/reposcope/config.toml)
/// 4. Built-in defaults (lowest priority)
///
/// Numeric and boolean keys also accept their string form, since that is how
/// environment variables arrive.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub token. Raises the quota from 60 to 5000 calls per hour.
    ///
    /// Can be set via:
    /// - CLI: --token
    /// - ENV: REPOSCOPE_GITHUB_TOKEN
    /// - Config: github_token = "..."
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API.
    pub github_api_url: String,

    /// Ceiling on concurrent language lookups per request.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub max_parallel_tasks: usize,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub listen_port: u16,

    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,

    /// Emit one JSON object per log line.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_url: GITHUB_API_BASE.to_string(),
            max_parallel_tasks: DEFAULT_CONCURRENCY,
            listen_port: DEFAULT_LISTEN_PORT,
            log_level: "debug".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from the default file location and environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file
    /// location when given.
    ///
    /// An explicit path must exist; a missing default file is skipped.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        let config_path = match path {
            Some(path) => {
                anyhow::ensure!(path.exists(), "Config file not found: {}", path.display());
                Some(path.to_path_buf())
            }
            None => Some(config_file_path()).filter(|p| p.exists()),
        };

        if let Some(config_path) = config_path {
            log::debug!("Loading config from {}", config_path.display());
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("reposcope");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// The token, if one is set and non-empty.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Concurrency ceiling, never below one.
    pub fn max_parallel_tasks(&self) -> usize {
        self.max_parallel_tasks.max(1)
    }

    /// A copy safe to print: the token, if any, is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.github_token().is_some() {
            config.github_token = Some("********".to_string());
        }
        config
    }
}

/// Get the config file path.
///
/// Returns `./config/config.toml` when it exists, otherwise:
/// - Linux: ~/.config/reposcope/config.toml
/// - macOS: ~/Library/Application Support/reposcope/config.toml
/// - Windows: %APPDATA%\reposcope\config.toml
pub fn config_file_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }
    user_config_file_path()
}

/// Per-user config file path, whether or not it exists.
pub fn user_config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reposcope")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# reposcope configuration file
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (REPOSCOPE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# GitHub token. Without one the API allows 60 calls per hour; with one, 5000.
#
# Create one at: https://github.com/settings/tokens (no scopes needed)
#
# Can also be set via:
# - CLI: reposcope serve --token ...
# - Environment: REPOSCOPE_GITHUB_TOKEN=...
#github_token = "ghp_..."

# GitHub REST API base URL
#github_api_url = "https://api.github.com"

# Maximum number of language lookups in flight per request (minimum 1)
max_parallel_tasks = 8

# Port the HTTP server listens on
listen_port = 5000

# error, warn, info, debug or trace
log_level = "debug"

# One JSON object per log line
log_json = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&user_config_file_path())
}

/// Write the example config to `config_path` unless a file is already there.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
