//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the GitHub token
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable overriding the repository owner
pub const OWNER_VAR: &str = "GITHUB_REPO_OWNER";
/// Environment variable overriding the repository name
pub const REPO_VAR: &str = "GITHUB_REPO_NAME";
/// Environment variable overriding the target branch
pub const BRANCH_VAR: &str = "GITHUB_BRANCH";

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";

/// Configuration problems that prevent submitting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GitHub credentials not configured. Please set {}.", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the workshop markdown files
    pub workshops_dir: Option<PathBuf>,
    /// Participant name, remembered between runs
    pub user_name: Option<String>,
    /// Where responses are committed
    pub sink: SinkConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Repository settings for the response sink. The token is never stored
/// here; it only comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// API root, overridable for GitHub Enterprise
    pub api_base: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Visible rows of each response box
    pub field_rows: usize,
}

/// Fully resolved sink settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub api_base: String,
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            owner: None,
            repo: None,
            branch: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            field_rows: 6,
        }
    }
}

impl SinkConfig {
    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<SinkSettings, ConfigError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve with an explicit variable lookup. Environment values win over
    /// the config file; blank values count as absent.
    pub fn resolve_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SinkSettings, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let file = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        let token = var(TOKEN_VAR);
        let owner = var(OWNER_VAR).or_else(|| file(&self.owner));
        let repo = var(REPO_VAR).or_else(|| file(&self.repo));
        let branch = var(BRANCH_VAR)
            .or_else(|| file(&self.branch))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        match (token, owner, repo) {
            (Some(token), Some(owner), Some(repo)) => Ok(SinkSettings {
                api_base: self.api_base.trim_end_matches('/').to_string(),
                token,
                owner,
                repo,
                branch,
            }),
            (token, owner, repo) => {
                let missing = [(token, TOKEN_VAR), (owner, OWNER_VAR), (repo, REPO_VAR)]
                    .into_iter()
                    .filter(|(value, _)| value.is_none())
                    .map(|(_, name)| name)
                    .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "workshop-forms", "Workshop Forms")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Directory to load workshops from
    pub fn workshops_dir(&self) -> PathBuf {
        self.workshops_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("content").join("workshops"))
    }

    /// Remember the participant name; blank names clear it
    pub fn set_user_name(&mut self, name: &str) {
        let name = name.trim();
        self.user_name = (!name.is_empty()).then(|| name.to_string());
    }
}
