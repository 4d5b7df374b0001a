// src/config.rs - Layered application configuration
use std::path::{Path, PathBuf};
use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};

/// Built-in defaults, overridden by a user file, then `OPENICE_*` env vars
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

const ENV_PREFIX: &str = "OPENICE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory holding one folder per case plus the counter file
    pub output_root: PathBuf,

    /// Prefix of generated case ids
    pub case_prefix: String,

    /// Counter file name, relative to `output_root`
    pub counter_file: PathBuf,

    #[serde(default)]
    pub github: GithubConfig,
}

/// Remote issue publishing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_base: String,

    /// `owner/repo`
    #[serde(default)]
    pub repo: Option<String>,

    // Never written back to disk
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            repo: None,
            token: None,
            timeout_secs: 30,
            user_agent: "openice".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("reports"),
            case_prefix: "openice_case".to_string(),
            counter_file: PathBuf::from(".case_counter"),
            github: GithubConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `config_path` must exist. Without one, the default user
    /// file is read if present.
    pub fn load(config_path: Option<&Path>) -> ReportResult<Self> {
        let mut builder = ConfigLoader::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        match config_path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let default_path = Self::default_config_path();
                debug!("Looking for config at: {}", default_path.display());
                builder = builder.add_source(File::from(default_path.as_path()).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        builder
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| ReportError::ConfigError(e.to_string()))
    }

    /// `~/.openice/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".openice/config.toml")
    }

    /// Full path of the persisted case counter
    pub fn counter_path(&self) -> PathBuf {
        self.output_root.join(&self.counter_file)
    }

    /// Write this configuration as TOML. Refuses to overwrite unless `force`.
    pub fn save(&self, path: &Path, force: bool) -> ReportResult<PathBuf> {
        if path.exists() && !force {
            return Err(ReportError::ConfigError(format!(
                "Configuration already exists at {}. Use --force to overwrite.",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ReportError::file(parent, e))?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ReportError::SerializationError(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ReportError::file(path, e))?;

        info!("Configuration saved to {}", path.display());
        Ok(path.to_path_buf())
    }
}
