//! Configuration management for gamesite using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::diesel_context::DieselDbContext;
use crate::scrapers::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "games.db";

/// Default scrape output document.
pub const DEFAULT_SCRAPE_OUTPUT: &str = "games_data.json";

/// Default static output directory.
pub const DEFAULT_STATIC_DIR: &str = "static_html";

/// Shared secret accepted on the admin API when nothing else is configured.
pub const DEFAULT_ADMIN_API_KEY: &str = "admin-api-key-change-in-production";

/// Errors raised while reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Where the scraper writes its JSON document.
    pub scrape_output: PathBuf,
    /// Root of the generated static site.
    pub static_dir: PathBuf,
    /// Portal the scraper reads from.
    pub base_url: String,
    /// Label written into the scrape document.
    pub website: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between page analyses in milliseconds.
    pub request_delay_ms: u64,
    /// Default upper bound on games analyzed per scrape.
    pub max_games: usize,
    /// Value expected in the `X-API-Key` header on admin routes.
    pub admin_api_key: String,
    /// CRUD API consumed by the static generator.
    pub api_base_url: String,
    /// Public origin of the generated site.
    pub site_url: String,
    /// Display name of the generated site.
    pub site_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamesite");

        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            scrape_output: data_dir.join(DEFAULT_SCRAPE_OUTPUT),
            static_dir: data_dir.join(DEFAULT_STATIC_DIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            website: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: 10,
            request_delay_ms: 300,
            max_games: 100,
            admin_api_key: DEFAULT_ADMIN_API_KEY.to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            site_url: "https://btwgame.com".to_string(),
            site_name: "BTW Games".to_string(),
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Full path to the SQLite file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.data_dir, &self.static_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {}: {}", dir.display(), e),
                )
            })?;
        }
        if let Some(parent) = self.scrape_output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> DieselDbContext {
        DieselDbContext::from_url(&self.database_url())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Scrape output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_output: Option<String>,
    /// Static site output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    /// Portal base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Website label for the scrape document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between requests in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// Default maximum games per scrape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_games: Option<u64>,
    /// Admin API shared secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_api_key: Option<String>,
    /// CRUD API base URL for the static generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Public site origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Public site name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    pub async fn load() -> Self {
        match prefer::load("gamesite").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Directory relative paths in the config resolve against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    fn resolve_path(path_str: &str, base_dir: &Path) -> PathBuf {
        let path = Path::new(path_str);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            let data_dir = Self::resolve_path(data_dir, base_dir);
            *settings = Settings {
                scrape_output: data_dir.join(DEFAULT_SCRAPE_OUTPUT),
                static_dir: data_dir.join(DEFAULT_STATIC_DIR),
                data_dir,
                ..settings.clone()
            };
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref output) = self.scrape_output {
            settings.scrape_output = Self::resolve_path(output, &settings.data_dir);
        }
        if let Some(ref static_dir) = self.static_dir {
            settings.static_dir = Self::resolve_path(static_dir, &settings.data_dir);
        }
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref website) = self.website {
            settings.website = website.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(max_games) = self.max_games {
            settings.max_games = max_games as usize;
        }
        if let Some(ref key) = self.admin_api_key {
            settings.admin_api_key = key.clone();
        }
        if let Some(ref url) = self.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(ref url) = self.site_url {
            settings.site_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref name) = self.site_name {
            settings.site_name = name.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Apply environment overrides on top of file configuration.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(dir) = env_var("GAMESITE_DATA_DIR") {
        let data_dir = PathBuf::from(dir);
        settings.scrape_output = data_dir.join(DEFAULT_SCRAPE_OUTPUT);
        settings.static_dir = data_dir.join(DEFAULT_STATIC_DIR);
        settings.data_dir = data_dir;
    }
    if let Some(url) = env_var("DATABASE_URL") {
        settings.database_url = Some(url);
    }
    if let Some(key) = env_var("GAMESITE_ADMIN_API_KEY") {
        settings.admin_api_key = key;
    }
    if let Some(url) = env_var("GAMESITE_API_BASE_URL") {
        settings.api_base_url = url;
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => match Config::load_from_path(path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; falling back to defaults", e);
                Config::default()
            }
        },
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings);

    (settings, config)
}
