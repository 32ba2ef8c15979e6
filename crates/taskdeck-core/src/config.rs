//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/taskdeck/config.toml)
//! 3. Environment variables (TASKDECK_* prefix)
//!
//! Environment variables take precedence over config file values.
//! The API base URL is resolved once from the environment mode.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "TASKDECK";

/// Base URL used in development when none is configured
pub const DEFAULT_DEV_BASE_URL: &str = "http://localhost:8000/api";

/// Origin of the reverse proxy fronting the API in production
pub const DEFAULT_PROXY_ORIGIN: &str = "http://localhost";

/// Path the reverse proxy serves the API under in production
const PRODUCTION_API_PATH: &str = "/api";

/// Which backend the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Explicit base URL, localhost by default
    #[default]
    Development,
    /// Same-origin `/api` behind a reverse proxy
    Production,
}

impl Mode {
    /// Parse a mode name; anything other than "production" is development
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Environment mode selecting how the base URL is resolved
    #[serde(default)]
    pub mode: Mode,

    /// API base URL used in development mode
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Origin the `/api` path is joined onto in production mode
    #[serde(default = "default_proxy_origin")]
    pub proxy_origin: String,

    /// Insert newly created todos at the top of the list instead of the end
    #[serde(default)]
    pub new_todos_first: bool,

    /// Directory for local files (debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for the TUI (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            api_base_url: None,
            proxy_origin: default_proxy_origin(),
            new_todos_first: false,
            data_dir: default_data_dir(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TASKDECK_ENV, TASKDECK_API_BASE_URL, ...)
    /// 2. Config file (~/.config/taskdeck/config.toml or TASKDECK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // TASKDECK_ENV
        if let Ok(val) = std::env::var(format!("{}_ENV", ENV_PREFIX)) {
            self.mode = Mode::from_env_value(&val);
        }

        // TASKDECK_API_BASE_URL
        if let Ok(val) = std::env::var(format!("{}_API_BASE_URL", ENV_PREFIX)) {
            self.api_base_url = if val.is_empty() { None } else { Some(val) };
        }

        // TASKDECK_PROXY_ORIGIN
        if let Ok(val) = std::env::var(format!("{}_PROXY_ORIGIN", ENV_PREFIX)) {
            if !val.is_empty() {
                self.proxy_origin = val;
            }
        }

        // TASKDECK_NEW_TODOS_FIRST
        if let Ok(val) = std::env::var(format!("{}_NEW_TODOS_FIRST", ENV_PREFIX)) {
            self.new_todos_first = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // TASKDECK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // TASKDECK_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Resolve the API base URL for the configured mode
    ///
    /// Production always targets `{proxy_origin}/api`; development uses
    /// `api_base_url`, falling back to `http://localhost:8000/api`.
    pub fn api_base_url(&self) -> String {
        match self.mode {
            Mode::Production => format!(
                "{}{}",
                self.proxy_origin.trim_end_matches('/'),
                PRODUCTION_API_PATH
            ),
            Mode::Development => self
                .api_base_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DEV_BASE_URL.to_string()),
        }
    }

    /// Ensure data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TASKDECK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskdeck")
            .join("config.toml")
    }

    /// Get the path of the TUI debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn default_proxy_origin() -> String {
    DEFAULT_PROXY_ORIGIN.to_string()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdeck")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TASKDECK_ENV",
        "TASKDECK_API_BASE_URL",
        "TASKDECK_PROXY_ORIGIN",
        "TASKDECK_NEW_TODOS_FIRST",
        "TASKDECK_DATA_DIR",
        "TASKDECK_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Development);
        assert!(config.api_base_url.is_none());
        assert!(!config.new_todos_first);
        assert!(config.data_dir.ends_with("taskdeck"));
        assert_eq!(config.api_base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_production_uses_proxy_path() {
        let config = Config {
            mode: Mode::Production,
            api_base_url: Some("http://ignored:9000/api".to_string()),
            proxy_origin: "https://todo.example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.api_base_url(), "https://todo.example.com/api");
    }

    #[test]
    fn test_development_blank_url_falls_back() {
        let config = Config {
            api_base_url: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_base_url(), DEFAULT_DEV_BASE_URL);
    }

    #[test]
    fn test_mode_from_env_value() {
        assert_eq!(Mode::from_env_value("production"), Mode::Production);
        assert_eq!(Mode::from_env_value("PRODUCTION"), Mode::Production);
        assert_eq!(Mode::from_env_value("development"), Mode::Development);
        assert_eq!(Mode::from_env_value("staging"), Mode::Development);
    }

    #[test]
    fn test_env_override_mode_wins_over_base_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKDECK_API_BASE_URL", "http://dev-box:8000/api");
        env::set_var("TASKDECK_ENV", "production");
        config.apply_env_overrides();

        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.api_base_url(), "http://localhost/api");
    }

    #[test]
    fn test_env_override_base_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKDECK_API_BASE_URL", "http://dev-box:8000/api");
        config.apply_env_overrides();
        assert_eq!(config.api_base_url(), "http://dev-box:8000/api");

        // Empty string clears it
        env::set_var("TASKDECK_API_BASE_URL", "");
        config.apply_env_overrides();
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_env_override_new_todos_first() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKDECK_NEW_TODOS_FIRST", "1");
        config.apply_env_overrides();
        assert!(config.new_todos_first);

        env::set_var("TASKDECK_NEW_TODOS_FIRST", "false");
        config.apply_env_overrides();
        assert!(!config.new_todos_first);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            mode = "production"
            proxy_origin = "https://app.example.com"
            new_todos_first = true
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.mode, Mode::Production);
        assert!(config.new_todos_first);
        assert_eq!(config.api_base_url(), "https://app.example.com/api");
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            api_base_url: Some("http://api.internal:8000/api".to_string()),
            log_file: Some(PathBuf::from("/tmp/taskdeck.log")),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.api_base_url, config.api_base_url);
        assert_eq!(loaded.log_path(), PathBuf::from("/tmp/taskdeck.log"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.mode, Mode::Development);
        assert!(config.api_base_url.is_none());
    }
}
