//! Configuration System
//!
//! Loads configuration from a TOML file with environment-variable
//! overrides. Every field has a default, so the server starts with no
//! config file at all.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Expense data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path of the consolidated expenses CSV. An absent file is served as
    /// an empty dataset.
    #[serde(default = "default_expenses_csv")]
    pub expenses_csv: String,
}

fn default_expenses_csv() -> String {
    "./data/consolidado_enriquecido.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            expenses_csv: default_expenses_csv(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    crate::query::MAX_PAGE_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Statistics cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds before a cached statistics snapshot expires.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Bound on cached entries before least-recently-inserted eviction.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_max_entries() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` for development, `json` for production.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        config.clamp_bounds();

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.clamp_bounds();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("operadoras").join("config.toml")),
            Some(PathBuf::from("/etc/operadoras/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(csv) = std::env::var("OPERADORAS_EXPENSES_CSV") {
            self.data.expenses_csv = csv;
        }

        if let Ok(host) = std::env::var("OPERADORAS_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("OPERADORAS_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(ttl) = std::env::var("OPERADORAS_CACHE_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.cache.ttl_seconds = t;
            }
        }

        if let Ok(level) = std::env::var("OPERADORAS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("OPERADORAS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Keep the configured pagination bounds inside what the query engine
    /// accepts, so the boundary validation and the core clamp agree.
    fn clamp_bounds(&mut self) {
        if self.api.max_page_size > crate::query::MAX_PAGE_SIZE {
            tracing::warn!(
                configured = self.api.max_page_size,
                "max_page_size exceeds the supported bound {}, clamping",
                crate::query::MAX_PAGE_SIZE
            );
            self.api.max_page_size = crate::query::MAX_PAGE_SIZE;
        }
        self.api.max_page_size = self.api.max_page_size.max(1);
        self.api.default_page_size = self.api.default_page_size.clamp(1, self.api.max_page_size);
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.default_page_size, 10);
        assert_eq!(config.api.max_page_size, 100);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            [api]
            port = 9090

            [cache]
            ttl_seconds = 60
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.cache.ttl_seconds, 60);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.data.expenses_csv, default_expenses_csv());
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.max_entries, 100);
    }

    #[test]
    fn test_addr() {
        let config = ApiConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = Config::load(Path::new("/does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_clamps_max_page_size_to_engine_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nmax_page_size = 500\ndefault_page_size = 250\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.max_page_size, crate::query::MAX_PAGE_SIZE);
        assert_eq!(config.api.default_page_size, crate::query::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_load_keeps_in_range_page_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nmax_page_size = 50\ndefault_page_size = 20\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.max_page_size, 50);
        assert_eq!(config.api.default_page_size, 20);
    }
}
