use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub storage: StorageConfig,

    pub security: SecurityConfig,

    pub contact: ContactConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (0 = number of CPU cores)
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/folio.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on the auth cookie.
    /// Default: true for production safety. Set to false for local development without HTTPS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer tokens. Must be set before startup;
    /// there is no usable default on purpose.
    pub token_secret: String,

    /// Token lifetime in days.
    pub token_expiry_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_expiry_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the external media host.
    pub base_url: String,

    /// Account namespace (cloud name) at the media host.
    pub namespace: String,

    pub api_key: String,

    pub api_secret: String,

    /// Request timeout in seconds for upload calls.
    pub request_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://media.example.com".to_string(),
            namespace: "change-me".to_string(),
            api_key: "change-me".to_string(),
            api_secret: "change-me".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism
    pub argon2_parallelism: u32,

    /// General API rate limit: max requests per window per client address.
    pub api_max_requests: u32,

    /// Stricter limit applied to login and registration.
    pub auth_max_requests: u32,

    /// Fixed window length in seconds for both counters.
    pub rate_limit_window_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            api_max_requests: 100,
            auth_max_requests: 10,
            rate_limit_window_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Subject stored when a submission omits one.
    pub default_subject: String,

    /// Maximum accepted message body length in characters.
    pub max_message_length: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            default_subject: "No Subject".to_string(),
            max_message_length: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            security: SecurityConfig::default(),
            contact: ContactConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables win over file values so a containerized deploy
    /// can run without a config file at all.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.general.database_path = url;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.general.log_level = level;
        }
        if let Ok(secret) = std::env::var("TOKEN_SECRET") {
            self.auth.token_secret = secret;
        }
        if let Ok(days) = std::env::var("TOKEN_EXPIRY_DAYS")
            && let Ok(days) = days.parse()
        {
            self.auth.token_expiry_days = days;
        }
        if let Ok(origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !origins.is_empty() {
                self.server.cors_allowed_origins = origins;
            }
        }
        if let Ok(url) = std::env::var("STORAGE_BASE_URL") {
            self.storage.base_url = url;
        }
        if let Ok(ns) = std::env::var("STORAGE_NAMESPACE") {
            self.storage.namespace = ns;
        }
        if let Ok(key) = std::env::var("STORAGE_API_KEY") {
            self.storage.api_key = key;
        }
        if let Ok(secret) = std::env::var("STORAGE_API_SECRET") {
            self.storage.api_secret = secret;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("folio").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".folio").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Startup gate: refuse to run with configuration the server cannot
    /// operate on. Called once from `run()`, not from components.
    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty (general.database_path or DATABASE_URL)");
        }

        if self.auth.token_secret.is_empty() {
            anyhow::bail!(
                "Token signing secret must be set (auth.token_secret or TOKEN_SECRET); \
                 refusing to start without one"
            );
        }

        if self.auth.token_expiry_days <= 0 {
            anyhow::bail!("Token expiry must be at least one day");
        }

        url::Url::parse(&self.storage.base_url)
            .with_context(|| format!("Invalid storage base URL: {}", self.storage.base_url))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_expiry_days, 7);
        assert!(config.auth.token_secret.is_empty());
        assert_eq!(config.security.auth_max_requests, 10);
        assert_eq!(config.contact.default_subject, "No Subject");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            token_secret = "abc"
            token_expiry_days = 14
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.token_expiry_days, 14);

        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_requires_token_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.token_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_storage_url() {
        let mut config = Config::default();
        config.auth.token_secret = "secret".to_string();
        config.storage.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
