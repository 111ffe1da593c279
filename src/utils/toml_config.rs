//! TOML-based configuration for the game server
//!
//! Server, auth, database and catalog settings are read from a TOML file
//! (`game.toml` by default). Secrets never live in the file: the `[auth]`
//! section names the environment variables that hold them.

use crate::types::{Item, Quest};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum JWT secret length in bytes accepted by [`GameConfig::validate`].
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Root configuration structure loaded from game.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Items and quests seeded at startup
    #[serde(default)]
    pub catalog: CatalogConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Largest accepted request body
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Environment variable name containing the password pepper
    #[serde(default = "default_pepper_env")]
    pub pepper_env: String,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_pepper_env() -> String {
    "PASSWORD_PEPPER".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            pepper_env: default_pepper_env(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `:memory:` or a local database file path
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/game.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == ":memory:"
    }
}

// ============= Catalog Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default)]
    pub quests: Vec<Quest>,
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    EphemeralDatabase,
    EmptyCatalog,
    UnknownLogFormat,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Duplicate {0} id {1} in catalog")]
    DuplicateCatalogId(&'static str, i64),
}

impl GameConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without checking secrets or the catalog
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate secrets availability and catalog consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret()?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at least {} bytes",
                self.auth.jwt_secret_env, MIN_JWT_SECRET_LEN
            )));
        }

        if self.pepper()?.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} must not be empty",
                self.auth.pepper_env
            )));
        }

        if let Some(ref env) = self.database.turso_url_env {
            self.validate_env_var(env)?;
        }
        if let Some(ref env) = self.database.turso_token_env {
            self.validate_env_var(env)?;
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }

        check_unique("item", self.catalog.items.iter().map(|i| i.id))?;
        check_unique("quest", self.catalog.quests.iter().map(|q| q.id))?;

        Ok(())
    }

    /// Validate configuration and collect non-fatal warnings
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.database.is_memory() && self.database.turso_url_env.is_none() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::EphemeralDatabase,
                message: "database.url is ':memory:'; all data is lost on restart".to_string(),
            });
        }

        if self.catalog.items.is_empty() && self.catalog.quests.is_empty() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::EmptyCatalog,
                message: "No catalog items or quests are configured".to_string(),
            });
        }

        let format = self.server.log_format.to_ascii_lowercase();
        if format != "text" && format != "json" {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::UnknownLogFormat,
                message: format!(
                    "Unknown log_format '{}', falling back to text",
                    self.server.log_format
                ),
            });
        }

        Ok(warnings)
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Get the password pepper from the environment
    pub fn pepper(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.pepper_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.pepper_env.clone()))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn check_unique(kind: &'static str, ids: impl Iterator<Item = i64>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateCatalogId(kind, id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters-long";

    // Each test uses its own variable names so parallel tests never race.
    fn set_env(name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn config_with_env(jwt_env: &str, pepper_env: &str) -> GameConfig {
        let mut config = GameConfig::default();
        config.auth.jwt_secret_env = jwt_env.to_string();
        config.auth.pepper_env = pepper_env.to_string();
        config
    }

    #[test]
    fn test_parse_config() {
        let content = r#"
[server]
host = "0.0.0.0"
port = 8080
log_format = "json"

[auth]
jwt_secret_env = "GAME_JWT"

[database]
url = ":memory:"

[[catalog.items]]
id = 1
name = "Rusty Sword"
item_type = "weapon"

[[catalog.quests]]
id = 1
name = "First Steps"
description = "Walk to the well"
reward_xp = 50
"#;

        let config: GameConfig = toml::from_str(content).expect("Failed to parse config");

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.server.json_logs());
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.auth.jwt_secret_env, "GAME_JWT");
        assert_eq!(config.auth.pepper_env, "PASSWORD_PEPPER");
        assert!(config.database.is_memory());
        assert_eq!(config.catalog.items[0].name, "Rusty Sword");
        assert!(config.catalog.items[0].description.is_none());
        assert_eq!(config.catalog.quests[0].reward_xp, 50);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.database.url, "./data/game.db");
        assert_eq!(config.auth.jwt_secret_env, "JWT_SECRET");
        assert!(config.catalog.items.is_empty());
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = config_with_env("CFG_TEST_UNSET_JWT", "CFG_TEST_UNSET_PEPPER");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(ref name)) if name == "CFG_TEST_UNSET_JWT"
        ));
    }

    #[test]
    fn test_validation_short_secret() {
        set_env("CFG_TEST_SHORT_JWT", "too-short");
        set_env("CFG_TEST_SHORT_PEPPER", "pepper");

        let config = config_with_env("CFG_TEST_SHORT_JWT", "CFG_TEST_SHORT_PEPPER");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_empty_pepper() {
        set_env("CFG_TEST_EMPTY_JWT", SECRET);
        set_env("CFG_TEST_EMPTY_PEPPER", "");

        let config = config_with_env("CFG_TEST_EMPTY_JWT", "CFG_TEST_EMPTY_PEPPER");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(ref msg)) if msg.contains("CFG_TEST_EMPTY_PEPPER")
        ));
    }

    #[test]
    fn test_validation_duplicate_catalog_ids() {
        set_env("CFG_TEST_DUP_JWT", SECRET);
        set_env("CFG_TEST_DUP_PEPPER", "pepper");

        let mut config = config_with_env("CFG_TEST_DUP_JWT", "CFG_TEST_DUP_PEPPER");
        let potion = Item {
            id: 2,
            name: "Potion".to_string(),
            description: None,
            item_type: "consumable".to_string(),
        };
        config.catalog.items = vec![potion.clone(), potion];

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCatalogId("item", 2))
        ));
    }

    #[test]
    fn test_validation_passes_with_warnings() {
        set_env("CFG_TEST_OK_JWT", SECRET);
        set_env("CFG_TEST_OK_PEPPER", "pepper");

        let mut config = config_with_env("CFG_TEST_OK_JWT", "CFG_TEST_OK_PEPPER");
        config.database.url = ":memory:".to_string();
        config.server.log_format = "yaml".to_string();

        let warnings = config.validate_with_warnings().unwrap();
        let kinds: Vec<_> = warnings.iter().map(|w| w.kind.clone()).collect();

        assert!(kinds.contains(&ConfigWarningKind::EphemeralDatabase));
        assert!(kinds.contains(&ConfigWarningKind::EmptyCatalog));
        assert!(kinds.contains(&ConfigWarningKind::UnknownLogFormat));
        assert!(!config.server.json_logs());
    }

    #[test]
    fn test_load_missing_file() {
        let result = GameConfig::load("/nonexistent/game.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
