//! TOML configuration for Gatekeeper
//!
//! Loaded once at startup from `gatekeeper.toml` (or the path given with
//! `--config` / `GATEKEEPER_CONFIG`). Secrets never live in the file: it names
//! the environment variables that hold them, and those are resolved here.

use crate::auth::{jwt::DEFAULT_TOKEN_TTL_HOURS, password::DEFAULT_HASH_COST, SigningKey};
use crate::db::SeedIdentity;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from gatekeeper.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub seed: SeedConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the token signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Argon2 time cost
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_hours() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

fn default_hash_cost() -> u32 {
    DEFAULT_HASH_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_hours: default_token_ttl_hours(),
            hash_cost: default_hash_cost(),
        }
    }
}

/// Upper bound on `auth.token_ttl_hours` (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

impl AuthConfig {
    /// Token lifetime, or `None` when `token_ttl_hours` is outside `1..=MAX_TOKEN_TTL_HOURS`.
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        if (1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            chrono::Duration::try_hours(self.token_ttl_hours)
        } else {
            None
        }
    }
}

// ============= Seed Accounts =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUserConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUserConfig {
    pub username: String,
    pub email: String,

    /// Environment variable name containing the account password
    pub password_env: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
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
}

impl GatekeeperConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: GatekeeperConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Check value ranges and that every referenced environment variable is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.hash_cost == 0 {
            return Err(ConfigError::ValidationError(
                "auth.hash_cost must be at least 1".to_string(),
            ));
        }
        if self.auth.token_ttl().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        self.signing_key()?;

        for user in &self.seed.users {
            if user.username.is_empty() {
                return Err(ConfigError::ValidationError(
                    "seed.users entries need a username".to_string(),
                ));
            }
            resolve_env_var(&user.password_env)?;
        }

        Ok(())
    }

    /// Reads the signing secret from the environment. Empty values are rejected.
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        let secret = resolve_env_var(&self.auth.jwt_secret_env)?;

        SigningKey::new(secret).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "Environment variable '{}' holds an empty signing secret",
                self.auth.jwt_secret_env
            ))
        })
    }

    /// Seed accounts with their passwords resolved from the environment
    pub fn seed_identities(&self) -> Result<Vec<SeedIdentity>, ConfigError> {
        self.seed
            .users
            .iter()
            .map(|user| {
                Ok(SeedIdentity {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    password: resolve_env_var(&user.password_env)?,
                    roles: user.roles.clone(),
                    is_active: user.is_active,
                })
            })
            .collect()
    }
}

fn resolve_env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}
