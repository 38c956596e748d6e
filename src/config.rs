use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that overrides `security.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "EVENTOS_JWT_SECRET";

/// Environment variable that overrides `general.database_path`.
pub const DATABASE_URL_ENV: &str = "EVENTOS_DATABASE_URL";

/// Shortest accepted signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// `SQLite` connection URL
    pub database_path: String,

    pub log_level: String,

    /// Tokio worker threads. 0 uses the number of CPU cores.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/eventos.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Directory with a built frontend, served for any path the API does not own.
    pub frontend_dir: Option<String>,

    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            frontend_dir: None,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 iterations
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    /// HS256 signing secret for access tokens.
    /// Left empty, a random secret is generated at startup and tokens do not
    /// survive a restart.
    pub jwt_secret: String,

    pub token_ttl_minutes: u32,

    pub bootstrap_admin: BootstrapAdminConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            jwt_secret: String::new(),
            token_ttl_minutes: 30,
            bootstrap_admin: BootstrapAdminConfig::default(),
        }
    }
}

/// Administrator account created at startup when no user has its email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapAdminConfig {
    pub enabled: bool,

    pub name: String,

    pub email: String,

    pub password: String,
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "Administrador".to_string(),
            email: "admin@eventos.local".to_string(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,

    /// Emit logs as JSON lines instead of the human-readable format
    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if let Some(path) = path {
            info!("Loading config from: {}", path.display());
            Self::load_from_path(path)?
        } else if let Some(path) = Self::config_paths().into_iter().find(|p| p.exists()) {
            info!("Loading config from: {}", path.display());
            Self::load_from_path(&path)?
        } else {
            info!("No config file found, using defaults");
            Self::default()
        };

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
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("eventos").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".eventos").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV)
            && !secret.is_empty()
        {
            self.security.jwt_secret = secret;
        }

        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.is_empty()
        {
            self.general.database_path = url;
        }
    }

    /// Fills in a random signing secret when none is configured.
    ///
    /// Returns `true` if a secret was generated.
    pub fn ensure_jwt_secret(&mut self) -> bool {
        if !self.security.jwt_secret.is_empty() {
            return false;
        }

        warn!(
            "No JWT secret configured; generated an ephemeral one. Set {JWT_SECRET_ENV} to keep tokens valid across restarts"
        );
        self.security.jwt_secret = generate_secret();
        true
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("general.database_path cannot be empty");
        }

        if self.general.max_db_connections == 0 {
            anyhow::bail!("general.max_db_connections must be > 0");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "security.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes (set {JWT_SECRET_ENV})"
            );
        }

        if self.security.token_ttl_minutes == 0 {
            anyhow::bail!("security.token_ttl_minutes must be > 0");
        }

        let admin = &self.security.bootstrap_admin;
        if admin.enabled && (admin.email.is_empty() || admin.password.len() < 8) {
            anyhow::bail!(
                "security.bootstrap_admin needs an email and a password of at least 8 characters"
            );
        }

        Ok(())
    }
}

fn generate_secret() -> String {
    use rand::RngCore;
    use std::fmt::Write;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);

    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.security.token_ttl_minutes, 30);
        assert_eq!(config.general.database_path, "sqlite:data/eventos.db");
        assert!(!config.security.bootstrap_admin.enabled);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[security]"));
        assert!(toml_str.contains("[observability]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [security]
            token_ttl_minutes = 60

            [security.bootstrap_admin]
            enabled = true
            password = "changeme123"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.security.token_ttl_minutes, 60);
        assert!(config.security.bootstrap_admin.enabled);
        assert_eq!(config.security.bootstrap_admin.email, "admin@eventos.local");

        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_generated_secret_passes_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        assert!(config.ensure_jwt_secret());
        assert_eq!(config.security.jwt_secret.len(), 64);
        assert!(config.validate().is_ok());

        assert!(!config.ensure_jwt_secret());
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut config = Config::default();
        config.ensure_jwt_secret();

        config.general.min_db_connections = 10;
        assert!(config.validate().is_err());
        config.general.min_db_connections = 1;

        config.server.port = 0;
        assert!(config.validate().is_err());
        config.server.port = 8000;

        config.security.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("eventos-config-{}.toml", uuid::Uuid::new_v4()));

        let mut config = Config::default();
        config.server.port = 9100;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert!(!Config::create_default_if_missing(&path).unwrap());

        std::fs::remove_file(&path).ok();
    }
}
