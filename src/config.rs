use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database server host
    pub host: String,
    /// Database server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name
    pub name: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before failing
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    /// Days of recent rows to sync into the backup table
    #[serde(default = "default_backup_days")]
    pub days: i32,
}

fn default_backup_days() -> i32 {
    14
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            days: default_backup_days(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "")?
            .set_default("database.user", "")?
            .set_default("database.password", "")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("backup.days", 14)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("BETSWEEP_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (BETSWEEP_DATABASE__HOST, etc.)
            .add_source(
                Environment::with_prefix("BETSWEEP")
                    .separator("__")
                    .try_parsing(true),
            )
            // The deployment's conventional variables win over everything
            .set_override_option("database.name", std::env::var("DB_NAME").ok())?
            .set_override_option("database.user", std::env::var("DB_USER").ok())?
            .set_override_option("database.password", std::env::var("DB_PASS").ok())?
            .set_override_option("database.host", std::env::var("DB_HOST").ok())?;

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.host.is_empty() {
            errors.push("database.host is required (or set DB_HOST)".to_string());
        }
        if self.database.name.is_empty() {
            errors.push("database.name is required (or set DB_NAME)".to_string());
        }
        if self.database.user.is_empty() {
            errors.push("database.user is required (or set DB_USER)".to_string());
        }
        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be positive".to_string());
        }
        if self.database.acquire_timeout_secs == 0 {
            errors.push("database.acquire_timeout_secs must be positive".to_string());
        }
        if self.backup.days <= 0 {
            errors.push("backup.days must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
