use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use streamgate_cache_redis::RedisCacheConfig;
use streamgate_db_postgres::PostgresConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Access cache (Redis) configuration
    #[serde(default)]
    pub cache: RedisCacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Storage validation
        if self.storage.postgres.url.is_empty() {
            return Err("storage.postgres.url must not be empty".into());
        }
        if self.storage.postgres.pool_size == 0 {
            return Err("storage.postgres.pool_size must be > 0".into());
        }
        // Cache validation
        if self.cache.url.is_empty() {
            return Err("cache.url must not be empty".into());
        }
        if self.cache.pool_size == 0 {
            return Err("cache.pool_size must be > 0".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// PostgreSQL token store options
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("streamgate.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., STREAMGATE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("STREAMGATE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Validate
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().port(), 8080);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: AppConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.cache.url, "redis://localhost:6379");
        assert_eq!(cfg.cache.ttl(), None);
        assert!(cfg.storage.postgres.run_migrations);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.postgres.url = String::new();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.cache.pool_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "port": 9090 },
            "cache": { "ttl_secs": 600 }
        }))
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.cache.ttl_secs, Some(600));
    }
}
