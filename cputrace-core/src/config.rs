use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CpuTraceConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://cputrace.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Cross-origin policy. The permissive default mirrors the browser-facing
/// upload UI this service was built for; operators fronting it with access
/// control should turn it off.
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub permissive: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { permissive: true }
    }
}

impl CpuTraceConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = CpuTraceConfig::default();
        assert_eq!(config.service.host, "127.0.0.1");
        assert_eq!(config.service.port, 8000);
        assert_eq!(config.database.url, "sqlite://cputrace.db");
        assert_eq!(config.database.max_connections, 5);
        assert!(config.cors.permissive);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: CpuTraceConfig = toml::from_str("[service]\nhost = \"0.0.0.0\"\nport = 9000\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.service.port, 9000);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.cors.permissive);
    }
}
