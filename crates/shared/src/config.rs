//! Application configuration management.
//!
//! Layered: `config/default`, then `config/{RUN_MODE}`, then environment
//! variables prefixed with `BUKUBESAR__` (e.g. `BUKUBESAR__DATABASE__URL`).

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Report presentation settings.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
///
/// Tokens are issued by the identity provider; this service only verifies them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// Expected `iss` claim, when the provider sets one.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_leeway() -> u64 {
    30
}

/// Report presentation settings, printed in export headers.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Company name.
    #[serde(default = "default_company_name")]
    pub company_name: String,
    /// Currency label.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            company_name: default_company_name(),
            currency: default_currency(),
        }
    }
}

fn default_company_name() -> String {
    "Bukubesar".to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUKUBESAR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("BUKUBESAR__DATABASE__URL", Some("postgres://localhost/gl")),
                ("BUKUBESAR__JWT__SECRET", Some("s3cret")),
                ("BUKUBESAR__SERVER__PORT", Some("9090")),
                ("RUN_MODE", Some("test-none")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/gl");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.jwt.secret, "s3cret");
                assert_eq!(config.jwt.leeway_secs, 30);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.reports.currency, "IDR");
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("BUKUBESAR__DATABASE__URL", None::<&str>),
                ("BUKUBESAR__JWT__SECRET", Some("s3cret")),
                ("RUN_MODE", Some("test-none")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
