//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_CACHE_TIMEOUT_MS, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_DB_HOST,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_NAME, DEFAULT_DB_PORT, DEFAULT_DB_USER,
    DEFAULT_LOG_DIR, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ENV_FILE_PATH, MODE_TEST,
};

/// Output format of both log sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub db_user: String,
    db_password: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    /// Full URL override (takes precedence over the individual parts)
    database_url: Option<String>,
    pub db_max_connections: u32,
    pub redis_url: Option<String>,
    pub cache_ttl_seconds: u64,
    pub cache_timeout_ms: u64,
    pub log_format: LogFormat,
    pub log_dir: String,
    pub mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub cors_credentials: bool,
    /// Problems found while loading, reported once logging is up
    warnings: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db_user", &self.db_user)
            .field("db_password", &"[REDACTED]")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_name", &self.db_name)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .field("cache_timeout_ms", &self.cache_timeout_ms)
            .field("log_format", &self.log_format)
            .field("log_dir", &self.log_dir)
            .field("mode", &self.mode)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_origins", &self.cors_origins)
            .field("cors_credentials", &self.cors_credentials)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_user: DEFAULT_DB_USER.to_string(),
            db_password: String::new(),
            db_host: DEFAULT_DB_HOST.to_string(),
            db_port: DEFAULT_DB_PORT,
            db_name: DEFAULT_DB_NAME.to_string(),
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            redis_url: None,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            cache_timeout_ms: DEFAULT_CACHE_TIMEOUT_MS,
            log_format: LogFormat::default(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            mode: String::new(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: Vec::new(),
            cors_credentials: false,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration once at process start.
    ///
    /// Reads `env/.env` and then `.env`; variables already present in the
    /// process environment are never overridden.
    pub fn from_env() -> Self {
        dotenvy::from_filename(ENV_FILE_PATH).ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut warnings = Vec::new();

        // The subscriber is not installed yet, so problems are kept for later
        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warnings.push(format!("{}, falling back to full", e));
                LogFormat::Full
            }),
            None => defaults.log_format,
        };

        Self {
            db_user: get("POSTGRES_USER").unwrap_or(defaults.db_user),
            db_password: get("POSTGRES_PASSWORD").unwrap_or(defaults.db_password),
            db_host: get("DB_HOST").unwrap_or(defaults.db_host),
            db_port: parse_or(get("DB_PORT"), defaults.db_port),
            db_name: get("DB_DATABASE").unwrap_or(defaults.db_name),
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), defaults.db_max_connections),
            redis_url: get("REDIS_URL"),
            cache_ttl_seconds: parse_or(get("CACHE_TTL_SECONDS"), defaults.cache_ttl_seconds),
            cache_timeout_ms: parse_or(get("CACHE_TIMEOUT_MS"), defaults.cache_timeout_ms),
            log_format,
            log_dir: get("LOG_DIR").unwrap_or(defaults.log_dir),
            mode: get("MODE").unwrap_or(defaults.mode),
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(get("SERVER_PORT"), defaults.server_port),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.cors_origins),
            cors_credentials: parse_or(get("CORS_CREDENTIALS"), defaults.cors_credentials),
            warnings,
        }
    }

    /// Loading problems that fell back to defaults.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Database connection URL.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
            ),
        }
    }

    /// Whether the service runs in test mode.
    pub fn is_test_mode(&self) -> bool {
        self.mode.eq_ignore_ascii_case(MODE_TEST)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_database_url_from_parts() {
        let config = config_from(&[
            ("POSTGRES_USER", "vpn"),
            ("POSTGRES_PASSWORD", "s3cret"),
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_DATABASE", "tunnels"),
        ]);

        assert_eq!(config.database_url(), "postgres://vpn:s3cret@db:6543/tunnels");
    }

    #[test]
    fn test_database_url_override_wins() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DB_HOST", "ignored"),
        ]);

        assert_eq!(config.database_url(), "sqlite::memory:");
    }

    #[test]
    fn test_defaults_and_empty_values() {
        let config = config_from(&[("DB_PORT", ""), ("SERVER_PORT", "not-a-port")]);

        assert_eq!(config.db_port, DEFAULT_DB_PORT);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert!(config.redis_url.is_none());
        assert_eq!(config.log_format, LogFormat::Full);
    }

    #[test]
    fn test_log_format_and_lists() {
        let config = config_from(&[
            ("LOG_FORMAT", "JSON"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("CORS_CREDENTIALS", "true"),
            ("MODE", "test"),
        ]);

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.cors_credentials);
        assert!(config.is_test_mode());
    }

    #[test]
    fn test_bad_log_format_is_kept_as_warning() {
        let config = config_from(&[("LOG_FORMAT", "xml")]);

        assert_eq!(config.log_format, LogFormat::Full);
        assert_eq!(config.warnings().len(), 1);
        assert!(config.warnings()[0].contains("unknown log format: xml"));
        assert!(config_from(&[("LOG_FORMAT", "pretty")]).warnings().is_empty());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[
            ("POSTGRES_PASSWORD", "hunter2"),
            ("REDIS_URL", "redis://:hunter2@cache:6379"),
        ]);

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
