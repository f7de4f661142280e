//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use blogicum_core::policy::DEFAULT_PAGE_SIZE;
use blogicum_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub posts_per_page: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| parse::<u64>(key, &v));

        let database = lookup("DATABASE_URL").map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parsed("DB_MAX_CONNECTIONS") {
                config.max_connections = max as u32;
            }
            if let Some(min) = parsed("DB_MIN_CONNECTIONS") {
                config.min_connections = min as u32;
            }
            if let Some(secs) = parsed("DB_CONNECT_TIMEOUT_SECS") {
                config.connect_timeout = Duration::from_secs(secs);
            }
            config
        });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|v| parse("PORT", &v))
                .unwrap_or(8080),
            database,
            posts_per_page: parsed("POSTS_PER_PAGE")
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Parse a variable, warning (and falling back to the default) on bad input.
fn parse<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value, "Ignoring unparsable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.database.is_none());
        assert_eq!(config.posts_per_page, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_database_settings() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("DB_MAX_CONNECTIONS", "50"),
            ("POSTS_PER_PAGE", "5"),
            ("PORT", "9000"),
        ]);

        let db = config.database.expect("database configured");
        assert_eq!(db.url, "postgres://localhost/blog");
        assert_eq!(db.max_connections, 50);
        assert_eq!(config.posts_per_page, 5);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[("PORT", "eighty"), ("POSTS_PER_PAGE", "0")]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.posts_per_page, DEFAULT_PAGE_SIZE);
    }
}
