//! HTTP adapter configuration

use serde::Deserialize;

/// Connection settings for the remote ledger and directory services
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the backend API (e.g., "https://sistema.colegio.mx/api")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Route the user is sent back to when the session is gone
    pub login_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            login_path: "/auth/v2/login".to_string(),
        }
    }
}

impl HttpConfig {
    /// Loads configuration from `LEDGER_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("base_url", HttpConfig::default().base_url)?
            .set_default("timeout_secs", 30)?
            .set_default("login_path", HttpConfig::default().login_path)?
            .add_source(config::Environment::with_prefix("LEDGER"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.login_path, "/auth/v2/login");
    }

    #[test]
    fn test_from_env_uses_defaults_when_unset() {
        let config = HttpConfig::from_env().unwrap();
        assert_eq!(config.login_path, "/auth/v2/login");
    }
}
