//! API endpoint configuration per deployment environment.
//!
//! Environment variables:
//! - `SKIFINDER_ENVIRONMENT`: `development` or `production`
//! - `SKIFINDER_API_URL`: overrides the base URL of the selected environment

use std::time::Duration;

use log::warn;

pub const ENVIRONMENT_VAR: &str = "SKIFINDER_ENVIRONMENT";
pub const API_URL_VAR: &str = "SKIFINDER_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse an environment name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Development for debug builds, production otherwise.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// Where and how to reach the SkiFinder API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL including the version prefix, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Log every request and response at info level
    pub enable_logging: bool,
}

impl ApiConfig {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                base_url: "http://localhost:3001/api/v1".to_string(),
                timeout: Duration::from_secs(10),
                enable_logging: true,
            },
            Environment::Production => Self {
                base_url: "https://ski-route-api.onrender.com/api/v1".to_string(),
                timeout: Duration::from_secs(15),
                enable_logging: false,
            },
        }
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(ENVIRONMENT_VAR).ok().as_deref(),
            std::env::var(API_URL_VAR).ok().as_deref(),
        )
    }

    /// Resolve configuration from explicit variable values.
    pub fn from_vars(environment: Option<&str>, api_url: Option<&str>) -> Self {
        let environment = match environment {
            Some(name) => Environment::parse(name).unwrap_or_else(|| {
                warn!("[ApiConfig] Unknown environment '{}', using build default", name);
                Environment::build_default()
            }),
            None => Environment::build_default(),
        };

        let mut config = Self::for_environment(environment);
        if let Some(url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_environment(Environment::build_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("Production"), Some(Environment::Production));
        assert_eq!(Environment::parse(" dev "), Some(Environment::Development));
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn test_environment_defaults() {
        let dev = ApiConfig::for_environment(Environment::Development);
        assert_eq!(dev.base_url, "http://localhost:3001/api/v1");
        assert_eq!(dev.timeout, Duration::from_secs(10));
        assert!(dev.enable_logging);

        let prod = ApiConfig::for_environment(Environment::Production);
        assert_eq!(prod.base_url, "https://ski-route-api.onrender.com/api/v1");
        assert_eq!(prod.timeout, Duration::from_secs(15));
        assert!(!prod.enable_logging);
    }

    #[test]
    fn test_from_vars_overrides_url() {
        let config = ApiConfig::from_vars(Some("production"), Some("https://staging.example.com/api/v1/"));
        assert_eq!(config.base_url, "https://staging.example.com/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_from_vars_ignores_blank_url() {
        let config = ApiConfig::from_vars(Some("development"), Some("  "));
        assert_eq!(config.base_url, "http://localhost:3001/api/v1");
    }

    #[test]
    fn test_unknown_environment_uses_build_default() {
        let config = ApiConfig::from_vars(Some("staging"), None);
        assert_eq!(config, ApiConfig::for_environment(Environment::build_default()));
    }

    #[test]
    fn test_url_join() {
        let config = ApiConfig::for_environment(Environment::Development);
        assert_eq!(config.url("/resorts"), "http://localhost:3001/api/v1/resorts");
        assert_eq!(config.url("route"), "http://localhost:3001/api/v1/route");
    }
}
