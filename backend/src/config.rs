//! Configuration management for the Shortfall Items service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SHORTFALL__ prefix, sections
//!    separated by `__` (e.g. SHORTFALL__ERP__API_KEY)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::ExclusionPolicy;
use validator::Validate;

/// Default whitelisted method that raises a shortfall material request
pub const DEFAULT_CREATE_METHOD: &str =
    "shortfall_items.shortfall_items.doctype.shortfall_items.shortfall_items.create_shortfall_material_request";

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// ERP connection configuration
    #[validate]
    pub erp: ErpConfig,

    /// Shortfall scan configuration
    #[validate]
    pub scanner: ScannerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ErpConfig {
    /// Base URL of the ERP REST API
    #[validate(url)]
    pub base_url: String,

    /// API key of the integration user
    #[validate(length(min = 1))]
    pub api_key: String,

    /// API secret of the integration user
    #[validate(length(min = 1))]
    pub api_secret: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,

    /// Whitelisted method that raises a shortfall material request
    #[validate(length(min = 1))]
    pub create_method: String,

    /// Public desk URL used for document links, defaults to base_url
    pub desk_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ScannerConfig {
    /// Which existing requests keep a work order off the report
    pub exclusion_policy: ExclusionPolicy,

    /// Work orders evaluated concurrently during a scan
    #[validate(range(min = 1, max = 64))]
    pub max_concurrency: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SHORTFALL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("erp.base_url", "http://localhost:8000")?
            .set_default("erp.api_key", "")?
            .set_default("erp.api_secret", "")?
            .set_default("erp.timeout_secs", 30)?
            .set_default("erp.create_method", DEFAULT_CREATE_METHOD)?
            .set_default("scanner.exclusion_policy", "non_cancelled")?
            .set_default("scanner.max_concurrency", 1)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SHORTFALL__ERP__API_KEY, ...)
            .add_source(
                Environment::with_prefix("SHORTFALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid configuration: {}", e)))?;

        Ok(config)
    }
}

impl ErpConfig {
    /// Base URL used for links shown to users
    pub fn desk_url(&self) -> &str {
        self.desk_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.base_url)
            .trim_end_matches('/')
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            exclusion_policy: ExclusionPolicy::NonCancelled,
            max_concurrency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn erp_config() -> ErpConfig {
        ErpConfig {
            base_url: "https://erp.example.com".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            timeout_secs: 30,
            create_method: DEFAULT_CREATE_METHOD.to_string(),
            desk_url: None,
        }
    }

    #[test]
    fn test_desk_url_falls_back_to_base_url() {
        let mut erp = erp_config();
        assert_eq!(erp.desk_url(), "https://erp.example.com");

        erp.desk_url = Some("https://desk.example.com/".to_string());
        assert_eq!(erp.desk_url(), "https://desk.example.com");
    }

    #[test]
    fn test_erp_config_validation() {
        assert!(erp_config().validate().is_ok());

        let mut missing_key = erp_config();
        missing_key.api_key = String::new();
        assert!(missing_key.validate().is_err());

        let mut bad_url = erp_config();
        bad_url.base_url = "not a url".to_string();
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_scanner_concurrency_bounds() {
        let scanner = ScannerConfig {
            exclusion_policy: ExclusionPolicy::DraftOnly,
            max_concurrency: 0,
        };
        assert!(scanner.validate().is_err());
        assert!(ScannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_reads_double_underscore_env_vars() {
        std::env::set_var("SHORTFALL_ERP__API_KEY", "single");
        std::env::set_var("SHORTFALL_ERP__API_SECRET", "single");
        assert!(Config::load().is_err());

        std::env::set_var("SHORTFALL__ERP__API_KEY", "k2");
        std::env::set_var("SHORTFALL__ERP__API_SECRET", "s2");
        std::env::set_var("SHORTFALL__SCANNER__EXCLUSION_POLICY", "draft_only");
        let loaded = Config::load();

        for var in [
            "SHORTFALL_ERP__API_KEY",
            "SHORTFALL_ERP__API_SECRET",
            "SHORTFALL__ERP__API_KEY",
            "SHORTFALL__ERP__API_SECRET",
            "SHORTFALL__SCANNER__EXCLUSION_POLICY",
        ] {
            std::env::remove_var(var);
        }

        let config = loaded.unwrap();
        assert_eq!(config.erp.api_key, "k2");
        assert_eq!(config.erp.api_secret, "s2");
        assert_eq!(config.scanner.exclusion_policy, ExclusionPolicy::DraftOnly);
    }
}
