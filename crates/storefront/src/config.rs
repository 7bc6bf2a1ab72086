//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAKEHOUSE_CART_PATH` - Cart snapshot file (default: `.bakehouse/cart.json`)
//! - `BAKEHOUSE_API_URL` - Entity API base URL; checkout is disabled without it
//! - `BAKEHOUSE_API_KEY` - Entity API key (required when `BAKEHOUSE_API_URL` is set)
//! - `BAKEHOUSE_ORDER_ENTITY` - Entity name orders are created under (default: `Order`)
//! - `BAKEHOUSE_API_TIMEOUT_SECS` - Request timeout (default: 15)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CART_PATH: &str = ".bakehouse/cart.json";
const DEFAULT_ORDER_ENTITY: &str = "Order";
const DEFAULT_TIMEOUT_SECS: &str = "15";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// File the cart snapshot is persisted to
    pub cart_path: PathBuf,
    /// Entity API access, if configured
    pub api: Option<EntityApiConfig>,
}

/// Entity API configuration.
///
/// `Debug` comes from `SecretString`, which redacts the key.
#[derive(Debug, Clone)]
pub struct EntityApiConfig {
    /// Base URL, always ending in `/` so relative joins append to it
    pub base_url: Url,
    /// Bearer token
    pub api_key: SecretString,
    /// Entity name used for order creation
    pub order_entity: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if the API URL is
    /// set without a usable API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let cart_path = PathBuf::from(env.or_default("BAKEHOUSE_CART_PATH", DEFAULT_CART_PATH));
        let api = env
            .optional("BAKEHOUSE_API_URL")
            .map(|raw| EntityApiConfig::from_env(&env, &raw))
            .transpose()?;

        Ok(Self { cart_path, api })
    }
}

impl EntityApiConfig {
    fn from_env<F>(env: &Env<F>, raw_url: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = normalize_base_url(raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BAKEHOUSE_API_URL".to_string(), e))?;

        let api_key = env.required("BAKEHOUSE_API_KEY")?;
        validate_api_key(&api_key, "BAKEHOUSE_API_KEY")?;

        let timeout_secs = env
            .or_default("BAKEHOUSE_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAKEHOUSE_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
            order_entity: env.or_default("BAKEHOUSE_ORDER_ENTITY", DEFAULT_ORDER_ENTITY),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse an HTTP(S) base URL and make sure its path ends with `/`.
fn normalize_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Reject API keys that are obviously copied from a template.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = key.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.cart_path, PathBuf::from(".bakehouse/cart.json"));
        assert!(config.api.is_none());
    }

    #[test]
    fn test_api_config() {
        let config = load(&[
            ("BAKEHOUSE_CART_PATH", "/tmp/cart.json"),
            ("BAKEHOUSE_API_URL", "https://api.bakehouse.test/v1"),
            ("BAKEHOUSE_API_KEY", "k_9f8a7b6c5d4e3f2a1b0c"),
            ("BAKEHOUSE_API_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        let api = config.api.unwrap();
        assert_eq!(config.cart_path, PathBuf::from("/tmp/cart.json"));
        assert_eq!(api.base_url.as_str(), "https://api.bakehouse.test/v1/");
        assert_eq!(api.api_key.expose_secret(), "k_9f8a7b6c5d4e3f2a1b0c");
        assert_eq!(api.order_entity, "Order");
        assert_eq!(api.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_api_url_requires_key() {
        let err = load(&[("BAKEHOUSE_API_URL", "https://api.bakehouse.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "BAKEHOUSE_API_KEY"));
    }

    #[test]
    fn test_blank_api_url_disables_api() {
        let config = load(&[("BAKEHOUSE_API_URL", "  ")]).unwrap();
        assert!(config.api.is_none());
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[
            ("BAKEHOUSE_API_URL", "ftp://api.bakehouse.test"),
            ("BAKEHOUSE_API_KEY", "k_9f8a7b6c5d4e3f2a1b0c"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[
            ("BAKEHOUSE_API_URL", "https://api.bakehouse.test"),
            ("BAKEHOUSE_API_KEY", "k_9f8a7b6c5d4e3f2a1b0c"),
            ("BAKEHOUSE_API_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "BAKEHOUSE_API_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate_api_key_placeholder() {
        let result = validate_api_key("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
        assert!(validate_api_key("CHANGEME", "TEST_VAR").is_err());
        assert!(validate_api_key("k_9f8a7b6c5d4e3f2a1b0c", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_normalize_base_url_keeps_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:8080").unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080/api/").unwrap().as_str(),
            "http://localhost:8080/api/"
        );
    }
}
