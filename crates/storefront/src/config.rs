//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (https enables secure cookies)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CHECKOUT_STANDARD_SHIPPING_KRW` - Standard freight cost (default: 15000)
//! - `CHECKOUT_EXPRESS_SHIPPING_KRW` - Express freight cost (default: 45000)
//! - `CHECKOUT_CUSTOMS_RATE` - Flat customs estimate rate (default: 0.15)
//! - `CHECKOUT_KRW_TO_NGN_RATE` - Fixed display conversion rate (default: 1.15)
//! - `CHECKOUT_SEED_CART_PATH` - JSON file with the cart new checkouts start from
//! - `ORDER_API_URL` - Order backend base URL; when unset orders are simulated
//! - `ORDER_API_KEY` - Order backend API key (required with `ORDER_API_URL`)
//! - `ORDER_API_TIMEOUT_SECS` - Order backend request timeout (default: 20)
//! - `ORDER_SIMULATED_DELAY_MS` - Simulated submission latency (default: 1500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0 / 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use hanbit_core::{Cart, Money, PricingTable};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Fixed shipping, customs and exchange rates
    pub pricing: PricingTable,
    /// Seed cart file; built-in parts when unset
    pub seed_cart_path: Option<PathBuf>,
    /// Where orders are submitted
    pub orders: OrderBackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Order submission backend.
#[derive(Debug, Clone)]
pub enum OrderBackendConfig {
    /// Submit to a real order/payment API.
    Http(OrderApiConfig),
    /// Accept every order after a fixed delay.
    Simulated { delay: Duration },
}

/// Order API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OrderApiConfig {
    pub base_url: Url,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl std::fmt::Debug for OrderApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&Env::Process)
    }

    fn from_lookup(env: &Env) -> Result<Self, ConfigError> {
        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or("STOREFRONT_PORT", "3000")?;
        let base_url = env.required("STOREFRONT_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let pricing = pricing_from_env(env)?;
        let seed_cart_path = env.optional("CHECKOUT_SEED_CART_PATH").map(PathBuf::from);
        let orders = OrderBackendConfig::from_lookup(env)?;

        Ok(Self {
            host,
            port,
            base_url,
            pricing,
            seed_cart_path,
            orders,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OrderBackendConfig {
    fn from_lookup(env: &Env) -> Result<Self, ConfigError> {
        let Some(url) = env.optional("ORDER_API_URL") else {
            let delay_ms: u64 = env.parse_or("ORDER_SIMULATED_DELAY_MS", "1500")?;
            return Ok(Self::Simulated {
                delay: Duration::from_millis(delay_ms),
            });
        };

        let base_url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("ORDER_API_URL".to_string(), e.to_string()))?;
        let api_key = get_validated_secret(env, "ORDER_API_KEY")?;
        let timeout_secs: u64 = env.parse_or("ORDER_API_TIMEOUT_SECS", "20")?;

        Ok(Self::Http(OrderApiConfig {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

fn pricing_from_env(env: &Env) -> Result<PricingTable, ConfigError> {
    let defaults = PricingTable::default();
    let standard: i64 = env.parse_or("CHECKOUT_STANDARD_SHIPPING_KRW", "15000")?;
    let express: i64 = env.parse_or("CHECKOUT_EXPRESS_SHIPPING_KRW", "45000")?;
    let customs_rate: Decimal = env.parse_or("CHECKOUT_CUSTOMS_RATE", "0.15")?;
    let exchange_rate: Decimal = env.parse_or("CHECKOUT_KRW_TO_NGN_RATE", "1.15")?;

    let table = PricingTable {
        standard_shipping: Money::whole(standard, Cart::LISTING_CURRENCY),
        express_shipping: Money::whole(express, Cart::LISTING_CURRENCY),
        customs_rate,
        exchange_rate,
        display_currency: defaults.display_currency,
    };
    table
        .validate()
        .map_err(|e| ConfigError::InvalidEnvVar("CHECKOUT_*".to_string(), e.to_string()))?;
    Ok(table)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Where variables are read from.
enum Env {
    Process,
    #[cfg(test)]
    Map(HashMap<&'static str, &'static str>),
}

impl Env {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(key).ok(),
            #[cfg(test)]
            Self::Map(map) => map.get(key).map(|v| (*v).to_string()),
        }
    }

    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse an environment variable, falling back to a default.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret.
fn get_validated_secret(env: &Env, key: &str) -> Result<SecretString, ConfigError> {
    let value = env.required(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hanbit_core::CurrencyCode;
    use secrecy::ExposeSecret;

    use super::*;

    const STRONG_KEY: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn env(pairs: &[(&'static str, &'static str)]) -> Env {
        Env::Map(pairs.iter().copied().collect())
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config =
            StorefrontConfig::from_lookup(&env(&[("STOREFRONT_BASE_URL", "http://localhost:3000")]))
                .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.pricing, PricingTable::default());
        assert!(config.seed_cart_path.is_none());
        assert!(!config.is_secure());
        assert!(matches!(
            config.orders,
            OrderBackendConfig::Simulated { delay } if delay == Duration::from_millis(1500)
        ));
    }

    #[test]
    fn test_missing_base_url() {
        let err = StorefrontConfig::from_lookup(&env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("STOREFRONT_PORT", "seventy"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_pricing_overrides() {
        let config = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "https://shop.hanbit.kr"),
            ("CHECKOUT_STANDARD_SHIPPING_KRW", "20000"),
            ("CHECKOUT_EXPRESS_SHIPPING_KRW", "60000"),
            ("CHECKOUT_CUSTOMS_RATE", "0.2"),
            ("CHECKOUT_KRW_TO_NGN_RATE", "1.08"),
        ]))
        .unwrap();

        assert!(config.is_secure());
        assert_eq!(
            config.pricing.standard_shipping,
            Money::whole(20_000, CurrencyCode::KRW)
        );
        assert_eq!(config.pricing.customs_rate, Decimal::new(2, 1));
        assert_eq!(config.pricing.exchange_rate, Decimal::new(108, 2));
    }

    #[test]
    fn test_pricing_rejects_cheaper_express() {
        let err = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("CHECKOUT_EXPRESS_SHIPPING_KRW", "1000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_order_api_requires_strong_key() {
        let err = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("ORDER_API_URL", "https://orders.hanbit.kr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "ORDER_API_KEY"));

        let err = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("ORDER_API_URL", "https://orders.hanbit.kr"),
            ("ORDER_API_KEY", "your-api-key-here"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_order_api_config() {
        let config = StorefrontConfig::from_lookup(&env(&[
            ("STOREFRONT_BASE_URL", "http://localhost"),
            ("ORDER_API_URL", "https://orders.hanbit.kr/v1/"),
            ("ORDER_API_KEY", STRONG_KEY),
            ("ORDER_API_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        let OrderBackendConfig::Http(api) = config.orders else {
            panic!("expected HTTP order backend");
        };
        assert_eq!(api.base_url.as_str(), "https://orders.hanbit.kr/v1/");
        assert_eq!(api.api_key.expose_secret(), STRONG_KEY);
        assert_eq!(api.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_order_api_debug_redacts_key() {
        let api = OrderApiConfig {
            base_url: Url::parse("https://orders.hanbit.kr").unwrap(),
            api_key: SecretString::from(STRONG_KEY),
            timeout: Duration::from_secs(1),
        };
        let debug_output = format!("{api:?}");
        assert!(debug_output.contains("orders.hanbit.kr"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(STRONG_KEY));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
        assert!(validate_secret_strength(&"a".repeat(33), "TEST_VAR").is_err());
        assert!(validate_secret_strength(STRONG_KEY, "TEST_VAR").is_ok());
    }
}
