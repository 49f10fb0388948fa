//! Register configuration loaded from environment variables.
//!
//! The configuration is built once at startup and passed explicitly to the
//! [`SalesSession`](crate::session::SalesSession); nothing reads it from a
//! global.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TILL_STORE_NAME` - Name printed on receipts (default: My Store)
//! - `TILL_CURRENCY` - ISO 4217 currency code (default: INR)
//! - `TILL_TAX_RATE` - Sales tax as a percentage (default: 5)
//! - `TILL_PROCESSING_DELAY_MS` - Simulated payment settlement time (default: 1800)
//! - `TILL_STORAGE_PATH` - Local storage file (default: .till/storage.json)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use till_core::CurrencyCode;

const DEFAULT_STORE_NAME: &str = "My Store";
const DEFAULT_TAX_PERCENT: &str = "5";
const DEFAULT_PROCESSING_DELAY_MS: &str = "1800";
const DEFAULT_STORAGE_PATH: &str = ".till/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterConfig {
    /// Store name shown on receipts
    pub store_name: String,
    /// Currency all catalog prices are expressed in
    pub currency: CurrencyCode,
    /// Tax rate as a fraction (`0.05` for 5%)
    pub tax_rate: Decimal,
    /// How long simulated payment settlement takes
    pub processing_delay: Duration,
    /// File backing the local key-value storage
    pub storage_path: PathBuf,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            currency: CurrencyCode::default(),
            tax_rate: Decimal::new(5, 2),
            processing_delay: Duration::from_millis(1800),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl RegisterConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store_name = get_or("TILL_STORE_NAME", DEFAULT_STORE_NAME);

        let currency = CurrencyCode::from_str(&get_or("TILL_CURRENCY", "INR"))
            .map_err(|e| ConfigError::InvalidEnvVar("TILL_CURRENCY".to_string(), e))?;

        let tax_rate = parse_tax_percent(&get_or("TILL_TAX_RATE", DEFAULT_TAX_PERCENT))?;

        let processing_delay = get_or("TILL_PROCESSING_DELAY_MS", DEFAULT_PROCESSING_DELAY_MS)
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TILL_PROCESSING_DELAY_MS".to_string(), e.to_string())
            })?;

        let storage_path = PathBuf::from(get_or("TILL_STORAGE_PATH", DEFAULT_STORAGE_PATH));

        Ok(Self {
            store_name,
            currency,
            tax_rate,
            processing_delay,
            storage_path,
        })
    }

    /// Tax rate as a percentage, for display (`5` for 5%).
    #[must_use]
    pub fn tax_percent(&self) -> Decimal {
        (self.tax_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Parse a percentage in `[0, 100]` into a fraction.
fn parse_tax_percent(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("TILL_TAX_RATE".to_string(), msg);

    let percent = Decimal::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED {
        return Err(invalid(format!("must be between 0 and 100 (got {percent})")));
    }

    Ok(percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RegisterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RegisterConfig::default());
        assert_eq!(config.tax_rate, Decimal::new(5, 2));
        assert_eq!(config.processing_delay, Duration::from_millis(1800));
    }

    #[test]
    fn test_tax_rate_percent_is_converted_to_fraction() {
        let config = RegisterConfig::from_lookup(lookup(&[("TILL_TAX_RATE", "8.5")])).unwrap();
        assert_eq!(config.tax_rate, Decimal::new(85, 3));
        assert_eq!(config.tax_percent(), Decimal::new(85, 1));
    }

    #[test]
    fn test_tax_rate_out_of_range() {
        let result = RegisterConfig::from_lookup(lookup(&[("TILL_TAX_RATE", "150")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(var, _)) if var == "TILL_TAX_RATE"));

        let result = RegisterConfig::from_lookup(lookup(&[("TILL_TAX_RATE", "-1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_tax_rate_not_a_number() {
        let result = RegisterConfig::from_lookup(lookup(&[("TILL_TAX_RATE", "five")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_currency() {
        let result = RegisterConfig::from_lookup(lookup(&[("TILL_CURRENCY", "DOGE")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(var, _)) if var == "TILL_CURRENCY"));
    }

    #[test]
    fn test_processing_delay_and_storage_path() {
        let config = RegisterConfig::from_lookup(lookup(&[
            ("TILL_PROCESSING_DELAY_MS", "0"),
            ("TILL_STORAGE_PATH", "/tmp/till.json"),
            ("TILL_STORE_NAME", "Corner Shop"),
        ]))
        .unwrap();
        assert_eq!(config.processing_delay, Duration::ZERO);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/till.json"));
        assert_eq!(config.store_name, "Corner Shop");
    }
}
