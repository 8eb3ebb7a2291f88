//! # Checkout Configuration
//!
//! Store and tax settings used by the hosting layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TESSERA_TAX_RATE_BPS=825                                           │
//! │     TESSERA_TAX_RATE=8.25                                              │
//! │     TESSERA_STORE_NAME, TESSERA_CURRENCY_CODE, TESSERA_CURRENCY_SYMBOL │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $TESSERA_CONFIG, or                                                │
//! │     ~/.config/tessera-pos/checkout.toml (Linux)                        │
//! │     ~/Library/Application Support/com.tessera.pos/checkout.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, 8.25% tax                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [store]
//! name = "Downtown Branch"
//! currency_code = "USD"
//! currency_symbol = "$"
//! currency_decimals = 2
//!
//! [tax]
//! rate_bps = 825
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessera_core::validation::validate_tax_rate_bps;
use tessera_core::{Money, TaxRate};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TESSERA_CONFIG";

// =============================================================================
// Store Settings
// =============================================================================

/// Store identity and currency display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store name (shown in logs and receipts).
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency code (ISO 4217).
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Currency symbol (for display).
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Number of decimal places for currency.
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,
}

fn default_store_name() -> String {
    "Tessera Demo Store".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// Tax applied to every quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    /// Tax rate in basis points, e.g. 825 = 8.25%.
    #[serde(default = "default_rate_bps")]
    pub rate_bps: u32,
}

fn default_rate_bps() -> u32 {
    825
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            rate_bps: default_rate_bps(),
        }
    }
}

// =============================================================================
// Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub tax: TaxSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`checkout.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tax_rate_bps(self.tax.rate_bps).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let code = &self.store.currency_code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "currency_code must be three letters, got: '{}'",
                code
            )));
        }

        if self.store.currency_decimals > 4 {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most 4, got: {}",
                self.store.currency_decimals
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// `TESSERA_TAX_RATE_BPS` wins over `TESSERA_TAX_RATE` when both are set.
    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = env("TESSERA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(rate) = env("TESSERA_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if pct.is_finite() && pct >= 0.0 => {
                    let bps = TaxRate::from_percentage(pct).bps();
                    debug!(rate_bps = bps, "Overriding tax rate from environment");
                    self.tax.rate_bps = bps;
                }
                _ => warn!(rate = %rate, "Ignoring unparseable TESSERA_TAX_RATE"),
            }
        }

        if let Some(bps) = env("TESSERA_TAX_RATE_BPS") {
            match bps.trim().parse::<u32>() {
                Ok(b) => {
                    debug!(rate_bps = b, "Overriding tax rate from environment");
                    self.tax.rate_bps = b;
                }
                Err(_) => warn!(rate_bps = %bps, "Ignoring unparseable TESSERA_TAX_RATE_BPS"),
            }
        }

        if let Some(code) = env("TESSERA_CURRENCY_CODE") {
            self.store.currency_code = code.trim().to_uppercase();
        }

        if let Some(symbol) = env("TESSERA_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tessera", "pos")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax.rate_bps)
    }

    /// Formats an amount of minor units for display.
    ///
    /// ```rust
    /// use tessera_checkout::config::CheckoutConfig;
    /// use tessera_core::Money;
    ///
    /// let config = CheckoutConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, money: Money) -> String {
        let cents = money.cents();
        let decimals = u32::from(self.store.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.store.currency_symbol,
                whole,
                frac,
                width = decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.store.currency_symbol, whole)
        }
    }
}
