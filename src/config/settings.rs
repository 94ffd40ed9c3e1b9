//! Application settings loaded from config.toml
//!
//! The file carries everything that is not a secret: the simulated payment
//! delay, the subscription plans on offer and promo codes to seed on startup.
//! Every section is optional and falls back to sensible defaults.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Payment simulation settings
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Recurring donation plans users can subscribe to
    #[serde(default = "default_plans")]
    pub subscription_plans: Vec<PlanConfig>,
    /// Promo codes inserted on startup when missing
    #[serde(default)]
    pub promo_codes: Vec<PromoCodeConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            payment: PaymentConfig::default(),
            subscription_plans: default_plans(),
            promo_codes: Vec::new(),
        }
    }
}

/// Payment simulation settings
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Fixed time a simulated card payment takes, in milliseconds
    #[serde(default = "default_payment_delay_ms")]
    pub simulated_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: default_payment_delay_ms(),
        }
    }
}

impl PaymentConfig {
    /// Simulated payment delay as a `Duration`
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// A subscription plan
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlanConfig {
    /// Plan name users pick (e.g. "monthly")
    pub name: String,
    /// Amount charged per period, before discounts
    pub amount: f64,
    /// Billing period in months
    pub interval_months: u32,
}

/// A promo code to seed
#[derive(Debug, Deserialize, Clone)]
pub struct PromoCodeConfig {
    pub code: String,
    pub discount_percent: i32,
    #[serde(default)]
    pub max_uses: Option<i32>,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
}

const fn default_payment_delay_ms() -> u64 {
    1500
}

fn default_plans() -> Vec<PlanConfig> {
    vec![
        PlanConfig {
            name: "monthly".to_string(),
            amount: 10.0,
            interval_months: 1,
        },
        PlanConfig {
            name: "yearly".to_string(),
            amount: 100.0,
            interval_months: 12,
        },
    ]
}

impl AppConfig {
    /// Looks up a plan by name, ignoring case.
    #[must_use]
    pub fn plan(&self, name: &str) -> Option<&PlanConfig> {
        self.subscription_plans
            .iter()
            .find(|plan| plan.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A plan has a non-positive amount or a zero interval
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses and checks settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    for plan in &config.subscription_plans {
        if !plan.amount.is_finite() || plan.amount <= 0.0 || plan.interval_months == 0 {
            return Err(Error::Config {
                message: format!("Plan '{}' needs a positive amount and interval", plan.name),
            });
        }
    }

    Ok(config)
}

/// Loads settings from the default location (./config.toml), falling back to
/// built-in defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if !path.exists() {
        warn!("config.toml not found, using default settings");
        return Ok(AppConfig::default());
    }
    load_config(path)
}
