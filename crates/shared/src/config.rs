//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Billing rate configuration.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration values.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Billing rate configuration.
///
/// Defaults mirror the production rate card: 1000 free phone minutes,
/// 10 units per started 1000-minute block, 50 units base internet charge
/// covering 20GB, 10 units per started 10GB block beyond that.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Free phone minutes per billing period.
    #[serde(default = "default_free_phone_minutes")]
    pub free_phone_minutes: i64,
    /// Size of one billable phone block, in minutes.
    #[serde(default = "default_phone_block_minutes")]
    pub phone_block_minutes: i64,
    /// Charge per started phone block.
    #[serde(default = "default_phone_block_rate")]
    pub phone_block_rate: Decimal,
    /// Flat internet base charge (applies to any non-zero usage).
    #[serde(default = "default_internet_base_charge")]
    pub internet_base_charge: Decimal,
    /// GB covered by the base charge.
    #[serde(default = "default_internet_base_allowance_gb")]
    pub internet_base_allowance_gb: Decimal,
    /// Size of one billable internet block, in GB.
    #[serde(default = "default_internet_block_gb")]
    pub internet_block_gb: Decimal,
    /// Charge per started internet block.
    #[serde(default = "default_internet_block_rate")]
    pub internet_block_rate: Decimal,
    /// Daily query limit per subscriber on the mobile bill endpoint.
    #[serde(default = "default_query_limit_per_day")]
    pub query_limit_per_day: u32,
}

fn default_free_phone_minutes() -> i64 {
    1000
}

fn default_phone_block_minutes() -> i64 {
    1000
}

fn default_phone_block_rate() -> Decimal {
    Decimal::from(10)
}

fn default_internet_base_charge() -> Decimal {
    Decimal::from(50)
}

fn default_internet_base_allowance_gb() -> Decimal {
    Decimal::from(20)
}

fn default_internet_block_gb() -> Decimal {
    Decimal::from(10)
}

fn default_internet_block_rate() -> Decimal {
    Decimal::from(10)
}

fn default_query_limit_per_day() -> u32 {
    3
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            free_phone_minutes: default_free_phone_minutes(),
            phone_block_minutes: default_phone_block_minutes(),
            phone_block_rate: default_phone_block_rate(),
            internet_base_charge: default_internet_base_charge(),
            internet_base_allowance_gb: default_internet_base_allowance_gb(),
            internet_block_gb: default_internet_block_gb(),
            internet_block_rate: default_internet_block_rate(),
            query_limit_per_day: default_query_limit_per_day(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TELBILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_billing_defaults_match_rate_card() {
        let billing = BillingConfig::default();
        assert_eq!(billing.free_phone_minutes, 1000);
        assert_eq!(billing.phone_block_minutes, 1000);
        assert_eq!(billing.phone_block_rate, dec!(10));
        assert_eq!(billing.internet_base_charge, dec!(50));
        assert_eq!(billing.internet_base_allowance_gb, dec!(20));
        assert_eq!(billing.internet_block_gb, dec!(10));
        assert_eq!(billing.internet_block_rate, dec!(10));
        assert_eq!(billing.query_limit_per_day, 3);
    }
}
