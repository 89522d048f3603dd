//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger posting rules.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Inventory and transfer rules.
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Log every SQL statement at debug level.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger posting rules.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Largest debit/credit difference still considered balanced (exclusive).
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// What cancelling an `in_transit` transfer is allowed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InTransitCancellationPolicy {
    /// Refuse the cancellation; goods already moved stay moved.
    #[default]
    Reject,
    /// Zero the destination layers the transfer created and re-create them
    /// at the source at the same unit costs, reversing any linked journal.
    ReverseTransferLayers,
}

/// Inventory and transfer rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryConfig {
    /// Policy applied by `cancel_transfer` to `in_transit` transfers.
    #[serde(default)]
    pub in_transit_cancellation: InTransitCancellationPolicy,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `TALLY__*` variables
    /// (e.g. `TALLY__DATABASE__URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally_test")),
                ("TALLY__LEDGER__BALANCE_TOLERANCE", Some("0.05")),
                (
                    "TALLY__INVENTORY__IN_TRANSIT_CANCELLATION",
                    Some("reverse_transfer_layers"),
                ),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tally_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.balance_tolerance, dec!(0.05));
                assert_eq!(
                    config.inventory.in_transit_cancellation,
                    InTransitCancellationPolicy::ReverseTransferLayers
                );
            },
        );
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally_test")),
                ("TALLY__LEDGER__BALANCE_TOLERANCE", None),
                ("TALLY__INVENTORY__IN_TRANSIT_CANCELLATION", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.balance_tolerance, dec!(0.01));
                assert_eq!(
                    config.inventory.in_transit_cancellation,
                    InTransitCancellationPolicy::Reject
                );
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars([("TALLY__DATABASE__URL", None::<&str>)], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
