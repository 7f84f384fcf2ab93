//! Configuration for the ledger

use crate::types::Palette;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Balance granted to every new player
    pub starting_balance: Decimal,

    /// Player colors, assigned cyclically by join order
    pub palette: Palette,

    /// Description stored when the caller leaves it blank
    pub default_description: String,

    /// Display name of the bank counterparty
    pub bank_label: String,

    /// Transfer policy knobs
    pub policy: TransferPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "bank-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            starting_balance: Decimal::from(1500),
            palette: Palette::default(),
            default_description: "Transaction".to_string(),
            bank_label: "Bank".to_string(),
            policy: TransferPolicy::default(),
        }
    }
}

/// Transfer policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferPolicy {
    /// Check the paying player's balance when the acting player receives
    /// from another player. Off by default: the acting player's framing is
    /// trusted and only outgoing amounts are balance-checked.
    pub verify_counterparty_funds: bool,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Config::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of this config
    pub fn with_env_overrides(mut self) -> crate::Result<Self> {
        if let Ok(balance) = std::env::var("BANK_STARTING_BALANCE") {
            self.starting_balance = Decimal::from_str(balance.trim()).map_err(|e| {
                crate::Error::Config(format!("Invalid BANK_STARTING_BALANCE: {}", e))
            })?;
        }

        if let Ok(description) = std::env::var("BANK_DEFAULT_DESCRIPTION") {
            self.default_description = description;
        }

        if let Ok(label) = std::env::var("BANK_LABEL") {
            self.bank_label = label;
        }

        if let Ok(flag) = std::env::var("BANK_VERIFY_COUNTERPARTY_FUNDS") {
            self.policy.verify_counterparty_funds = parse_flag(&flag).ok_or_else(|| {
                crate::Error::Config(format!("Invalid BANK_VERIFY_COUNTERPARTY_FUNDS: {}", flag))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check values the ledger relies on
    pub fn validate(&self) -> crate::Result<()> {
        if self.palette.is_empty() {
            return Err(crate::Error::Config("Palette must not be empty".to_string()));
        }

        if self.starting_balance < Decimal::ZERO {
            return Err(crate::Error::Config(format!(
                "Starting balance must not be negative: {}",
                self.starting_balance
            )));
        }

        if self.default_description.trim().is_empty() {
            return Err(crate::Error::Config(
                "Default description must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
