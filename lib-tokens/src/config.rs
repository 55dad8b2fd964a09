//! Token Configuration
//!
//! Construction parameters loaded from TOML. Addresses are written as 64-char
//! hex strings (an optional `0x` prefix is accepted). TOML integers are 64-bit,
//! so `initial_supply` is read as a `u64` and widened to [`Amount`].
//!
//! ```toml
//! name = "Policy Token"
//! symbol = "PLT"
//! tax_enabled = true
//! tax = 100
//! min_tax = 0
//! max_tax = 1000
//! tax_destination = "0x9999999999999999999999999999999999999999999999999999999999999999"
//! max_holding_percent = 200
//! initial_supply = 1000000
//! owner = "0x0101010101010101010101010101010101010101010101010101010101010101"
//! ```

use std::path::Path;

use lib_types::{Address, Amount, Bps};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::{TokenCreationParams, DEFAULT_DECIMALS};

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parsing(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Serializable form of [`TokenCreationParams`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default)]
    pub tax_enabled: bool,
    pub tax: Bps,
    pub min_tax: Bps,
    pub max_tax: Bps,
    pub tax_destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_holding_percent: Option<Bps>,
    pub initial_supply: u64,
    pub owner: String,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl TokenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), symbol = %config.symbol, "token config loaded");
        Ok(config)
    }

    /// Resolve addresses and produce construction parameters
    ///
    /// Only the text-level shape is checked here; tax range and zero-address
    /// rules are enforced by [`crate::TaxToken::new`].
    pub fn to_params(&self) -> Result<TokenCreationParams, ConfigError> {
        let tax_destination = parse_address("tax_destination", &self.tax_destination)?;
        let owner = parse_address("owner", &self.owner)?;

        Ok(TokenCreationParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            tax_enabled: self.tax_enabled,
            tax: self.tax,
            min_tax: self.min_tax,
            max_tax: self.max_tax,
            tax_destination,
            max_holding_percent: self.max_holding_percent,
            initial_supply: Amount::from(self.initial_supply),
            owner,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_hex(value).map_err(|e| ConfigError::Invalid(format!("{field}: {e}")))
}
